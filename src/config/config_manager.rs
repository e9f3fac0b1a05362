// ==========================================
// S&OP 控制塔 - 配置管理器
// ==========================================
// 职责: 配置加载（JSON 文件）、环境变量覆写、快照导出
// 优先级: 环境变量 > 配置文件 > 内置默认值
// ==========================================

use crate::config::ingest_config::IngestConfig;
use crate::importer::error::{IngestError, IngestResult};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    /// 配置文件路径
    pub const CONFIG_PATH: &str = "SOP_INGEST_CONFIG";
    /// 缓存容量
    pub const CACHE_CAPACITY: &str = "SOP_INGEST_CACHE_CAPACITY";
    /// 挂起超期阈值（天）
    pub const AGING_DAYS: &str = "SOP_INGEST_AGING_DAYS";
}

/// 配置来源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Default,
    File(PathBuf),
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: IngestConfig,
    source: ConfigSource,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// 使用内置默认值
    pub fn new() -> Self {
        Self {
            config: IngestConfig::default(),
            source: ConfigSource::Default,
        }
    }

    /// 从 JSON 文件加载（缺省字段使用默认值）
    pub fn from_file<P: AsRef<Path>>(path: P) -> IngestResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| IngestError::ConfigReadError {
            key: config_keys::CONFIG_PATH.to_string(),
            message: format!("{}: {}", path.display(), e),
        })?;

        let config: IngestConfig =
            serde_json::from_str(&raw).map_err(|e| IngestError::ConfigValueError {
                key: config_keys::CONFIG_PATH.to_string(),
                value: path.display().to_string(),
                message: e.to_string(),
            })?;

        info!(path = %path.display(), "已加载摄取配置文件");
        Ok(Self {
            config,
            source: ConfigSource::File(path.to_path_buf()),
        })
    }

    /// 按优先级加载配置
    ///
    /// # 流程
    /// 1. 环境变量 SOP_INGEST_CONFIG 指定的文件（必须存在）
    /// 2. 用户配置目录下 sop-control-tower/config.json（存在才加载）
    /// 3. 内置默认值
    /// 4. 应用环境变量覆写
    pub fn load() -> IngestResult<Self> {
        let mut manager = match std::env::var(config_keys::CONFIG_PATH) {
            Ok(path) if !path.trim().is_empty() => Self::from_file(path.trim())?,
            _ => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("未找到配置文件，使用内置默认值");
                    Self::new()
                }
            },
        };

        manager.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(manager)
    }

    /// 默认配置文件路径
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sop-control-tower").join("config.json"))
    }

    /// 应用覆写（lookup 通常为环境变量读取）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> IngestResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(config_keys::CACHE_CAPACITY) {
            self.config.cache_capacity = parse_override(config_keys::CACHE_CAPACITY, &value)?;
        }

        if let Some(value) = lookup(config_keys::AGING_DAYS) {
            self.config.insights.aging_threshold_days =
                parse_override(config_keys::AGING_DAYS, &value)?;
        }

        Ok(())
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn into_config(self) -> IngestConfig {
        self.config
    }

    pub fn source(&self) -> &ConfigSource {
        &self.source
    }

    /// 获取当前配置快照（JSON 格式）
    ///
    /// # 用途
    /// - 与摄取结果一同记录，便于复现启发式判断
    pub fn get_config_snapshot(&self) -> IngestResult<String> {
        Ok(serde_json::to_string_pretty(&self.config)?)
    }
}

fn parse_override<T: std::str::FromStr>(key: &str, value: &str) -> IngestResult<T>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| IngestError::ConfigValueError {
            key: key.to_string(),
            value: value.to_string(),
            message: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_from_file_partial_override() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "master_sheet_fragments": ["Board"], "cache_capacity": 2 }}"#
        )
        .unwrap();

        let manager = ConfigManager::from_file(file.path()).unwrap();
        assert_eq!(manager.config().master_sheet_fragments, vec!["Board".to_string()]);
        assert_eq!(manager.config().cache_capacity, 2);
        assert_eq!(manager.config().detail_sheet_name, "Orders");
        assert!(matches!(manager.source(), ConfigSource::File(_)));
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let result = ConfigManager::from_file(file.path());
        assert!(matches!(result, Err(IngestError::ConfigValueError { .. })));
    }

    #[test]
    fn test_apply_overrides() {
        let mut env = HashMap::new();
        env.insert(config_keys::CACHE_CAPACITY, "3".to_string());
        env.insert(config_keys::AGING_DAYS, " 45 ".to_string());

        let mut manager = ConfigManager::new();
        manager.apply_overrides(|key| env.get(key).cloned()).unwrap();

        assert_eq!(manager.config().cache_capacity, 3);
        assert_eq!(manager.config().insights.aging_threshold_days, 45);
    }

    #[test]
    fn test_apply_overrides_rejects_garbage() {
        let mut manager = ConfigManager::new();
        let result = manager.apply_overrides(|key| {
            (key == config_keys::CACHE_CAPACITY).then(|| "many".to_string())
        });
        assert!(matches!(result, Err(IngestError::ConfigValueError { .. })));
    }

    #[test]
    fn test_snapshot_roundtrips_into_config() {
        let manager = ConfigManager::new();
        let snapshot = manager.get_config_snapshot().unwrap();
        let parsed: IngestConfig = serde_json::from_str(&snapshot).unwrap();
        assert_eq!(&parsed, manager.config());
    }
}
