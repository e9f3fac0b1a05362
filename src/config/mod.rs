// ==========================================
// S&OP 控制塔 - 配置层
// ==========================================
// 职责: 摄取启发式参数管理，支持文件与环境变量覆写
// ==========================================

pub mod config_manager;
pub mod ingest_config;
pub mod ingest_config_trait;

// 重导出核心配置类型
pub use config_manager::{config_keys, ConfigManager, ConfigSource};
pub use ingest_config::{HeaderRule, IngestConfig, InsightRules, StockLocationConfig};
pub use ingest_config_trait::IngestConfigReader;
