// ==========================================
// 订单簿摄取API
// ==========================================
// 职责: 封装摄取管道 + 内容哈希缓存，供 CLI/展示层调用
// ==========================================

use crate::config::{ConfigManager, IngestConfig, IngestConfigReader};
use crate::domain::outcome::IngestOutcome;
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::workbook_loader::check_extension;
use crate::importer::{content_hash, IngestCache, IngestPipeline, OrderBookIngestor};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// 摄取API
pub struct IngestApi {
    pipeline: Arc<IngestPipeline<IngestConfig>>,
    cache: Arc<IngestCache>,
}

impl IngestApi {
    /// 创建新的IngestApi实例（缓存容量取自配置）
    pub fn new(config: IngestConfig) -> Self {
        let cache = Arc::new(IngestCache::new(config.cache_capacity()));
        Self {
            pipeline: Arc::new(IngestPipeline::new(config)),
            cache,
        }
    }

    /// 由配置管理器创建
    pub fn from_config_manager(manager: &ConfigManager) -> Self {
        Self::new(manager.config().clone())
    }

    pub fn config(&self) -> &IngestConfig {
        self.pipeline.config()
    }

    pub fn cache(&self) -> &IngestCache {
        &self.cache
    }

    /// 同步摄取（带缓存）
    ///
    /// # 返回
    /// - Ok(Arc<IngestOutcome>): 相同内容再次调用时返回缓存实例
    /// - Err(IngestError): 工作簿无法打开或主表缺失
    pub fn ingest_blocking(&self, bytes: &[u8]) -> IngestResult<Arc<IngestOutcome>> {
        let key = content_hash(bytes);
        if let Some(hit) = self.cache.get(&key) {
            info!(key = %key, "命中摄取缓存");
            return Ok(hit);
        }

        let outcome = Arc::new(self.pipeline.ingest(bytes)?);
        self.cache.insert(key, Arc::clone(&outcome));
        Ok(outcome)
    }

    /// 失效某份工作簿内容的缓存结果
    pub fn invalidate(&self, bytes: &[u8]) -> bool {
        self.cache.invalidate(&content_hash(bytes))
    }
}

#[async_trait]
impl OrderBookIngestor for IngestApi {
    async fn ingest_bytes(&self, bytes: Vec<u8>) -> IngestResult<Arc<IngestOutcome>> {
        let key = content_hash(&bytes);
        if let Some(hit) = self.cache.get(&key) {
            info!(key = %key, "命中摄取缓存");
            return Ok(hit);
        }

        // calamine 解析为 CPU 密集型，放到阻塞线程池
        let pipeline = Arc::clone(&self.pipeline);
        let outcome = tokio::task::spawn_blocking(move || pipeline.ingest(&bytes))
            .await
            .map_err(|e| IngestError::InternalError(format!("摄取任务异常退出: {}", e)))??;

        let outcome = Arc::new(outcome);
        self.cache.insert(key, Arc::clone(&outcome));
        Ok(outcome)
    }

    async fn ingest_file<P: AsRef<Path> + Send>(&self, path: P) -> IngestResult<Arc<IngestOutcome>> {
        let path: PathBuf = path.as_ref().to_path_buf();
        check_extension(&path)?;

        if !path.exists() {
            return Err(IngestError::FileNotFound(path.display().to_string()));
        }

        let bytes = tokio::fs::read(&path).await?;
        info!(file = %path.display(), bytes = bytes.len(), "读取工作簿文件");
        self.ingest_bytes(bytes).await
    }

    async fn batch_ingest<P: AsRef<Path> + Send + Sync>(
        &self,
        paths: Vec<P>,
    ) -> Vec<IngestResult<Arc<IngestOutcome>>> {
        use futures::future::join_all;

        info!(count = paths.len(), "开始批量摄取");

        let tasks = paths.into_iter().map(|path| async move {
            let file = path.as_ref().display().to_string();
            let result = self.ingest_file(path).await;
            match &result {
                Ok(outcome) => info!(
                    file = %file,
                    orders = outcome.master.len(),
                    warnings = outcome.warnings.len(),
                    "文件摄取成功"
                ),
                Err(e) => error!(file = %file, error = %e, "文件摄取失败"),
            }
            result
        });

        let results = join_all(tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量摄取完成"
        );

        results
    }
}
