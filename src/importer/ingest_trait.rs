// ==========================================
// S&OP 控制塔 - 摄取 Trait
// ==========================================
// 职责: 定义订单簿摄取接口（不包含实现）
// 实现者: IngestApi
// ==========================================

use crate::domain::outcome::IngestOutcome;
use crate::importer::error::IngestResult;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

#[async_trait]
pub trait OrderBookIngestor: Send + Sync {
    /// 摄取内存中的工作簿字节
    ///
    /// # 返回
    /// - Ok(Arc<IngestOutcome>): 摄取结果（相同字节命中缓存时返回同一实例）
    /// - Err: 工作簿无法打开，或主表缺失
    async fn ingest_bytes(&self, bytes: Vec<u8>) -> IngestResult<Arc<IngestOutcome>>;

    /// 摄取工作簿文件（.xlsx/.xlsm/.xls）
    async fn ingest_file<P: AsRef<Path> + Send>(&self, path: P) -> IngestResult<Arc<IngestOutcome>>;

    /// 批量摄取（并发执行）
    ///
    /// # 说明
    /// - 每个文件独立摄取，结果顺序与输入一致
    /// - 单个文件失败不影响其他文件
    async fn batch_ingest<P: AsRef<Path> + Send + Sync>(
        &self,
        paths: Vec<P>,
    ) -> Vec<IngestResult<Arc<IngestOutcome>>>;
}
