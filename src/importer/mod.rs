// ==========================================
// S&OP 控制塔 - 导入层
// ==========================================
// 职责: 工作簿读取 → 表头定位 → 工作表规范化 → 摄取管道
// 支持: .xlsx / .xlsm / .xls
// ==========================================

// 模块声明
pub mod cache;
pub mod column_matcher;
pub mod data_cleaner;
pub mod error;
pub mod header_locator;
pub mod id_reconciler;
pub mod ingest_trait;
pub mod pipeline;
pub mod sheet_normalizer;
pub mod workbook_loader;

// 重导出核心类型
pub use cache::{content_hash, IngestCache};
pub use column_matcher::ColumnMatcher;
pub use data_cleaner::DataCleaner;
pub use error::{IngestError, IngestResult};
pub use header_locator::HeaderLocator;
pub use id_reconciler::{canonical_id, canonicalize_id};
pub use pipeline::IngestPipeline;
pub use sheet_normalizer::{SheetNormalizer, SheetTable};
pub use workbook_loader::{Sheet, Workbook};

// 重导出 Trait 接口
pub use ingest_trait::OrderBookIngestor;
