// ==========================================
// S&OP 控制塔 - API 层
// ==========================================
// 职责: 提供摄取与驾驶舱接口，供 CLI/展示层调用
// ==========================================

pub mod dashboard_api;
pub mod ingest_api;

// 重导出核心类型
pub use dashboard_api::{DashboardApi, DashboardView};
pub use ingest_api::IngestApi;
