// ==========================================
// S&OP 控制塔 - 引擎层
// ==========================================
// 职责: 聚合 / 合并 / 库存对账 / 驾驶舱指标
// 红线: 引擎只做纯计算，不读文件、不改配置
// ==========================================

pub mod aggregator;
pub mod insights;
pub mod inventory_reconciler;
pub mod master_merger;

// 重导出核心引擎
pub use aggregator::{AggregatedQuantities, Aggregator};
pub use insights::{
    AgingHold, CountryPallets, DateRange, InsightEngine, OrderBookSummary, ShipmentWindow,
    StatusCount,
};
pub use inventory_reconciler::InventoryReconciler;
pub use master_merger::{MasterMerger, MergeReport};
