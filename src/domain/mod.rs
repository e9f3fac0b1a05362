// ==========================================
// S&OP 控制塔 - 领域模型层
// ==========================================
// 职责: 定义单元格、订单、库存与摄取结果等实体
// 红线: 不含工作簿读取逻辑，不含聚合/对账逻辑
// ==========================================

pub mod cell;
pub mod inventory;
pub mod order;
pub mod outcome;
pub mod types;

// 重导出核心类型
pub use cell::{CellValue, RawRow};
pub use inventory::{InventoryBalance, InventoryTable, ProductStock, StockRecord};
pub use order::{DetailTable, MasterTable, OrderDetailRecord, OrderRecord};
pub use outcome::IngestOutcome;
pub use types::{HeaderLocation, IngestStage, RiskStatus};
