// ==========================================
// S&OP 控制塔 - 核心库
// ==========================================
// 输入: ERP 导出的多工作表工作簿（主表 / Orders 明细 / Stocklist 库位）
// 输出: 主表(含 Total_Qty) + 明细表 + 库存平衡表 + 非致命警告
// 系统定位: 纯函数式摄取核心，展示层另行实现
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 聚合/合并/对账/指标
pub mod engine;

// 导入层 - 工作簿读取与摄取管道
pub mod importer;

// 配置层 - 启发式参数
pub mod config;

// API 层 - 摄取与驾驶舱接口
pub mod api;

// CSV 导出
pub mod export;

// 日志系统
pub mod logging;

// 性能统计
pub mod perf;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{HeaderLocation, IngestStage, RiskStatus};

// 领域实体
pub use domain::{
    CellValue, DetailTable, IngestOutcome, InventoryBalance, InventoryTable, MasterTable,
    OrderDetailRecord, OrderRecord, ProductStock, RawRow, StockRecord,
};

// 引擎
pub use engine::{Aggregator, InsightEngine, InventoryReconciler, MasterMerger, OrderBookSummary};

// 导入
pub use importer::{IngestError, IngestPipeline, IngestResult, OrderBookIngestor, Workbook};

// 配置
pub use config::{ConfigManager, IngestConfig, IngestConfigReader};

// API
pub use api::{DashboardApi, IngestApi};

// ==========================================
// 版本信息
// ==========================================

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "S&OP Control Tower";
