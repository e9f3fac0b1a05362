// ==========================================
// S&OP 控制塔 - 库存领域模型
// ==========================================
// 职责: 库位库存记录 / 按产品库存 / 供需平衡
// ==========================================

use crate::domain::types::RiskStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// StockRecord - 库位库存记录
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
    pub product_code: String, // 规范化产品编码
    pub stock_qty: f64,       // 非数值为 0
    pub location: String,     // 来源工作表的固定库位标签（如 NL / EE）
}

// ==========================================
// ProductStock - 按产品汇总库存（丢弃库位粒度）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductStock {
    pub product_code: String,
    pub stock_qty: f64,
}

// ==========================================
// InventoryBalance - 供需平衡
// ==========================================
// 红线: balance == stock_qty - demand_qty，SHORTAGE ⇔ balance < 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryBalance {
    pub product_code: String,
    pub demand_qty: f64,
    pub stock_qty: f64,
    pub balance: f64,
    pub risk_status: RiskStatus,
}

impl InventoryBalance {
    pub fn new(product_code: impl Into<String>, demand_qty: f64, stock_qty: f64) -> Self {
        let balance = stock_qty - demand_qty;
        Self {
            product_code: product_code.into(),
            demand_qty,
            stock_qty,
            balance,
            risk_status: RiskStatus::from_balance(balance),
        }
    }

    pub fn is_shortage(&self) -> bool {
        self.risk_status == RiskStatus::Shortage
    }
}

// ==========================================
// InventoryTable - 库存侧输出（可缺省）
// ==========================================
// 无任何库位工作表时各列表为空，展示层需视为合法输入
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryTable {
    pub locations_loaded: Vec<String>,
    pub stock_records: Vec<StockRecord>,
    pub by_product: Vec<ProductStock>,
    pub balance: Vec<InventoryBalance>,
}

impl InventoryTable {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.stock_records.is_empty() && self.balance.is_empty()
    }

    /// 缺货产品列表
    pub fn shortages(&self) -> impl Iterator<Item = &InventoryBalance> {
        self.balance.iter().filter(|b| b.is_shortage())
    }
}
