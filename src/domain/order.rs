// ==========================================
// S&OP 控制塔 - 订单领域模型
// ==========================================
// 职责: 主表（S&OP）订单记录 / 明细表（Orders）行项目记录
// 用途: 导入层写入，引擎层与展示层只读
// ==========================================

use crate::domain::cell::CellValue;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ===== 规范字段名 =====
pub const ORDER_ID: &str = "Order_ID";
pub const STATUS: &str = "Status";
pub const COUNTRY: &str = "Country";
pub const PALLETS: &str = "Pallets";
pub const TOTAL_QTY: &str = "Total_Qty";
pub const PRODUCT_CODE: &str = "Product_Code";
pub const QUANTITY: &str = "Quantity";

/// 状态缺失时的默认值
pub const UNKNOWN_STATUS: &str = "UNKNOWN";

// ==========================================
// OrderRecord - 主表订单记录
// ==========================================
// 红线: Order_ID 不保证唯一，重复 ID 各自获得同一汇总数量
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub order_id: String,        // 规范化订单号（去除尾部 ".0"，保留大小写）
    pub status: String,          // 大写、去空白，缺失为 UNKNOWN
    pub country: Option<String>, // 国家/市场

    // 日期列（列名含 "date"），无法解析为 None
    pub dates: BTreeMap<String, Option<NaiveDateTime>>,

    pub pallets: f64,   // 托盘数，非数值为 0
    pub total_qty: f64, // 明细汇总数量，未匹配为 0

    // 其余源列原样保留（付款状态等供展示层使用）
    pub attributes: BTreeMap<String, CellValue>,

    pub source_row: usize, // 源工作表行号（1 起）
}

impl OrderRecord {
    /// 读取日期列
    pub fn date(&self, column: &str) -> Option<NaiveDateTime> {
        self.dates.get(column).copied().flatten()
    }

    /// 读取原样保留列的文本
    pub fn attribute_text(&self, column: &str) -> Option<String> {
        self.attributes
            .get(column)
            .and_then(|value| value.as_trimmed_text())
    }

    /// 按列名取值（类表格访问，导出与展示层使用）
    pub fn value(&self, column: &str) -> CellValue {
        match column {
            ORDER_ID => CellValue::Text(self.order_id.clone()),
            STATUS => CellValue::Text(self.status.clone()),
            COUNTRY => self
                .country
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
            PALLETS => CellValue::Number(self.pallets),
            TOTAL_QTY => CellValue::Number(self.total_qty),
            _ => {
                if let Some(date) = self.dates.get(column) {
                    return date.map(CellValue::DateTime).unwrap_or(CellValue::Empty);
                }
                self.attributes.get(column).cloned().unwrap_or_default()
            }
        }
    }
}

// ==========================================
// MasterTable - 主表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MasterTable {
    pub sheet_name: String,
    pub header_row: usize,      // 实际使用的表头行（零基）
    pub header_detected: bool,  // false 表示使用了兜底行号
    pub columns: Vec<String>,   // 输出列集合（含合成列 Status/Pallets/Total_Qty）
    pub date_columns: Vec<String>,
    pub pallet_source: Option<String>, // 托盘数来源列
    pub records: Vec<OrderRecord>,
}

impl MasterTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// 合计数量
    pub fn total_qty(&self) -> f64 {
        self.records.iter().map(|r| r.total_qty).sum()
    }

    /// 合计托盘数
    pub fn total_pallets(&self) -> f64 {
        self.records.iter().map(|r| r.pallets).sum()
    }
}

// ==========================================
// OrderDetailRecord - 明细行项目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetailRecord {
    pub order_id: String,
    pub product_code: Option<String>,
    pub quantity: f64, // 非数值为 0
    pub attributes: BTreeMap<String, CellValue>,
    pub source_row: usize,
}

impl OrderDetailRecord {
    pub fn value(&self, column: &str) -> CellValue {
        match column {
            ORDER_ID => CellValue::Text(self.order_id.clone()),
            PRODUCT_CODE => self
                .product_code
                .clone()
                .map(CellValue::Text)
                .unwrap_or(CellValue::Empty),
            QUANTITY => CellValue::Number(self.quantity),
            _ => self.attributes.get(column).cloned().unwrap_or_default(),
        }
    }
}

// ==========================================
// DetailTable - 明细表（可缺省）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailTable {
    pub sheet_name: Option<String>,
    pub header_row: Option<usize>,
    pub columns: Vec<String>,
    pub quantity_column: Option<String>, // 源数量列（None 时全部数量为 0）
    pub product_column: Option<String>,  // 源产品编码列
    pub records: Vec<OrderDetailRecord>,
}

impl DetailTable {
    /// 空明细表（Orders 工作表缺失或不可读时的默认值）
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
