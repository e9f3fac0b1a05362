// ==========================================
// S&OP 控制塔 - 领域类型定义
// ==========================================
// 职责: 表头定位结果 / 摄取阶段 / 库存风险状态
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 表头定位结果 (Header Location)
// ==========================================
// 一旦选定，其下所有数据按该行作为字段名行解释
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderLocation {
    Found(usize), // 前导窗口内的零基行号
    NotFound,     // 未找到，调用方使用兜底行号
}

impl HeaderLocation {
    /// 解析为实际表头行号（未找到时使用兜底值）
    pub fn resolve(self, fallback_row: usize) -> usize {
        match self {
            HeaderLocation::Found(row) => row,
            HeaderLocation::NotFound => fallback_row,
        }
    }

    pub fn is_found(self) -> bool {
        matches!(self, HeaderLocation::Found(_))
    }
}

// ==========================================
// 摄取阶段 (Ingest Stage)
// ==========================================
// START → MASTER_LOADED → DETAIL_LOADED(可选) → MERGED
//       → INVENTORY_LOADED(可选) → BALANCED → DONE
// 唯一致命转移: START → FAILED（主表无法定位）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestStage {
    Start,
    MasterLoaded,
    DetailLoaded,
    Merged,
    InventoryLoaded,
    Balanced,
    Done,
    Failed,
}

impl fmt::Display for IngestStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IngestStage::Start => write!(f, "START"),
            IngestStage::MasterLoaded => write!(f, "MASTER_LOADED"),
            IngestStage::DetailLoaded => write!(f, "DETAIL_LOADED"),
            IngestStage::Merged => write!(f, "MERGED"),
            IngestStage::InventoryLoaded => write!(f, "INVENTORY_LOADED"),
            IngestStage::Balanced => write!(f, "BALANCED"),
            IngestStage::Done => write!(f, "DONE"),
            IngestStage::Failed => write!(f, "FAILED"),
        }
    }
}

// ==========================================
// 库存风险状态 (Risk Status)
// ==========================================
// SHORTAGE ⇔ Balance < 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskStatus {
    Ok,
    Shortage,
}

impl RiskStatus {
    pub fn from_balance(balance: f64) -> Self {
        if balance < 0.0 {
            RiskStatus::Shortage
        } else {
            RiskStatus::Ok
        }
    }
}

impl fmt::Display for RiskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskStatus::Ok => write!(f, "OK"),
            RiskStatus::Shortage => write!(f, "SHORTAGE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_location_resolve() {
        assert_eq!(HeaderLocation::Found(3).resolve(20), 3);
        assert_eq!(HeaderLocation::NotFound.resolve(20), 20);
    }

    #[test]
    fn test_risk_status_from_balance() {
        assert_eq!(RiskStatus::from_balance(-0.5), RiskStatus::Shortage);
        assert_eq!(RiskStatus::from_balance(0.0), RiskStatus::Ok);
        assert_eq!(RiskStatus::from_balance(7.0), RiskStatus::Ok);
    }

    #[test]
    fn test_stage_serialization() {
        let json = serde_json::to_string(&IngestStage::InventoryLoaded).unwrap();
        assert_eq!(json, "\"INVENTORY_LOADED\"");
        assert_eq!(IngestStage::MasterLoaded.to_string(), "MASTER_LOADED");
    }
}
