// ==========================================
// 驾驶舱API
// ==========================================
// 职责: 基于摄取结果输出驾驶舱视图（指标 + 缺货清单）
// ==========================================

use crate::config::InsightRules;
use crate::domain::inventory::InventoryBalance;
use crate::domain::outcome::IngestOutcome;
use crate::engine::{InsightEngine, OrderBookSummary};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 驾驶舱视图
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardView {
    pub summary: OrderBookSummary,
    /// 缺货产品（平衡为负），按缺口从大到小
    pub shortages: Vec<InventoryBalance>,
    pub warnings: Vec<String>,
}

pub struct DashboardApi {
    rules: InsightRules,
}

impl DashboardApi {
    pub fn new(rules: InsightRules) -> Self {
        Self { rules }
    }

    /// 生成驾驶舱视图
    ///
    /// # 参数
    /// - outcome: 摄取结果
    /// - now: 超期计算基准时间
    pub fn view(&self, outcome: &IngestOutcome, now: NaiveDateTime) -> DashboardView {
        let summary = InsightEngine::new(&self.rules).summarize(&outcome.master, now);

        let mut shortages: Vec<InventoryBalance> =
            outcome.inventory.shortages().cloned().collect();
        shortages.sort_by(|a, b| a.balance.total_cmp(&b.balance));

        DashboardView {
            summary,
            shortages,
            warnings: outcome.warnings.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::inventory::InventoryTable;
    use chrono::NaiveDate;

    #[test]
    fn test_shortages_sorted_by_gap() {
        let mut outcome = IngestOutcome::default();
        outcome.inventory = InventoryTable {
            locations_loaded: vec!["NL".to_string()],
            balance: vec![
                InventoryBalance::new("A", 5.0, 4.0),
                InventoryBalance::new("B", 1.0, 9.0),
                InventoryBalance::new("C", 10.0, 0.0),
            ],
            ..InventoryTable::default()
        };
        outcome.warnings.push("w".to_string());

        let now = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let view = DashboardApi::new(InsightRules::default()).view(&outcome, now);

        let codes: Vec<&str> = view.shortages.iter().map(|b| b.product_code.as_str()).collect();
        assert_eq!(codes, vec!["C", "A"]);
        assert_eq!(view.summary.order_count, 0);
        assert_eq!(view.warnings, vec!["w"]);
    }
}
