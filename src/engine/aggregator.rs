// ==========================================
// S&OP 控制塔 - 数量聚合引擎
// ==========================================
// 职责: 明细级数量按规范键分组求和
// 输入: 明细表 / 库位库存记录
// 输出: 规范键 → 合计数量
// ==========================================

use crate::domain::inventory::StockRecord;
use crate::domain::order::DetailTable;
use crate::importer::id_reconciler::canonicalize_id;
use std::collections::BTreeMap;

// ==========================================
// AggregatedQuantities - 按键合计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedQuantities {
    totals: BTreeMap<String, f64>,
}

impl AggregatedQuantities {
    /// 查询合计（查询键同样规范化；未出现的键为 0）
    pub fn get(&self, key: &str) -> f64 {
        self.totals
            .get(&canonicalize_id(key))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.totals.contains_key(&canonicalize_id(key))
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// 按键升序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.totals.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.totals.keys().map(|k| k.as_str())
    }

    pub fn grand_total(&self) -> f64 {
        self.totals.values().sum()
    }
}

// ==========================================
// Aggregator - 聚合引擎（无状态）
// ==========================================
pub struct Aggregator;

impl Aggregator {
    /// 按规范键求和
    ///
    /// 空键被忽略；非有限数值按 0 计。
    pub fn sum_by_key<I, K>(&self, pairs: I) -> AggregatedQuantities
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut totals: BTreeMap<String, f64> = BTreeMap::new();
        for (key, qty) in pairs {
            let key = canonicalize_id(key.as_ref());
            if key.is_empty() {
                continue;
            }
            let qty = if qty.is_finite() { qty } else { 0.0 };
            *totals.entry(key).or_insert(0.0) += qty;
        }
        AggregatedQuantities { totals }
    }

    /// 订单级合计（Order_ID → Σ Quantity）
    pub fn aggregate_order_quantities(&self, detail: &DetailTable) -> AggregatedQuantities {
        self.sum_by_key(
            detail
                .records
                .iter()
                .map(|r| (r.order_id.as_str(), r.quantity)),
        )
    }

    /// 产品级需求（Product_Code → Σ Quantity），无产品编码的行不计入
    pub fn aggregate_demand_by_product(&self, detail: &DetailTable) -> AggregatedQuantities {
        self.sum_by_key(detail.records.iter().filter_map(|r| {
            r.product_code
                .as_deref()
                .map(|code| (code, r.quantity))
        }))
    }

    /// 产品级库存（丢弃库位粒度）
    pub fn aggregate_stock_by_product(&self, records: &[StockRecord]) -> AggregatedQuantities {
        self.sum_by_key(
            records
                .iter()
                .map(|r| (r.product_code.as_str(), r.stock_qty)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderDetailRecord;
    use std::collections::BTreeMap;

    fn line(order_id: &str, product: Option<&str>, quantity: f64) -> OrderDetailRecord {
        OrderDetailRecord {
            order_id: order_id.to_string(),
            product_code: product.map(str::to_string),
            quantity,
            attributes: BTreeMap::new(),
            source_row: 0,
        }
    }

    #[test]
    fn test_sum_by_order() {
        let detail = DetailTable {
            records: vec![line("O1", None, 10.0), line("O1", None, 5.0), line("O2", None, 3.0)],
            ..DetailTable::default()
        };
        let totals = Aggregator.aggregate_order_quantities(&detail);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("O1"), 15.0);
        assert_eq!(totals.get("O2"), 3.0);
        assert_eq!(totals.get("O3"), 0.0);
    }

    #[test]
    fn test_keys_canonicalized_on_both_sides() {
        let totals = Aggregator.sum_by_key(vec![("1002.0", 4.0), ("1002", 6.0), (" ", 9.0)]);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get("1002"), 10.0);
        assert_eq!(totals.get("1002.0"), 10.0);
    }

    #[test]
    fn test_non_finite_counts_as_zero() {
        let totals = Aggregator.sum_by_key(vec![("A", f64::NAN), ("A", 2.0)]);
        assert_eq!(totals.get("A"), 2.0);
    }

    #[test]
    fn test_demand_by_product_skips_missing_codes() {
        let detail = DetailTable {
            records: vec![
                line("O1", Some("SKU-1"), 10.0),
                line("O2", Some("SKU-1"), 2.0),
                line("O2", None, 7.0),
            ],
            ..DetailTable::default()
        };
        let demand = Aggregator.aggregate_demand_by_product(&detail);
        assert_eq!(demand.len(), 1);
        assert_eq!(demand.get("SKU-1"), 12.0);
        assert_eq!(demand.grand_total(), 12.0);
    }

    #[test]
    fn test_empty_input() {
        let totals = Aggregator.aggregate_order_quantities(&DetailTable::empty());
        assert!(totals.is_empty());
        assert_eq!(totals.get("anything"), 0.0);
    }
}
