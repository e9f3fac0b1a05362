// ==========================================
// S&OP 控制塔 - 库存对账引擎
// ==========================================
// 职责: 库位库存并集 → 按产品库存 → 与需求外连接计算平衡
// 红线: balance = stock - demand；缺失侧按 0；SHORTAGE ⇔ balance < 0
// ==========================================

use crate::domain::inventory::{InventoryBalance, InventoryTable, ProductStock, StockRecord};
use crate::engine::aggregator::{AggregatedQuantities, Aggregator};
use std::collections::BTreeSet;
use tracing::info;

pub struct InventoryReconciler;

impl InventoryReconciler {
    /// 各库位记录按配置顺序拼接
    pub fn union_locations<I>(&self, per_location: I) -> Vec<StockRecord>
    where
        I: IntoIterator<Item = Vec<StockRecord>>,
    {
        per_location.into_iter().flatten().collect()
    }

    /// 按产品汇总库存（产品编码升序）
    pub fn stock_by_product(&self, stock: &AggregatedQuantities) -> Vec<ProductStock> {
        stock
            .iter()
            .map(|(code, qty)| ProductStock {
                product_code: code.to_string(),
                stock_qty: qty,
            })
            .collect()
    }

    /// 需求与库存外连接
    ///
    /// 产品集合为两侧并集，按产品编码升序输出。
    pub fn balance(
        &self,
        demand: &AggregatedQuantities,
        stock: &AggregatedQuantities,
    ) -> Vec<InventoryBalance> {
        let products: BTreeSet<&str> = demand.keys().chain(stock.keys()).collect();
        products
            .into_iter()
            .map(|code| InventoryBalance::new(code, demand.get(code), stock.get(code)))
            .collect()
    }

    /// 组装库存侧输出
    ///
    /// # 参数
    /// - locations_loaded: 成功加载的库位标签
    /// - records: 各库位库存记录的并集
    /// - demand: 产品级需求
    ///
    /// # 返回
    /// 无任何库位加载成功时，平衡表为空
    pub fn reconcile(
        &self,
        locations_loaded: Vec<String>,
        records: Vec<StockRecord>,
        demand: &AggregatedQuantities,
    ) -> InventoryTable {
        if locations_loaded.is_empty() {
            return InventoryTable::empty();
        }

        let stock = Aggregator.aggregate_stock_by_product(&records);
        let by_product = self.stock_by_product(&stock);
        let balance = self.balance(demand, &stock);

        let shortages = balance.iter().filter(|b| b.is_shortage()).count();
        info!(
            locations = ?locations_loaded,
            stock_records = records.len(),
            products = balance.len(),
            shortages,
            "库存对账完成"
        );

        InventoryTable {
            locations_loaded,
            stock_records: records,
            by_product,
            balance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RiskStatus;
    use proptest::prelude::*;

    fn stock(code: &str, qty: f64, location: &str) -> StockRecord {
        StockRecord {
            product_code: code.to_string(),
            stock_qty: qty,
            location: location.to_string(),
        }
    }

    #[test]
    fn test_union_and_sum_across_locations() {
        let records = InventoryReconciler.union_locations(vec![
            vec![stock("P1", 5.0, "NL")],
            vec![stock("P1", 3.0, "EE"), stock("P2", 1.0, "EE")],
        ]);
        assert_eq!(records.len(), 3);

        let table = InventoryReconciler.reconcile(
            vec!["NL".to_string(), "EE".to_string()],
            records,
            &AggregatedQuantities::default(),
        );
        assert_eq!(
            table.by_product,
            vec![
                ProductStock { product_code: "P1".to_string(), stock_qty: 8.0 },
                ProductStock { product_code: "P2".to_string(), stock_qty: 1.0 },
            ]
        );
    }

    #[test]
    fn test_outer_join_missing_side_zero() {
        let demand = Aggregator.sum_by_key(vec![("P1", 10.0), ("P3", 2.0)]);
        let stock = Aggregator.sum_by_key(vec![("P1", 4.0), ("P2", 6.0)]);
        let balance = InventoryReconciler.balance(&demand, &stock);

        let codes: Vec<&str> = balance.iter().map(|b| b.product_code.as_str()).collect();
        assert_eq!(codes, vec!["P1", "P2", "P3"]);

        assert_eq!(balance[0].balance, -6.0);
        assert_eq!(balance[0].risk_status, RiskStatus::Shortage);
        assert_eq!(balance[1].demand_qty, 0.0);
        assert_eq!(balance[1].risk_status, RiskStatus::Ok);
        assert_eq!(balance[2].stock_qty, 0.0);
        assert_eq!(balance[2].balance, -2.0);
    }

    #[test]
    fn test_zero_balance_is_ok() {
        let demand = Aggregator.sum_by_key(vec![("P1", 5.0)]);
        let stock = Aggregator.sum_by_key(vec![("P1", 5.0)]);
        let balance = InventoryReconciler.balance(&demand, &stock);
        assert_eq!(balance[0].risk_status, RiskStatus::Ok);
    }

    #[test]
    fn test_no_locations_gives_empty_table() {
        let demand = Aggregator.sum_by_key(vec![("P1", 5.0)]);
        let table = InventoryReconciler.reconcile(Vec::new(), Vec::new(), &demand);
        assert!(table.is_empty());
        assert!(table.balance.is_empty());
    }

    proptest! {
        #[test]
        fn prop_balance_sign(
            demand in proptest::collection::vec(("[A-D]", 0.0f64..1_000.0), 0..12),
            stock in proptest::collection::vec(("[A-D]", 0.0f64..1_000.0), 0..12),
        ) {
            let demand = Aggregator.sum_by_key(demand);
            let stock = Aggregator.sum_by_key(stock);
            for row in InventoryReconciler.balance(&demand, &stock) {
                prop_assert_eq!(row.balance, row.stock_qty - row.demand_qty);
                prop_assert_eq!(row.is_shortage(), row.balance < 0.0);
            }
        }
    }
}
