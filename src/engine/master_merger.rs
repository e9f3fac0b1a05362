// ==========================================
// S&OP 控制塔 - 主表合并引擎
// ==========================================
// 职责: 订单级合计左连接回主表（Order_ID）
// 规则: 未匹配订单为 0；已有同名 Total_Qty 列被替换而非追加；
//       重复 Order_ID 的每一行得到相同合计
// ==========================================

use crate::domain::order::{MasterTable, TOTAL_QTY};
use crate::engine::aggregator::AggregatedQuantities;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::info;

/// 合并结果统计
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergeReport {
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    /// 明细中存在、主表中没有的订单号（升序）
    pub orphan_order_ids: Vec<String>,
    pub merged_total_qty: f64,
}

pub struct MasterMerger;

impl MasterMerger {
    /// 将合计写入主表
    ///
    /// # 参数
    /// - master: 主表（原地更新 Total_Qty）
    /// - totals: 订单级合计
    ///
    /// # 返回
    /// MergeReport 匹配统计
    pub fn merge(&self, master: &mut MasterTable, totals: &AggregatedQuantities) -> MergeReport {
        let mut seen_total = false;
        master.columns.retain(|c| {
            if c == TOTAL_QTY {
                let keep = !seen_total;
                seen_total = true;
                keep
            } else {
                true
            }
        });
        if !seen_total {
            master.columns.push(TOTAL_QTY.to_string());
        }

        let mut report = MergeReport::default();

        for record in master.records.iter_mut() {
            record.attributes.remove(TOTAL_QTY);
            if totals.contains(&record.order_id) {
                report.matched_rows += 1;
            } else {
                report.unmatched_rows += 1;
            }
            record.total_qty = totals.get(&record.order_id);
            report.merged_total_qty += record.total_qty;
        }

        let master_ids: HashSet<&str> = master.records.iter().map(|r| r.order_id.as_str()).collect();
        report.orphan_order_ids = totals
            .keys()
            .filter(|k| !master_ids.contains(k))
            .map(str::to_string)
            .collect();

        info!(
            sheet = %master.sheet_name,
            matched = report.matched_rows,
            unmatched = report.unmatched_rows,
            orphans = report.orphan_order_ids.len(),
            total_qty = report.merged_total_qty,
            "主表合并完成"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cell::CellValue;
    use crate::domain::order::{OrderRecord, ORDER_ID};
    use crate::engine::aggregator::Aggregator;
    use std::collections::BTreeMap;

    fn order(id: &str) -> OrderRecord {
        OrderRecord {
            order_id: id.to_string(),
            status: "OPEN".to_string(),
            country: None,
            dates: BTreeMap::new(),
            pallets: 0.0,
            total_qty: 0.0,
            attributes: BTreeMap::new(),
            source_row: 2,
        }
    }

    fn master(ids: &[&str]) -> MasterTable {
        MasterTable {
            sheet_name: "S&OP".to_string(),
            columns: vec![ORDER_ID.to_string(), TOTAL_QTY.to_string()],
            records: ids.iter().map(|id| order(id)).collect(),
            ..MasterTable::default()
        }
    }

    #[test]
    fn test_left_join_with_zero_fill() {
        let mut table = master(&["O1", "O2", "O9"]);
        let totals = Aggregator.sum_by_key(vec![("O1", 15.0), ("O2", 3.0), ("O7", 1.0)]);
        let report = MasterMerger.merge(&mut table, &totals);

        let qty: Vec<f64> = table.records.iter().map(|r| r.total_qty).collect();
        assert_eq!(qty, vec![15.0, 3.0, 0.0]);
        assert_eq!(report.matched_rows, 2);
        assert_eq!(report.unmatched_rows, 1);
        assert_eq!(report.orphan_order_ids, vec!["O7"]);
    }

    #[test]
    fn test_empty_detail_gives_zero_totals() {
        let mut table = master(&["O1", "O2"]);
        MasterMerger.merge(&mut table, &AggregatedQuantities::default());
        assert!(table.records.iter().all(|r| r.total_qty == 0.0));
        assert_eq!(table.total_qty(), 0.0);
    }

    #[test]
    fn test_duplicates_receive_same_total() {
        let mut table = master(&["O1", "O1"]);
        let totals = Aggregator.sum_by_key(vec![("O1", 4.0)]);
        MasterMerger.merge(&mut table, &totals);
        assert_eq!(table.records[0].total_qty, 4.0);
        assert_eq!(table.records[1].total_qty, 4.0);
    }

    #[test]
    fn test_merge_twice_keeps_column_set() {
        let mut table = master(&["O1"]);
        table.records[0]
            .attributes
            .insert(TOTAL_QTY.to_string(), CellValue::Number(99.0));
        let totals = Aggregator.sum_by_key(vec![("O1", 4.0)]);

        MasterMerger.merge(&mut table, &totals);
        let columns = table.columns.clone();
        MasterMerger.merge(&mut table, &totals);

        assert_eq!(table.columns, columns);
        assert_eq!(table.columns.iter().filter(|c| *c == TOTAL_QTY).count(), 1);
        assert!(!table.records[0].attributes.contains_key(TOTAL_QTY));
        assert_eq!(table.records[0].total_qty, 4.0);
    }

    #[test]
    fn test_total_column_added_when_missing() {
        let mut table = master(&["O1"]);
        table.columns = vec![ORDER_ID.to_string()];
        MasterMerger.merge(&mut table, &AggregatedQuantities::default());
        assert_eq!(table.columns, vec![ORDER_ID, TOTAL_QTY]);
    }
}
