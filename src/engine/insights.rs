// ==========================================
// S&OP 控制塔 - 订单簿洞察引擎
// ==========================================
// 职责: 基于已合并主表计算驾驶舱指标（纯计算，无 I/O）
// 输出: KPI / 挂起与未结 / 付款阻断 / 状态漏斗 / 国家托盘 /
//       付款状态分布 / 超期挂起 / 发运时间线 / 录入日期范围
// ==========================================

use crate::config::InsightRules;
use crate::domain::order::{MasterTable, OrderRecord};
use crate::importer::column_matcher::ColumnMatcher;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 付款状态缺失时的分组名
pub const UNKNOWN_PAYMENT_STATUS: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryPallets {
    pub country: String,
    pub pallets: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingHold {
    pub order_id: String,
    pub country: Option<String>,
    pub status: String,
    pub payment_status: Option<String>,
    pub entry_date: NaiveDateTime,
    pub days_open: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipmentWindow {
    pub order_id: String,
    pub country: Option<String>,
    pub status: String,
    pub ready_date: NaiveDateTime,
    pub shipment_date: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub min: NaiveDateTime,
    pub max: NaiveDateTime,
}

/// 驾驶舱汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSummary {
    pub order_count: usize,
    pub total_pallets: f64,
    pub total_qty: f64,
    pub hold_count: usize,
    pub hold_pallets: f64,
    pub open_count: usize,
    pub payment_block_count: usize,
    pub payment_block_pallets: f64,
    pub status_counts: Vec<StatusCount>,
    pub payment_status_counts: Vec<StatusCount>,
    pub pallets_by_country: Vec<CountryPallets>,
    pub aging_holds: Vec<AgingHold>,
    pub shipment_timeline: Vec<ShipmentWindow>,
    pub entry_date_range: Option<DateRange>,
}

// ==========================================
// InsightEngine
// ==========================================
pub struct InsightEngine<'a> {
    rules: &'a InsightRules,
}

impl<'a> InsightEngine<'a> {
    pub fn new(rules: &'a InsightRules) -> Self {
        Self { rules }
    }

    fn date_column(&self, master: &MasterTable, fragments: &[String]) -> Option<String> {
        let matcher = ColumnMatcher::from_patterns(&[fragments.to_vec()]);
        matcher
            .find_label(&master.date_columns)
            .map(str::to_string)
    }

    fn payment_column<'m>(&self, master: &'m MasterTable) -> Option<&'m str> {
        ColumnMatcher::from_patterns(&[self.rules.payment_column.clone()]).find_label(&master.columns)
    }

    fn payment_status(record: &OrderRecord, column: &str) -> Option<String> {
        record.value(column).as_trimmed_text()
    }

    pub fn is_hold(&self, record: &OrderRecord) -> bool {
        record.status.contains(&self.rules.hold_keyword.to_uppercase())
    }

    /// 未结：状态不含任一关闭关键词
    pub fn is_open(&self, record: &OrderRecord) -> bool {
        !self
            .rules
            .closed_keywords
            .iter()
            .any(|k| record.status.contains(&k.to_uppercase()))
    }

    pub fn hold_orders<'m>(&self, master: &'m MasterTable) -> Vec<&'m OrderRecord> {
        master.records.iter().filter(|r| self.is_hold(r)).collect()
    }

    pub fn open_orders<'m>(&self, master: &'m MasterTable) -> Vec<&'m OrderRecord> {
        master.records.iter().filter(|r| self.is_open(r)).collect()
    }

    /// 付款阻断订单（无付款状态列时为空）
    pub fn payment_blocks<'m>(&self, master: &'m MasterTable) -> Vec<&'m OrderRecord> {
        let Some(column) = self.payment_column(master) else {
            return Vec::new();
        };
        let keyword = self.rules.payment_block_keyword.to_uppercase();

        master
            .records
            .iter()
            .filter(|r| {
                Self::payment_status(r, column)
                    .map(|v| v.to_uppercase().contains(&keyword))
                    .unwrap_or(false)
            })
            .collect()
    }

    /// 状态漏斗（数量降序，同数量按状态名升序）
    pub fn status_counts(&self, master: &MasterTable) -> Vec<StatusCount> {
        count_sorted(master.records.iter().map(|r| r.status.clone()))
    }

    /// 按付款状态计数，缺失值归入 "Unknown"（无付款状态列时为空）
    pub fn payment_status_counts(&self, master: &MasterTable) -> Vec<StatusCount> {
        let Some(column) = self.payment_column(master) else {
            return Vec::new();
        };
        count_sorted(master.records.iter().map(|r| {
            Self::payment_status(r, column).unwrap_or_else(|| UNKNOWN_PAYMENT_STATUS.to_string())
        }))
    }

    /// 国家托盘合计（国家名升序，无国家的订单不计入）
    pub fn pallets_by_country(&self, master: &MasterTable) -> Vec<CountryPallets> {
        let mut totals: BTreeMap<&str, f64> = BTreeMap::new();
        for record in &master.records {
            if let Some(country) = record.country.as_deref() {
                *totals.entry(country).or_insert(0.0) += record.pallets;
            }
        }
        totals
            .into_iter()
            .map(|(country, pallets)| CountryPallets {
                country: country.to_string(),
                pallets,
            })
            .collect()
    }

    /// 超期挂起订单
    ///
    /// # 参数
    /// - now: 计算基准时间（由调用方提供）
    ///
    /// # 返回
    /// 超过阈值天数的挂起订单，按挂起天数降序，截取前 aging_hold_limit 条
    pub fn aging_holds(&self, master: &MasterTable, now: NaiveDateTime) -> Vec<AgingHold> {
        let Some(column) = self.date_column(master, &self.rules.entry_date_column) else {
            return Vec::new();
        };

        let payment = self.payment_column(master);
        let mut holds: Vec<AgingHold> = self
            .hold_orders(master)
            .into_iter()
            .filter_map(|r| {
                let entry_date = r.date(&column)?;
                let days_open = (now - entry_date).num_days();
                (days_open > self.rules.aging_threshold_days).then(|| AgingHold {
                    order_id: r.order_id.clone(),
                    country: r.country.clone(),
                    status: r.status.clone(),
                    payment_status: payment.and_then(|c| Self::payment_status(r, c)),
                    entry_date,
                    days_open,
                })
            })
            .collect();

        holds.sort_by(|a, b| b.days_open.cmp(&a.days_open));
        holds.truncate(self.rules.aging_hold_limit);
        holds
    }

    /// 发运时间线：备货日期与发运日期齐全的订单，按主表顺序截取
    pub fn shipment_timeline(&self, master: &MasterTable) -> Vec<ShipmentWindow> {
        let ready = self.date_column(master, &self.rules.ready_date_column);
        let shipment = self.date_column(master, &self.rules.shipment_date_column);
        let (Some(ready), Some(shipment)) = (ready, shipment) else {
            return Vec::new();
        };

        master
            .records
            .iter()
            .filter_map(|r| {
                Some(ShipmentWindow {
                    order_id: r.order_id.clone(),
                    country: r.country.clone(),
                    status: r.status.clone(),
                    ready_date: r.date(&ready)?,
                    shipment_date: r.date(&shipment)?,
                })
            })
            .take(self.rules.timeline_limit)
            .collect()
    }

    /// 录入日期范围（日期选择器的上下界）
    pub fn entry_date_range(&self, master: &MasterTable) -> Option<DateRange> {
        let column = self.date_column(master, &self.rules.entry_date_column)?;
        let mut dates = master.records.iter().filter_map(|r| r.date(&column));
        let first = dates.next()?;
        let (min, max) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(DateRange { min, max })
    }

    /// 汇总全部指标
    pub fn summarize(&self, master: &MasterTable, now: NaiveDateTime) -> OrderBookSummary {
        let holds = self.hold_orders(master);
        let blocks = self.payment_blocks(master);

        OrderBookSummary {
            order_count: master.len(),
            total_pallets: master.total_pallets(),
            total_qty: master.total_qty(),
            hold_count: holds.len(),
            hold_pallets: holds.iter().map(|r| r.pallets).sum(),
            open_count: self.open_orders(master).len(),
            payment_block_count: blocks.len(),
            payment_block_pallets: blocks.iter().map(|r| r.pallets).sum(),
            status_counts: self.status_counts(master),
            payment_status_counts: self.payment_status_counts(master),
            pallets_by_country: self.pallets_by_country(master),
            aging_holds: self.aging_holds(master, now),
            shipment_timeline: self.shipment_timeline(master),
            entry_date_range: self.entry_date_range(master),
        }
    }
}

/// 分组计数（数量降序，同数量按名称升序）
fn count_sorted(values: impl Iterator<Item = String>) -> Vec<StatusCount> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut result: Vec<StatusCount> = counts
        .into_iter()
        .map(|(status, count)| StatusCount { status, count })
        .collect();
    result.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.status.cmp(&b.status)));
    result
}
