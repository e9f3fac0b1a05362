// ==========================================
// S&OP 控制塔 - 摄取配置
// ==========================================
// 职责: 工作表识别 / 表头规则 / 列名片段 / 库位参数 / 洞察阈值
// 说明: 源模板会漂移，所有启发式常量都在此集中可配置
// ==========================================

use crate::config::ingest_config_trait::IngestConfigReader;
use serde::{Deserialize, Serialize};

// ==========================================
// HeaderRule - 表头定位规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRule {
    pub keywords: Vec<String>, // 每个关键词至少被一个单元格包含
    pub window: usize,         // 扫描的前导行数
    pub fallback_row: usize,   // 未找到时的兜底行号（零基）
}

impl HeaderRule {
    pub fn new(keywords: &[&str], window: usize, fallback_row: usize) -> Self {
        Self {
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            window,
            fallback_row,
        }
    }
}

// ==========================================
// StockLocationConfig - 库位工作表参数
// ==========================================
// 兜底表头行号来自有限样本推断，按库位可覆写
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockLocationConfig {
    pub tag: String,                  // 库位标签（写入 StockRecord.location）
    pub sheet_fragments: Vec<String>, // 工作表名需同时包含的片段（不区分大小写）
    pub header: HeaderRule,
}

impl StockLocationConfig {
    pub fn new(tag: &str, header_keywords: &[&str], window: usize, fallback_row: usize) -> Self {
        Self {
            tag: tag.to_string(),
            sheet_fragments: vec!["stocklist".to_string(), tag.to_lowercase()],
            header: HeaderRule::new(header_keywords, window, fallback_row),
        }
    }
}

// ==========================================
// InsightRules - 订单洞察规则
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightRules {
    pub hold_keyword: String,             // 状态含此词视为挂起
    pub closed_keywords: Vec<String>,     // 状态含任一词视为非未结
    pub payment_column: Vec<String>,      // 付款状态列名片段（需同时包含）
    pub payment_block_keyword: String,    // 付款状态含此词视为付款阻断
    pub entry_date_column: Vec<String>,   // 录入日期列名片段
    pub ready_date_column: Vec<String>,   // 备货完成日期列名片段
    pub shipment_date_column: Vec<String>, // 发运日期列名片段
    pub aging_threshold_days: i64,        // 挂起超期阈值（天）
    pub aging_hold_limit: usize,          // 超期挂起清单条数上限
    pub timeline_limit: usize,            // 发运时间线条数上限
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            hold_keyword: "HOLD".to_string(),
            closed_keywords: vec![
                "HOLD".to_string(),
                "COMPLETE".to_string(),
                "FINAL".to_string(),
            ],
            payment_column: vec!["payment".to_string(), "status".to_string()],
            payment_block_keyword: "PAYMENT".to_string(),
            entry_date_column: vec!["entry date".to_string()],
            ready_date_column: vec!["ready".to_string(), "date".to_string()],
            shipment_date_column: vec!["shipment".to_string(), "date".to_string()],
            aging_threshold_days: 30,
            aging_hold_limit: 10,
            timeline_limit: 50,
        }
    }
}

// ==========================================
// IngestConfig - 摄取配置全集
// ==========================================
// 列名模式: 外层为按优先级排列的备选，内层片段需同时出现在列名中
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    // ===== 主表（S&OP）=====
    pub master_sheet_fragments: Vec<String>,
    pub master_header: HeaderRule,
    pub order_id_patterns: Vec<Vec<String>>,
    pub placeholder_ids: Vec<String>,
    pub pallet_patterns: Vec<Vec<String>>,

    // ===== 明细表（Orders）=====
    pub detail_sheet_name: String,
    pub detail_header: HeaderRule,
    pub detail_id_patterns: Vec<Vec<String>>,
    pub quantity_patterns: Vec<Vec<String>>,
    pub product_code_patterns: Vec<Vec<String>>,

    // ===== 库存（Stocklist）=====
    pub stock_locations: Vec<StockLocationConfig>,
    pub stock_product_patterns: Vec<Vec<String>>,
    pub stock_quantity_patterns: Vec<Vec<String>>,

    // ===== 洞察与缓存 =====
    pub insights: InsightRules,
    pub cache_capacity: usize,
}

fn patterns(raw: &[&[&str]]) -> Vec<Vec<String>> {
    raw.iter()
        .map(|fragments| fragments.iter().map(|f| f.to_string()).collect())
        .collect()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            master_sheet_fragments: vec!["S&OP".to_string(), "Meeting".to_string()],
            master_header: HeaderRule::new(&["status", "country"], 15, 0),
            order_id_patterns: patterns(&[&["proforma"]]),
            placeholder_ids: vec![
                "input".to_string(),
                "formula".to_string(),
                "nan".to_string(),
                "order number".to_string(),
            ],
            pallet_patterns: patterns(&[&["pallet"]]),

            detail_sheet_name: "Orders".to_string(),
            detail_header: HeaderRule::new(&["order", "number"], 30, 20),
            detail_id_patterns: patterns(&[&["order", "number"]]),
            quantity_patterns: patterns(&[&["quantity"]]),
            product_code_patterns: patterns(&[
                &["product", "code"],
                &["item", "code"],
                &["article"],
                &["sku"],
            ]),

            stock_locations: vec![
                StockLocationConfig::new("NL", &["code"], 15, 2),
                StockLocationConfig::new("EE", &["code"], 15, 0),
            ],
            stock_product_patterns: patterns(&[
                &["product", "code"],
                &["item", "code"],
                &["article"],
                &["sku"],
                &["code"],
            ]),
            stock_quantity_patterns: patterns(&[
                &["stock", "qty"],
                &["available"],
                &["quantity"],
                &["qty"],
                &["stock"],
            ]),

            insights: InsightRules::default(),
            cache_capacity: 8,
        }
    }
}

impl IngestConfigReader for IngestConfig {
    fn master_sheet_fragments(&self) -> &[String] {
        &self.master_sheet_fragments
    }

    fn master_header_rule(&self) -> &HeaderRule {
        &self.master_header
    }

    fn order_id_patterns(&self) -> &[Vec<String>] {
        &self.order_id_patterns
    }

    fn placeholder_ids(&self) -> &[String] {
        &self.placeholder_ids
    }

    fn pallet_patterns(&self) -> &[Vec<String>] {
        &self.pallet_patterns
    }

    fn detail_sheet_name(&self) -> &str {
        &self.detail_sheet_name
    }

    fn detail_header_rule(&self) -> &HeaderRule {
        &self.detail_header
    }

    fn detail_id_patterns(&self) -> &[Vec<String>] {
        &self.detail_id_patterns
    }

    fn quantity_patterns(&self) -> &[Vec<String>] {
        &self.quantity_patterns
    }

    fn product_code_patterns(&self) -> &[Vec<String>] {
        &self.product_code_patterns
    }

    fn stock_locations(&self) -> &[StockLocationConfig] {
        &self.stock_locations
    }

    fn stock_product_patterns(&self) -> &[Vec<String>] {
        &self.stock_product_patterns
    }

    fn stock_quantity_patterns(&self) -> &[Vec<String>] {
        &self.stock_quantity_patterns
    }

    fn insight_rules(&self) -> &InsightRules {
        &self.insights
    }

    fn cache_capacity(&self) -> usize {
        self.cache_capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_header_rules() {
        let config = IngestConfig::default();
        assert_eq!(config.master_header.window, 15);
        assert_eq!(config.master_header.fallback_row, 0);
        assert_eq!(config.detail_header.window, 30);
        assert_eq!(config.detail_header.fallback_row, 20);
    }

    #[test]
    fn test_default_stock_locations() {
        let config = IngestConfig::default();
        let tags: Vec<_> = config.stock_locations.iter().map(|l| l.tag.as_str()).collect();
        assert_eq!(tags, vec!["NL", "EE"]);
        assert_eq!(
            config.stock_locations[0].sheet_fragments,
            vec!["stocklist".to_string(), "nl".to_string()]
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: IngestConfig =
            serde_json::from_str(r#"{ "detail_sheet_name": "Order Lines" }"#).unwrap();
        assert_eq!(config.detail_sheet_name, "Order Lines");
        assert_eq!(config.master_header.window, 15);
        assert_eq!(config.insights.aging_threshold_days, 30);
    }
}
