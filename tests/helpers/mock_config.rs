// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================
// 验证管道只通过 IngestConfigReader 读取参数
// ==========================================

use sop_control_tower::config::{
    HeaderRule, IngestConfig, IngestConfigReader, InsightRules, StockLocationConfig,
};

/// Mock 配置结构：主表名 "Board"，明细表名 "Lines"，单库位 "WH"
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub base: IngestConfig,
    pub master_sheet_fragments: Vec<String>,
    pub detail_sheet_name: String,
    pub stock_locations: Vec<StockLocationConfig>,
}

impl MockConfig {
    /// 创建默认 Mock 配置
    pub fn default() -> Self {
        Self {
            base: IngestConfig::default(),
            master_sheet_fragments: vec!["Board".to_string()],
            detail_sheet_name: "Lines".to_string(),
            stock_locations: vec![StockLocationConfig::new("WH", &["sku"], 5, 0)],
        }
    }
}

impl IngestConfigReader for MockConfig {
    fn master_sheet_fragments(&self) -> &[String] {
        &self.master_sheet_fragments
    }

    fn master_header_rule(&self) -> &HeaderRule {
        self.base.master_header_rule()
    }

    fn order_id_patterns(&self) -> &[Vec<String>] {
        self.base.order_id_patterns()
    }

    fn placeholder_ids(&self) -> &[String] {
        self.base.placeholder_ids()
    }

    fn pallet_patterns(&self) -> &[Vec<String>] {
        self.base.pallet_patterns()
    }

    fn detail_sheet_name(&self) -> &str {
        &self.detail_sheet_name
    }

    fn detail_header_rule(&self) -> &HeaderRule {
        self.base.detail_header_rule()
    }

    fn detail_id_patterns(&self) -> &[Vec<String>] {
        self.base.detail_id_patterns()
    }

    fn quantity_patterns(&self) -> &[Vec<String>] {
        self.base.quantity_patterns()
    }

    fn product_code_patterns(&self) -> &[Vec<String>] {
        self.base.product_code_patterns()
    }

    fn stock_locations(&self) -> &[StockLocationConfig] {
        &self.stock_locations
    }

    fn stock_product_patterns(&self) -> &[Vec<String>] {
        self.base.stock_product_patterns()
    }

    fn stock_quantity_patterns(&self) -> &[Vec<String>] {
        self.base.stock_quantity_patterns()
    }

    fn insight_rules(&self) -> &InsightRules {
        self.base.insight_rules()
    }

    fn cache_capacity(&self) -> usize {
        0
    }
}
