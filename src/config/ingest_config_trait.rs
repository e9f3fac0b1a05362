// ==========================================
// S&OP 控制塔 - 摄取配置读取 Trait
// ==========================================
// 职责: 定义摄取管道所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::ingest_config::{HeaderRule, InsightRules, StockLocationConfig};

// ==========================================
// IngestConfigReader Trait
// ==========================================
// 用途: 摄取管道读取启发式参数
// 实现者: IngestConfig
pub trait IngestConfigReader: Send + Sync {
    // ===== 主表 =====

    /// 主表工作表名片段（任一命中即可）
    ///
    /// # 默认值
    /// - ["S&OP", "Meeting"]
    fn master_sheet_fragments(&self) -> &[String];

    /// 主表表头规则
    ///
    /// # 默认值
    /// - 关键词 {status, country}，窗口 15 行，兜底第 0 行
    fn master_header_rule(&self) -> &HeaderRule;

    /// 主表订单号列名模式，无命中时回退到首列
    fn order_id_patterns(&self) -> &[Vec<String>];

    /// 占位/说明行的订单号取值（不区分大小写）
    ///
    /// # 默认值
    /// - {"input", "formula", "nan", "order number"}
    fn placeholder_ids(&self) -> &[String];

    /// 托盘数列名模式
    fn pallet_patterns(&self) -> &[Vec<String>];

    // ===== 明细表 =====

    /// 明细工作表名（去空白后精确匹配）
    fn detail_sheet_name(&self) -> &str;

    /// 明细表表头规则
    ///
    /// # 默认值
    /// - 关键词 {order, number}，窗口 30 行，兜底第 20 行
    fn detail_header_rule(&self) -> &HeaderRule;

    /// 明细表订单号列名模式，无命中时回退到首列
    fn detail_id_patterns(&self) -> &[Vec<String>];

    /// 明细数量列名模式
    fn quantity_patterns(&self) -> &[Vec<String>];

    /// 明细产品编码列名模式
    fn product_code_patterns(&self) -> &[Vec<String>];

    // ===== 库存 =====

    /// 已知库位列表（按顺序加载）
    fn stock_locations(&self) -> &[StockLocationConfig];

    /// 库存表产品编码列名模式
    fn stock_product_patterns(&self) -> &[Vec<String>];

    /// 库存表数量列名模式
    fn stock_quantity_patterns(&self) -> &[Vec<String>];

    // ===== 洞察与缓存 =====

    fn insight_rules(&self) -> &InsightRules;

    /// 摄取结果缓存容量（按内容哈希）
    fn cache_capacity(&self) -> usize;
}
