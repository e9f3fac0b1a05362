// ==========================================
// S&OP 控制塔 - 标识符规范化
// ==========================================
// 职责: 订单号/产品编码跨工作表统一口径
// 红线: 所有关联（主表↔明细、需求↔库存）两侧必须调用同一函数
// ==========================================

use crate::domain::cell::CellValue;

/// 浮点存储回写产生的尾巴
const FLOAT_ARTIFACT: &str = ".0";

/// 规范化标识符文本
///
/// 去首尾空白，并反复剥离尾部 ".0"（"1002.0" → "1002"），大小写保持不变。
/// 结果满足幂等：`canonicalize_id(&canonicalize_id(x)) == canonicalize_id(x)`。
pub fn canonicalize_id(raw: &str) -> String {
    let mut id = raw.trim();
    while let Some(stripped) = id.strip_suffix(FLOAT_ARTIFACT) {
        id = stripped.trim_end();
    }
    id.to_string()
}

/// 单元格 → 规范标识符（空值为 None）
pub fn canonical_id(value: &CellValue) -> Option<String> {
    let id = canonicalize_id(&value.to_display_string());
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}
