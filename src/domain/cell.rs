// ==========================================
// S&OP 控制塔 - 单元格值模型
// ==========================================
// 职责: 工作簿单元格的无模式表示（表头识别前后通用）
// 红线: 任何单元格都必须可安全字符串化，不允许 panic
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 单元格值
///
/// 由工作簿读取层从 calamine 的 `Data` 转换而来，
/// 规范化后日期列只会出现 `DateTime` 或 `Empty`（缺失哨兵）。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    DateTime(NaiveDateTime),
    Error(String),
}

/// 原始行（表头识别阶段使用，尚无列模式）
pub type RawRow = Vec<CellValue>;

impl CellValue {
    /// 是否为空（空单元格或纯空白文本）
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 字符串化（不做 trim）
    ///
    /// 整数值的浮点数按整数输出（1002.0 → "1002"），
    /// 避免数值型编号在字符串化后带出 ".0" 尾巴。
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.clone(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Bool(b) => b.to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Error(e) => e.clone(),
        }
    }

    /// 小写字符串形式（表头关键词匹配用）
    pub fn to_lowercase_string(&self) -> String {
        self.to_display_string().to_lowercase()
    }

    /// 去空白后的非空文本
    pub fn as_trimmed_text(&self) -> Option<String> {
        let text = self.to_display_string();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(value: NaiveDateTime) -> Self {
        CellValue::DateTime(value)
    }
}

fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_display_string_whole_number() {
        assert_eq!(CellValue::Number(1002.0).to_display_string(), "1002");
        assert_eq!(CellValue::Number(12.5).to_display_string(), "12.5");
        assert_eq!(CellValue::Number(-3.0).to_display_string(), "-3");
    }

    #[test]
    fn test_display_string_non_text_never_fails() {
        let dt = NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(CellValue::DateTime(dt).to_display_string(), "2025-03-01 00:00:00");
        assert_eq!(CellValue::Bool(true).to_display_string(), "true");
        assert_eq!(CellValue::Empty.to_display_string(), "");
        assert_eq!(CellValue::Number(f64::NAN).to_display_string(), "NaN");
    }

    #[test]
    fn test_is_empty() {
        assert!(CellValue::Empty.is_empty());
        assert!(CellValue::Text("   ".to_string()).is_empty());
        assert!(!CellValue::Number(0.0).is_empty());
        assert!(!CellValue::from("x").is_empty());
    }

    #[test]
    fn test_as_trimmed_text() {
        assert_eq!(
            CellValue::from("  PF-102 ").as_trimmed_text(),
            Some("PF-102".to_string())
        );
        assert_eq!(CellValue::Empty.as_trimmed_text(), None);
    }
}
