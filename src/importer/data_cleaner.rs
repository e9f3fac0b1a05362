// ==========================================
// S&OP 控制塔 - 数据清洗器实现
// ==========================================
// 职责: 按字段类型统一落哨兵（日期 / 数量 / 状态 / 文本）
// 红线: 所有转换失败就地消化，从不返回错误
// ==========================================

use crate::domain::cell::CellValue;
use crate::domain::order::UNKNOWN_STATUS;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Excel 序列日期的最大合法值（9999-12-31）
const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// 文本日期的候选格式（先月后日，失败再尝试日在前）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%d.%m.%Y", "%m/%d/%Y", "%d/%m/%Y", "%d-%m-%Y", "%d %b %Y",
    "%d-%b-%Y", "%b %d, %Y",
];

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本（TRIM，可选 UPPER）
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// 标准化 NULL（空/空白 → None）
    pub fn normalize_null(&self, value: &CellValue) -> Option<String> {
        value.as_trimmed_text()
    }

    /// 数值转换（失败为 None）
    ///
    /// 文本去空白后按浮点解析，NaN/无穷视为无效。
    pub fn parse_number(&self, value: &CellValue) -> Option<f64> {
        let n = match value {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.trim().parse::<f64>().ok()?,
            _ => return None,
        };
        n.is_finite().then_some(n)
    }

    /// 数量转换（非数值 → 0）
    pub fn coerce_quantity(&self, value: &CellValue) -> f64 {
        self.parse_number(value).unwrap_or(0.0)
    }

    /// 状态标准化（TRIM + UPPER，缺失 → UNKNOWN）
    pub fn normalize_status(&self, value: Option<&CellValue>) -> String {
        value
            .and_then(|v| self.normalize_null(v))
            .map(|s| self.clean_text(&s, true))
            .unwrap_or_else(|| UNKNOWN_STATUS.to_string())
    }

    /// 日期时间转换（无法解析 → None 哨兵）
    ///
    /// # 规则
    /// - 原生日期单元格直接使用
    /// - 数值按 Excel 1900 序列日期解释
    /// - 文本依次尝试常见格式
    pub fn coerce_datetime(&self, value: &CellValue) -> Option<NaiveDateTime> {
        match value {
            CellValue::DateTime(dt) => Some(*dt),
            CellValue::Number(n) => excel_serial_to_datetime(*n),
            CellValue::Text(s) => parse_datetime_text(s),
            _ => None,
        }
    }
}

/// Excel 序列日期 → NaiveDateTime
///
/// 1900 日期系统：序列 1 = 1900-01-01，且保留 1900-02-29 这一虚构日（序列 60）。
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_EXCEL_SERIAL {
        return None;
    }

    let adjusted = if serial < 60.0 { serial + 1.0 } else { serial };
    let days = adjusted.trunc() as i64;
    let seconds = (adjusted.fract() * 86_400.0).round() as i64;

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// 文本日期解析
pub fn parse_datetime_text(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    // ISO 8601 带时区（calamine DateTimeIso）
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.naive_utc())
}
