// ==========================================
// S&OP 控制塔 - 表头定位器
// ==========================================
// 职责: 在有限前导行窗口内寻找包含全部关键词的表头行
// 说明: 兜底行号由调用方给出，属于尽力而为的启发式，不保证正确
// ==========================================

use crate::config::HeaderRule;
use crate::domain::cell::RawRow;
use crate::domain::types::HeaderLocation;
use tracing::debug;

pub struct HeaderLocator;

impl HeaderLocator {
    /// 定位表头行
    ///
    /// # 参数
    /// - rows: 工作表原始行（从第 1 行起）
    /// - keywords: 关键词集合（每个关键词至少被该行一个单元格包含）
    /// - window: 最多扫描的前导行数
    ///
    /// # 返回
    /// - Found(idx): 第一个命中行
    /// - NotFound: 窗口内无命中，或关键词为空
    pub fn locate<K: AsRef<str>>(&self, rows: &[RawRow], keywords: &[K], window: usize) -> HeaderLocation {
        self.locate_where(rows, keywords, window, |_| true)
    }

    /// 定位表头行，命中行还须通过 accept 校验
    pub fn locate_where<K, F>(
        &self,
        rows: &[RawRow],
        keywords: &[K],
        window: usize,
        accept: F,
    ) -> HeaderLocation
    where
        K: AsRef<str>,
        F: Fn(&RawRow) -> bool,
    {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        if keywords.is_empty() {
            return HeaderLocation::NotFound;
        }

        rows.iter()
            .take(window)
            .position(|row| Self::row_matches(row, &keywords) && accept(row))
            .map(HeaderLocation::Found)
            .unwrap_or(HeaderLocation::NotFound)
    }

    /// 按规则定位并解析出实际行号
    ///
    /// # 返回
    /// - (行号, 是否由关键词命中)
    pub fn resolve(&self, rows: &[RawRow], rule: &HeaderRule) -> (usize, bool) {
        self.resolve_where(rows, rule, |_| true)
    }

    /// 同 resolve，候选行须通过 accept 校验
    pub fn resolve_where<F>(&self, rows: &[RawRow], rule: &HeaderRule, accept: F) -> (usize, bool)
    where
        F: Fn(&RawRow) -> bool,
    {
        let location = self.locate_where(rows, &rule.keywords, rule.window, accept);
        let header_row = location.resolve(rule.fallback_row);
        debug!(
            ?location,
            header_row,
            window = rule.window,
            keywords = ?rule.keywords,
            "表头定位完成"
        );
        (header_row, location.is_found())
    }

    fn row_matches(row: &RawRow, keywords: &[String]) -> bool {
        let cells: Vec<String> = row.iter().map(|c| c.to_lowercase_string()).collect();
        keywords
            .iter()
            .all(|keyword| cells.iter().any(|cell| cell.contains(keyword.as_str())))
    }
}
