// ==========================================
// S&OP 控制塔 - 工作表规范化
// ==========================================
// 职责: 表头行 → 字符串列名；数据行 → 主表/明细/库存记录
// 流程: 列名规范化 → 标识列识别与重命名 → 占位行剔除
//       → 日期/状态/托盘/数量按字段类型统一落哨兵
// ==========================================

use crate::config::{IngestConfigReader, StockLocationConfig};
use crate::domain::cell::{CellValue, RawRow};
use crate::domain::inventory::StockRecord;
use crate::domain::order::{
    DetailTable, MasterTable, OrderDetailRecord, OrderRecord, COUNTRY, ORDER_ID, PALLETS,
    PRODUCT_CODE, QUANTITY, STATUS, TOTAL_QTY,
};
use crate::importer::column_matcher::ColumnMatcher;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{IngestError, IngestResult};
use crate::importer::id_reconciler::canonical_id;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info};

/// 日期列判定片段
const DATE_FRAGMENT: &str = "date";

// ==========================================
// SheetTable - 已定位表头的通用表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    pub sheet_name: String,
    pub header_row: usize,
    pub header_detected: bool,
    pub columns: Vec<String>,
    pub rows: Vec<TableRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub source_row: usize, // 工作表行号（1 起）
    pub cells: Vec<CellValue>,
}

impl SheetTable {
    /// 以 header_row 为字段名行构建表
    ///
    /// 表头以下的完全空白行被跳过；所有行补齐到统一列宽。
    pub fn from_rows(
        sheet_name: &str,
        rows: &[RawRow],
        header_row: usize,
        header_detected: bool,
    ) -> Self {
        let header = rows.get(header_row);
        let body = rows.get(header_row + 1..).unwrap_or(&[]);

        let width = body
            .iter()
            .map(|r| r.len())
            .chain(header.map(|h| h.len()))
            .max()
            .unwrap_or(0);

        let columns = normalize_labels(header, width);

        let rows = body
            .iter()
            .enumerate()
            .filter(|(_, row)| !row.iter().all(|c| c.is_empty()))
            .map(|(offset, row)| {
                let mut cells = row.clone();
                cells.resize(width, CellValue::Empty);
                TableRow {
                    source_row: header_row + offset + 2,
                    cells,
                }
            })
            .collect();

        Self {
            sheet_name: sheet_name.to_string(),
            header_row,
            header_detected,
            columns,
            rows,
        }
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// 按匹配器查找列，可排除已占用的列
    pub fn find_column(&self, matcher: &ColumnMatcher, exclude: &[usize]) -> Option<usize> {
        find_excluding(matcher, &self.columns, exclude)
    }

    /// 标识列：已有规范列名 > 模式命中 > 首列
    pub fn resolve_id_column(&self, patterns: &[Vec<String>]) -> Option<usize> {
        if self.columns.is_empty() {
            return None;
        }
        self.column_index(ORDER_ID)
            .or_else(|| self.find_column(&ColumnMatcher::from_patterns(patterns), &[]))
            .or(Some(0))
    }
}

/// 列名规范化
///
/// 先字符串化再去空白；空表头记为 "Unnamed: {列号}"；重名追加 ".1"、".2"。
pub fn normalize_labels(header: Option<&RawRow>, width: usize) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut labels = Vec::with_capacity(width);

    for idx in 0..width {
        let raw = header
            .and_then(|h| h.get(idx))
            .map(|c| c.to_display_string().trim().to_string())
            .unwrap_or_default();
        let base = if raw.is_empty() {
            format!("Unnamed: {}", idx)
        } else {
            raw
        };

        let label = unique_label(&base, &seen);
        seen.insert(label.clone());
        labels.push(label);
    }

    labels
}

fn find_excluding(matcher: &ColumnMatcher, labels: &[String], exclude: &[usize]) -> Option<usize> {
    let masked: Vec<&str> = labels
        .iter()
        .enumerate()
        .map(|(idx, c)| if exclude.contains(&idx) { "" } else { c.as_str() })
        .collect();
    matcher.find(&masked)
}

fn unique_label(base: &str, seen: &HashSet<String>) -> String {
    let mut label = base.to_string();
    let mut n = 1;
    while seen.contains(&label) {
        label = format!("{}.{}", base, n);
        n += 1;
    }
    label
}

/// 将指定列改为规范列名
///
/// 其余列若与规范列名重名，追加 ".1"、".2" 以保持列名唯一。
pub fn rename_columns(columns: &[String], renames: &[(usize, &str)]) -> Vec<String> {
    let mut seen: HashSet<String> = renames.iter().map(|(_, name)| name.to_string()).collect();

    columns
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            if let Some((_, name)) = renames.iter().find(|(i, _)| *i == idx) {
                return name.to_string();
            }
            let label = unique_label(label, &seen);
            seen.insert(label.clone());
            label
        })
        .collect()
}

// ==========================================
// SheetNormalizer - 规范化器
// ==========================================
pub struct SheetNormalizer<'a, C: IngestConfigReader> {
    config: &'a C,
    cleaner: DataCleaner,
}

impl<'a, C: IngestConfigReader> SheetNormalizer<'a, C> {
    pub fn new(config: &'a C) -> Self {
        Self {
            config,
            cleaner: DataCleaner,
        }
    }

    fn is_placeholder(&self, id: &str) -> bool {
        let lowered = id.to_lowercase();
        self.config
            .placeholder_ids()
            .iter()
            .any(|p| p.trim().to_lowercase() == lowered)
    }

    /// 规范化主表
    ///
    /// # 规则
    /// - 标识列重命名为 Order_ID，剔除缺失/占位 ID 的行
    /// - 列名含 "date" 的列解析为日期时间，失败为 None
    /// - Status 列大写去空白，缺失为 UNKNOWN；无此列时合成
    /// - 托盘列转数值，非数值为 0；无此列时合成 0
    /// - Total_Qty 初始化为 0，由合并步骤覆盖
    pub fn normalize_master(&self, table: SheetTable) -> MasterTable {
        let mut columns = table.columns.clone();
        let id_idx = table.resolve_id_column(self.config.order_id_patterns());

        let Some(id_idx) = id_idx else {
            debug!(sheet = %table.sheet_name, "主表无任何列");
            return MasterTable {
                sheet_name: table.sheet_name,
                header_row: table.header_row,
                header_detected: table.header_detected,
                columns: vec![
                    ORDER_ID.to_string(),
                    STATUS.to_string(),
                    PALLETS.to_string(),
                    TOTAL_QTY.to_string(),
                ],
                date_columns: Vec::new(),
                pallet_source: None,
                records: Vec::new(),
            };
        };
        columns[id_idx] = ORDER_ID.to_string();

        let date_matcher = ColumnMatcher::all_of(&[DATE_FRAGMENT]);
        let date_idx: Vec<usize> = columns
            .iter()
            .enumerate()
            .filter(|(idx, c)| *idx != id_idx && date_matcher.matches(c))
            .map(|(idx, _)| idx)
            .collect();
        let status_idx = table.column_index(STATUS).filter(|i| *i != id_idx);
        let country_idx = table.column_index(COUNTRY).filter(|i| *i != id_idx);
        let pallet_idx = table.find_column(
            &ColumnMatcher::from_patterns(self.config.pallet_patterns()),
            &[id_idx],
        );
        let total_idx = table.column_index(TOTAL_QTY).filter(|i| *i != id_idx);

        // 被类型化字段消费的列（不进入 attributes）
        let mut consumed: HashSet<usize> = date_idx.iter().copied().collect();
        consumed.insert(id_idx);
        consumed.extend(status_idx);
        consumed.extend(country_idx);
        consumed.extend(total_idx);
        if let Some(p) = pallet_idx.filter(|p| columns[*p] == PALLETS) {
            consumed.insert(p);
        }

        let total_rows = table.rows.len();
        let mut records = Vec::with_capacity(total_rows);

        for row in &table.rows {
            let Some(order_id) = canonical_id(&row.cells[id_idx]) else {
                continue;
            };
            if self.is_placeholder(&order_id) {
                continue;
            }

            let dates = date_idx
                .iter()
                .map(|i| (columns[*i].clone(), self.cleaner.coerce_datetime(&row.cells[*i])))
                .collect();

            let attributes = columns
                .iter()
                .enumerate()
                .filter(|(idx, _)| !consumed.contains(idx))
                .map(|(idx, c)| (c.clone(), row.cells[idx].clone()))
                .collect();

            records.push(OrderRecord {
                order_id,
                status: self
                    .cleaner
                    .normalize_status(status_idx.map(|i| &row.cells[i])),
                country: country_idx.and_then(|i| self.cleaner.normalize_null(&row.cells[i])),
                dates,
                pallets: pallet_idx
                    .map(|i| self.cleaner.coerce_quantity(&row.cells[i]))
                    .unwrap_or(0.0),
                total_qty: 0.0,
                attributes,
                source_row: row.source_row,
            });
        }

        for synthesized in [STATUS, PALLETS, TOTAL_QTY] {
            if !columns.iter().any(|c| c == synthesized) {
                columns.push(synthesized.to_string());
            }
        }

        info!(
            sheet = %table.sheet_name,
            header_row = table.header_row,
            total_rows,
            kept = records.len(),
            dropped = total_rows - records.len(),
            "主表规范化完成"
        );

        MasterTable {
            sheet_name: table.sheet_name,
            header_row: table.header_row,
            header_detected: table.header_detected,
            date_columns: date_idx.iter().map(|i| columns[*i].clone()).collect(),
            pallet_source: pallet_idx.map(|i| columns[i].clone()),
            columns,
            records,
        }
    }

    /// 规范化明细表
    ///
    /// 无数量列时全部数量为 0（不报错）；产品编码列可缺省。
    pub fn normalize_detail(&self, table: SheetTable) -> DetailTable {
        let Some(id_idx) = table.resolve_id_column(self.config.detail_id_patterns()) else {
            return DetailTable {
                sheet_name: Some(table.sheet_name),
                header_row: Some(table.header_row),
                ..DetailTable::default()
            };
        };

        let qty_idx = table.find_column(
            &ColumnMatcher::from_patterns(self.config.quantity_patterns()),
            &[id_idx],
        );
        let mut occupied = vec![id_idx];
        occupied.extend(qty_idx);
        let product_idx = table.find_column(
            &ColumnMatcher::from_patterns(self.config.product_code_patterns()),
            &occupied,
        );

        let mut renames = vec![(id_idx, ORDER_ID)];
        renames.extend(qty_idx.map(|i| (i, QUANTITY)));
        renames.extend(product_idx.map(|i| (i, PRODUCT_CODE)));
        let columns = rename_columns(&table.columns, &renames);

        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let Some(order_id) = canonical_id(&row.cells[id_idx]) else {
                continue;
            };
            if self.is_placeholder(&order_id) {
                continue;
            }

            let attributes: BTreeMap<String, CellValue> = columns
                .iter()
                .enumerate()
                .filter(|(idx, _)| *idx != id_idx && Some(*idx) != qty_idx && Some(*idx) != product_idx)
                .map(|(idx, c)| (c.clone(), row.cells[idx].clone()))
                .collect();

            records.push(OrderDetailRecord {
                order_id,
                product_code: product_idx.and_then(|i| canonical_id(&row.cells[i])),
                quantity: qty_idx
                    .map(|i| self.cleaner.coerce_quantity(&row.cells[i]))
                    .unwrap_or(0.0),
                attributes,
                source_row: row.source_row,
            });
        }

        info!(
            sheet = %table.sheet_name,
            header_row = table.header_row,
            lines = records.len(),
            quantity_column = ?qty_idx.map(|i| &table.columns[i]),
            product_column = ?product_idx.map(|i| &table.columns[i]),
            "明细表规范化完成"
        );

        DetailTable {
            sheet_name: Some(table.sheet_name.clone()),
            header_row: Some(table.header_row),
            quantity_column: qty_idx.map(|i| table.columns[i].clone()),
            product_column: product_idx.map(|i| table.columns[i].clone()),
            columns,
            records,
        }
    }

    /// 库存表的产品编码列与数量列（数量列不与产品列重合）
    fn stock_columns(&self, labels: &[String]) -> (Option<usize>, Option<usize>) {
        let product_idx = find_excluding(
            &ColumnMatcher::from_patterns(self.config.stock_product_patterns()),
            labels,
            &[],
        );
        let qty_idx = find_excluding(
            &ColumnMatcher::from_patterns(self.config.stock_quantity_patterns()),
            labels,
            &product_idx.into_iter().collect::<Vec<_>>(),
        );
        (product_idx, qty_idx)
    }

    /// 候选行能否作为库存表头：产品编码列与数量列须落在不同单元格
    pub fn is_stock_header(&self, row: &RawRow) -> bool {
        let labels = normalize_labels(Some(row), row.len());
        matches!(self.stock_columns(&labels), (Some(_), Some(_)))
    }

    /// 规范化库位库存表 → (Product_Code, Stock_Qty, Location)
    ///
    /// # 返回
    /// - Err(MissingColumns): 找不到产品编码列或数量列
    pub fn normalize_stock(
        &self,
        table: &SheetTable,
        location: &StockLocationConfig,
    ) -> IngestResult<Vec<StockRecord>> {
        let (product_idx, qty_idx) = self.stock_columns(&table.columns);

        let (product_idx, qty_idx) = match (product_idx, qty_idx) {
            (Some(p), Some(q)) => (p, q),
            (p, q) => {
                let mut missing = Vec::new();
                if p.is_none() {
                    missing.push(PRODUCT_CODE.to_string());
                }
                if q.is_none() {
                    missing.push("Stock_Qty".to_string());
                }
                return Err(IngestError::MissingColumns {
                    sheet: table.sheet_name.clone(),
                    columns: missing,
                });
            }
        };

        let records: Vec<StockRecord> = table
            .rows
            .iter()
            .filter_map(|row| {
                let product_code = canonical_id(&row.cells[product_idx])?;
                Some(StockRecord {
                    product_code,
                    stock_qty: self.cleaner.coerce_quantity(&row.cells[qty_idx]),
                    location: location.tag.clone(),
                })
            })
            .collect();

        info!(
            sheet = %table.sheet_name,
            location = %location.tag,
            header_row = table.header_row,
            product_column = %table.columns[product_idx],
            quantity_column = %table.columns[qty_idx],
            records = records.len(),
            "库位库存规范化完成"
        );

        Ok(records)
    }
}
