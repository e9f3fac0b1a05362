// ==========================================
// S&OP 控制塔 - 工作簿读取
// ==========================================
// 职责: 打开上传的工作簿（.xlsx/.xlsm/.xls），枚举工作表并物化单元格
// 说明: calamine 的 Range 从首个非空单元格开始，这里统一回填为从 A1 起，
//       保证表头行号是工作表的绝对行号
// ==========================================

use crate::domain::cell::{CellValue, RawRow};
use crate::importer::data_cleaner::{excel_serial_to_datetime, parse_datetime_text};
use crate::importer::error::{IngestError, IngestResult};
use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// 支持的扩展名
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls"];

// ==========================================
// Sheet - 单个工作表
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    name: String,
    content: Result<Vec<RawRow>, String>, // Err 为读取失败原因
}

impl Sheet {
    pub fn new(name: impl Into<String>, rows: Vec<RawRow>) -> Self {
        Self {
            name: name.into(),
            content: Ok(rows),
        }
    }

    pub fn unreadable(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: Err(reason.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 全部行（读取失败时返回 SheetUnreadable）
    pub fn rows(&self) -> IngestResult<&[RawRow]> {
        self.content
            .as_deref()
            .map_err(|reason| IngestError::SheetUnreadable {
                sheet: self.name.clone(),
                message: reason.clone(),
            })
    }
}

// ==========================================
// Workbook - 工作簿（加载后不可变）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    /// 由已物化的工作表构建
    pub fn from_sheets(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    /// 从内存字节解析（格式自动识别）
    ///
    /// 单个工作表读取失败不会中断，记录为不可读工作表，由调用方决定是否致命。
    pub fn from_bytes(bytes: &[u8]) -> IngestResult<Self> {
        let mut reader = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

        let names = reader.sheet_names();
        let mut sheets = Vec::with_capacity(names.len());

        for name in names {
            match reader.worksheet_range(&name) {
                Ok(range) => {
                    let rows = range_to_rows(&range);
                    debug!(sheet = %name, rows = rows.len(), "工作表读取完成");
                    sheets.push(Sheet::new(name, rows));
                }
                Err(e) => {
                    warn!(sheet = %name, error = %e, "工作表读取失败");
                    sheets.push(Sheet::unreadable(name, e.to_string()));
                }
            }
        }

        Ok(Self { sheets })
    }

    /// 从文件读取
    pub fn open<P: AsRef<Path>>(path: P) -> IngestResult<Self> {
        let path = path.as_ref();
        check_extension(path)?;

        if !path.exists() {
            return Err(IngestError::FileNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<String> {
        self.sheets.iter().map(|s| s.name.clone()).collect()
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// 第一个满足条件的工作表
    pub fn find_sheet<F>(&self, predicate: F) -> Option<&Sheet>
    where
        F: Fn(&str) -> bool,
    {
        self.sheets.iter().find(|s| predicate(&s.name))
    }
}

/// 校验扩展名
pub fn check_extension(path: &Path) -> IngestResult<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    if SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(IngestError::UnsupportedFormat(ext))
    }
}

/// Range → 从 A1 起的行集合
fn range_to_rows(range: &Range<Data>) -> Vec<RawRow> {
    let (start_row, start_col) = match range.start() {
        Some((row, col)) => (row as usize, col as usize),
        None => return Vec::new(),
    };

    let mut rows: Vec<RawRow> = vec![Vec::new(); start_row];
    for source_row in range.rows() {
        let mut cells = vec![CellValue::Empty; start_col];
        cells.extend(source_row.iter().map(cell_from_data));
        rows.push(cells);
    }
    rows
}

/// calamine 单元格 → CellValue
fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            if dt.is_duration() {
                return CellValue::Number(serial);
            }
            excel_serial_to_datetime(serial)
                .map(CellValue::DateTime)
                .unwrap_or(CellValue::Number(serial))
        }
        Data::DateTimeIso(s) => parse_datetime_text(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(s.clone())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
        #[allow(unreachable_patterns)]
        _ => CellValue::Text(data.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_from_data_basic() {
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            cell_from_data(&Data::String("PF-1".to_string())),
            CellValue::from("PF-1")
        );
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn test_range_anchored_at_a1() {
        let mut range: Range<Data> = Range::new((2, 1), (3, 2));
        range.set_value((2, 1), Data::String("Status".to_string()));
        range.set_value((3, 2), Data::Float(4.0));

        let rows = range_to_rows(&range);
        assert_eq!(rows.len(), 4);
        assert!(rows[0].is_empty());
        assert_eq!(rows[2][1], CellValue::from("Status"));
        assert_eq!(rows[3][2], CellValue::Number(4.0));
        assert_eq!(rows[3][0], CellValue::Empty);
    }

    #[test]
    fn test_unreadable_sheet_reports_error() {
        let sheet = Sheet::unreadable("Stocklist NL", "corrupt");
        assert!(matches!(
            sheet.rows(),
            Err(IngestError::SheetUnreadable { .. })
        ));
    }

    #[test]
    fn test_from_bytes_rejects_garbage() {
        let result = Workbook::from_bytes(b"definitely not a workbook");
        assert!(matches!(result, Err(IngestError::WorkbookOpenError(_))));
    }

    #[test]
    fn test_check_extension() {
        assert!(check_extension(Path::new("orders.XLSX")).is_ok());
        assert!(check_extension(Path::new("orders.xls")).is_ok());
        assert!(matches!(
            check_extension(Path::new("orders.csv")),
            Err(IngestError::UnsupportedFormat(_))
        ));
    }
}
