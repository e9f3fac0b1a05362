// ==========================================
// S&OP 控制塔 - 摄取模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级:
// - 致命: 主表缺失/不可读，管道不产出任何表
// - 可恢复: 可选工作表（明细/库位）异常，转为警告
// - 字段转换: 从不向外传播，就地落为哨兵值
// ==========================================

use crate::i18n::t_with_args;
use thiserror::Error;

/// 摄取模块错误类型
#[derive(Error, Debug)]
pub enum IngestError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("工作簿打开失败: {0}")]
    WorkbookOpenError(String),

    // ===== 工作表错误 =====
    #[error("未找到 S&OP 主表（可用工作表: {available:?}）")]
    MasterSheetNotFound { available: Vec<String> },

    #[error("工作表不可读 ({sheet}): {message}")]
    SheetUnreadable { sheet: String, message: String },

    #[error("工作表缺少必需列 ({sheet}): {columns:?}")]
    MissingColumns { sheet: String, columns: Vec<String> },

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 导出错误 =====
    #[error("CSV 导出失败: {0}")]
    CsvExportError(String),

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),
}

impl IngestError {
    /// 面向用户的本地化文本
    ///
    /// 主表缺失时按当前语言列出可用工作表，其余错误沿用错误消息。
    pub fn user_message(&self) -> String {
        match self {
            IngestError::MasterSheetNotFound { available } => {
                let available = available.join(", ");
                t_with_args(
                    "ingest.master_sheet_not_found",
                    &[("available", available.as_str())],
                )
            }
            other => other.to_string(),
        }
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for IngestError {
    fn from(err: std::io::Error) -> Self {
        IngestError::FileReadError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for IngestError {
    fn from(err: calamine::Error) -> Self {
        IngestError::WorkbookOpenError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for IngestError {
    fn from(err: csv::Error) -> Self {
        IngestError::CsvExportError(err.to_string())
    }
}

// 实现 From<serde_json::Error>
impl From<serde_json::Error> for IngestError {
    fn from(err: serde_json::Error) -> Self {
        IngestError::InternalError(err.to_string())
    }
}

/// Result 类型别名
pub type IngestResult<T> = Result<T, IngestError>;
