// ==========================================
// 校务排课系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 行号从 1 开始，不含表头
// ==========================================

use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("目录不存在: {0}")]
    DirectoryNotFound(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 数据映射错误 =====
    #[error("必填字段缺失 ({table} 行 {row}): {field}")]
    MissingField {
        table: &'static str,
        row: usize,
        field: &'static str,
    },

    #[error("类型转换失败 ({table} 行 {row}, 字段 {field}): {message}")]
    TypeConversionError {
        table: &'static str,
        row: usize,
        field: &'static str,
        message: String,
    },

    #[error("引用不存在 ({table} 行 {row}): {message}")]
    DanglingReference {
        table: &'static str,
        row: usize,
        message: String,
    },

    // ===== 数据库错误 =====
    #[error("写入失败: {0}")]
    Repository(#[from] RepositoryError),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
