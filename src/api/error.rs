// ==========================================
// 校务排课系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，把引擎/仓储错误转换为调用方可读的错误消息
// ==========================================

use crate::engine::error::EngineError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("教室不可用: {0}")]
    RoomUnavailable(String),

    #[error("代课教师不可用: {0}")]
    SubstituteUnavailable(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

}

impl ApiError {
    /// 是否为冲突类错误（教室 / 代课教师）
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            ApiError::RoomUnavailable(_) | ApiError::SubstituteUnavailable(_)
        )
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::ExclusionViolation { kind, message } => {
                ApiError::BusinessRuleViolation(format!("排他约束违反({:?}): {}", kind, message))
            }
        }
    }
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            EngineError::RoomUnavailable { .. } => ApiError::RoomUnavailable(err.to_string()),
            EngineError::SubstituteUnavailable { .. } => {
                ApiError::SubstituteUnavailable(err.to_string())
            }
            EngineError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EngineError::Persistence(repo_err) => ApiError::from(repo_err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
