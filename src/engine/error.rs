// ==========================================
// 校务排课系统 - 引擎层错误类型
// ==========================================
// 分类: NotFound / Conflict / InvalidInput / PersistenceFailure
// 冲突必须带出冲突对象（教室 + 时段 / 代课教师 + 日期区间）
// ==========================================

use crate::engine::interval::IntervalError;
use crate::repository::error::RepositoryError;
use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// 错误大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InvalidInput,
    PersistenceFailure,
}

/// 引擎层错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("{entity}不存在: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("教室时段被占用: room={room_number}, start={start}, duration={duration_sec}s")]
    RoomUnavailable {
        room_number: String,
        start: NaiveTime,
        duration_sec: i64,
    },

    #[error("代课教师不可用: substitute={substitute_number}, {start_date}..={end_date}")]
    SubstituteUnavailable {
        substitute_number: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("持久化失败: {0}")]
    Persistence(#[from] RepositoryError),
}

impl EngineError {
    pub fn not_found(entity: &'static str, key: impl Into<String>) -> Self {
        EngineError::NotFound {
            entity,
            key: key.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::NotFound { .. } => ErrorKind::NotFound,
            EngineError::RoomUnavailable { .. } | EngineError::SubstituteUnavailable { .. } => {
                ErrorKind::Conflict
            }
            EngineError::InvalidInput(_) => ErrorKind::InvalidInput,
            EngineError::Persistence(_) => ErrorKind::PersistenceFailure,
        }
    }
}

impl From<IntervalError> for EngineError {
    fn from(err: IntervalError) -> Self {
        EngineError::InvalidInput(err.to_string())
    }
}

/// Result 类型别名
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(EngineError::not_found("教职工", "T9").kind(), ErrorKind::NotFound);
        assert_eq!(
            EngineError::from(IntervalError::NonPositiveDuration(0)).kind(),
            ErrorKind::InvalidInput
        );
        assert_eq!(
            EngineError::from(RepositoryError::LockError("poisoned".into())).kind(),
            ErrorKind::PersistenceFailure
        );
    }
}
