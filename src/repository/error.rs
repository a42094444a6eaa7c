// ==========================================
// 校务排课系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use crate::db::{HOMEROOM_CONFLICT_MARKER, ROOM_UNAVAILABLE_MARKER, SUBSTITUTE_COMMITTED_MARKER};
use thiserror::Error;

/// 存储层排他约束（触发器）类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionKind {
    /// 教室时段重叠
    RoomSchedule,
    /// 代课教师已承诺重叠区间
    SubstituteCommitment,
    /// 学生已有其他班主任班
    Homeroom,
}

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    #[error("排他约束违反 ({kind:?}): {message}")]
    ExclusionViolation { kind: ExclusionKind, message: String },

}

impl RepositoryError {
    /// 是否为指定类别的排他约束失败
    pub fn is_exclusion(&self, expected: ExclusionKind) -> bool {
        matches!(self, RepositoryError::ExclusionViolation { kind, .. } if *kind == expected)
    }

    /// 事务开启 / 提交失败
    pub(crate) fn transaction(err: rusqlite::Error) -> Self {
        RepositoryError::DatabaseTransactionError(err.to_string())
    }
}

fn classify_exclusion(msg: &str) -> Option<ExclusionKind> {
    if msg.contains(ROOM_UNAVAILABLE_MARKER) {
        Some(ExclusionKind::RoomSchedule)
    } else if msg.contains(SUBSTITUTE_COMMITTED_MARKER) {
        Some(ExclusionKind::SubstituteCommitment)
    } else if msg.contains(HOMEROOM_CONFLICT_MARKER) {
        Some(ExclusionKind::Homeroom)
    } else {
        None
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if let Some(kind) = classify_exclusion(&msg) {
                    RepositoryError::ExclusionViolation { kind, message: msg }
                } else if msg.contains("UNIQUE") {
                    RepositoryError::UniqueConstraintViolation(msg)
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;
