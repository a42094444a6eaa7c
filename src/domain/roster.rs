// ==========================================
// 校务排课系统 - 班级名单模型
// ==========================================

use crate::domain::class::ClassSession;
use crate::domain::types::RosterRole;
use serde::{Deserialize, Serialize};

/// 名单条目（学生或教职工）
///
/// `seq` 为关联表插入序号，名单按 (role, seq) 排序。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub role: RosterRole,
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    pub seq: i64,
}

/// fill_class 的返回结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterResult {
    pub class: ClassSession,
    pub grade: String,
    pub room_capacity: u32,
    pub newly_enrolled: usize,
    pub entries: Vec<RosterEntry>,
}

impl RosterResult {
    /// 名单中的学生数
    pub fn student_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.role == RosterRole::Student)
            .count()
    }

    /// 按角色取编号列表（保持名单顺序）
    pub fn numbers(&self, role: RosterRole) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.role == role)
            .map(|e| e.number.as_str())
            .collect()
    }
}
