// ==========================================
// 校务排课系统 - 领域类型定义
// ==========================================
// 职责: 班级类型编码解析（年级 / 班主任标记）、名单角色
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 班主任班标记（ClassType.id 中包含该子串即为班主任班）
///
/// 注意: db.rs 中的 `trg_student_single_homeroom` 触发器使用同一标记。
pub const HOMEROOM_MARKER: &str = "HR";

// ==========================================
// ClassTypeCode - 班级类型编码
// ==========================================
// 编码规则: 首字符为年级 ("K","1".."5")，含 "HR" 为班主任班
// 例: "1HR" = 一年级班主任班, "3MATH" = 三年级数学课
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassTypeCode(String);

impl ClassTypeCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 派生年级: 编码首字符
    ///
    /// # 返回
    /// - Some(grade): 编码非空
    /// - None: 空编码（无法派生年级）
    pub fn grade(&self) -> Option<String> {
        self.0.trim().chars().next().map(|c| c.to_string())
    }

    /// 是否为班主任班
    pub fn is_homeroom(&self) -> bool {
        self.0.contains(HOMEROOM_MARKER)
    }
}

impl fmt::Display for ClassTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ClassTypeCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

// ==========================================
// 名单角色 (Roster Role)
// ==========================================
// 排序: 学生在前，教职工在后（与名单输出顺序一致）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterRole {
    Student,
    Staff,
}

impl RosterRole {
    /// 转换为数据库/输出使用的字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            RosterRole::Student => "student",
            RosterRole::Staff => "staff",
        }
    }
}

impl fmt::Display for RosterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_derivation() {
        assert_eq!(ClassTypeCode::from("1HR").grade().as_deref(), Some("1"));
        assert_eq!(ClassTypeCode::from("KHR").grade().as_deref(), Some("K"));
        assert_eq!(ClassTypeCode::from("3MATH").grade().as_deref(), Some("3"));
        assert_eq!(ClassTypeCode::from("").grade(), None);
    }

    #[test]
    fn test_homeroom_flag() {
        assert!(ClassTypeCode::from("2HR").is_homeroom());
        assert!(ClassTypeCode::from("3HR-A").is_homeroom());
        assert!(!ClassTypeCode::from("3ART").is_homeroom());
    }

    #[test]
    fn test_roster_role_order() {
        assert!(RosterRole::Student < RosterRole::Staff);
    }
}
