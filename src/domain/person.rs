// ==========================================
// 校务排课系统 - 人员领域模型
// ==========================================
// 学生 / 教职工 / 代课教师
// 自然键: number；内部主键: id
// ==========================================

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    pub grade: String, // 年级，需与班级类型派生年级一致才可入班
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    pub id: i64,
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    pub work_email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitute {
    pub id: i64,
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    pub work_email: Option<String>,
}

/// 全名 "First Last"
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name)
}

impl Student {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl Staff {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}

impl Substitute {
    pub fn full_name(&self) -> String {
        full_name(&self.first_name, &self.last_name)
    }
}
