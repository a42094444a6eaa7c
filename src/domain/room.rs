// ==========================================
// 校务排课系统 - 教室领域模型
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Room - 教室
// ==========================================
// 约束: 被班级引用后不可修改
// 对齐: room 表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub room_number: String,   // 教室编号 (主键)
    pub capacity: u32,         // 容量 (非负)
    pub phone: Option<String>, // 联系电话
}
