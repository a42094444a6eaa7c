// ==========================================
// 校务排课系统 - 班级领域模型
// ==========================================
// 对齐: class_type / class 表
// ==========================================

use crate::domain::types::ClassTypeCode;
use chrono::{Duration, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

// ==========================================
// ClassType - 班级类型（静态参考数据）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassType {
    pub id: ClassTypeCode,
    pub description: Option<String>,
}

// ==========================================
// ClassSession - 班级（单次课时段）
// ==========================================
// 不变量: 同一教室内任意两个班级的 [start, start+duration) 不重叠
// 生命周期: 由 ClassAssignmentEngine 创建，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: i64,
    pub number: String,               // 班级编号 (前缀 + id, 如 "C12")
    pub class_type_id: ClassTypeCode, // 班级类型
    pub room_number: String,          // 教室
    pub start_time: NaiveTime,        // 开始时间 (当日时刻)
    pub duration_sec: i64,            // 时长 (秒)
}

impl ClassSession {
    /// 开始时刻（距午夜秒数）
    pub fn start_sec(&self) -> i64 {
        self.start_time.num_seconds_from_midnight() as i64
    }

    /// 时长
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_sec)
    }

    /// 结束时刻（不含）
    ///
    /// 建库约束保证 start + duration <= 24:00；恰好到 24:00 时按回绕返回 00:00。
    pub fn end_time(&self) -> NaiveTime {
        let (end, _) = self.start_time.overflowing_add_signed(self.duration());
        end
    }

    /// 是否为班主任班
    pub fn is_homeroom(&self) -> bool {
        self.class_type_id.is_homeroom()
    }
}
