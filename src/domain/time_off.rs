// ==========================================
// 校务排课系统 - 代课与请假领域模型
// ==========================================
// 对齐: availability / time_off_request 表
// 日期区间均为闭区间 [start_date, end_date]
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Availability - 代课教师可用区间
// ==========================================
// 同一代课教师可有多条（可重叠），独立存储，不合并
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub id: i64,
    pub substitute_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

// ==========================================
// TimeOffRequest - 请假单
// ==========================================
// substitute_id 非空即视为该代课教师在此区间内“已承诺”
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffRequest {
    pub id: i64,
    pub staff_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub substitute_id: Option<i64>,
}

/// 新建请假单（尚未分配 id）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTimeOffRequest {
    pub staff_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub substitute_id: Option<i64>,
}

/// 人员摘要（编号 + 姓名），用于确认单
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRef {
    pub number: String,
    pub name: String,
}

// ==========================================
// TimeOffConfirmation - 请假确认单（反规范化）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeOffConfirmation {
    pub request_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub staff: PersonRef,
    pub substitute: Option<PersonRef>,
}

// ==========================================
// SubstituteCandidate - 代课候选
// ==========================================
// availability_*: 覆盖目标区间的那条可用区间
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituteCandidate {
    pub substitute_id: i64,
    pub number: String,
    pub first_name: String,
    pub last_name: String,
    pub work_email: Option<String>,
    pub availability_start: NaiveDate,
    pub availability_end: NaiveDate,
    pub already_assigned: bool,
}
