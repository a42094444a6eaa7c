// ==========================================
// 校务排课系统 - 操作日志领域模型
// ==========================================
// 红线: 所有成功写入都记录（写入提交后追加，失败仅告警）
// 对齐: action_log 表
// ==========================================

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActionLog - 操作日志
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionLog {
    pub action_id: String,               // 日志ID (uuid)
    pub action_type: String,             // 操作类型 (存储为字符串)
    pub action_ts: NaiveDateTime,        // 操作时间戳
    pub actor: String,                   // 操作人
    pub payload_json: Option<JsonValue>, // 操作参数 (JSON)
    pub detail: Option<String>,          // 详细描述
}

// ==========================================
// ActionType - 操作类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionType {
    CreateClass,   // 新建班级
    FillClass,     // 分配教职工并填充学生
    SubmitTimeOff, // 提交请假单
}

impl ActionType {
    /// 转换为字符串 (用于数据库存储)
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::CreateClass => "CREATE_CLASS",
            ActionType::FillClass => "FILL_CLASS",
            ActionType::SubmitTimeOff => "SUBMIT_TIME_OFF",
        }
    }

    /// 从字符串解析
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "CREATE_CLASS" => Some(ActionType::CreateClass),
            "FILL_CLASS" => Some(ActionType::FillClass),
            "SUBMIT_TIME_OFF" => Some(ActionType::SubmitTimeOff),
            _ => None,
        }
    }
}
