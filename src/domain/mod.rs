// ==========================================
// 校务排课系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod action_log;
pub mod class;
pub mod person;
pub mod room;
pub mod roster;
pub mod time_off;
pub mod types;

// 重导出核心类型
pub use action_log::{ActionLog, ActionType};
pub use class::{ClassSession, ClassType};
pub use person::{Staff, Student, Substitute};
pub use room::Room;
pub use roster::{RosterEntry, RosterResult};
pub use time_off::{
    Availability, NewTimeOffRequest, PersonRef, SubstituteCandidate, TimeOffConfirmation,
    TimeOffRequest,
};
pub use types::{ClassTypeCode, RosterRole, HOMEROOM_MARKER};
