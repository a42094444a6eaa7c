// ==========================================
// 校务排课系统 - 引擎层
// ==========================================
// 职责: 实现排课业务规则,不拼 SQL
// 依赖方向: engine -> repository / domain / config
// ==========================================

pub mod availability;
pub mod class_assignment;
pub mod conflict;
pub mod error;
pub mod interval;
pub mod repositories;
pub mod substitute_matcher;

// 重导出核心引擎
pub use availability::AvailabilityIndex;
pub use class_assignment::ClassAssignmentEngine;
pub use conflict::ConflictChecker;
pub use error::{EngineError, EngineResult, ErrorKind};
pub use interval::{date_range_covers, date_range_overlaps, time_overlaps, DateRange, IntervalError, TimeSlot};
pub use repositories::SchedulingRepositories;
pub use substitute_matcher::TimeOffMatcher;
