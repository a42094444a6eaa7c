// ==========================================
// 校务排课系统 - API 层
// ==========================================
// 职责: 入参解析与校验、错误映射、操作日志
// ==========================================

mod audit;
pub mod class_api;
pub mod error;
pub mod input;
pub mod time_off_api;

// 重导出核心类型
pub use class_api::ClassApi;
pub use error::{ApiError, ApiResult};
pub use time_off_api::TimeOffApi;
