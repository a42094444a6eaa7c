// ==========================================
// 校务排课系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 核心: 教室冲突检测 / 班级分配 / 请假代课匹配
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - CSV 参考数据
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一/建库）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 上下文装配
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    ActionLog, ActionType, Availability, ClassSession, ClassType, ClassTypeCode, Room,
    RosterEntry, RosterResult, RosterRole, Staff, Student, Substitute, SubstituteCandidate,
    TimeOffConfirmation, TimeOffRequest,
};

// 引擎
pub use engine::{
    AvailabilityIndex, ClassAssignmentEngine, ConflictChecker, DateRange, EngineError,
    TimeOffMatcher, TimeSlot,
};

// API
pub use api::{ApiError, ApiResult, ClassApi, TimeOffApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "校务排课系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
