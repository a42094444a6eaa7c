// ==========================================
// 校务排课系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod action_log_repo;
pub mod class_repo;
pub mod enrollment_repo;
pub mod error;
pub mod person_repo;
pub mod room_repo;
pub mod substitute_repo;
pub mod time_off_repo;

// 重导出核心仓储
pub use action_log_repo::ActionLogRepository;
pub use class_repo::ClassRepository;
pub use enrollment_repo::EnrollmentRepository;
pub use error::{ExclusionKind, RepositoryError, RepositoryResult};
pub use person_repo::{StaffRepository, StudentRepository};
pub use room_repo::RoomRepository;
pub use substitute_repo::SubstituteRepository;
pub use time_off_repo::TimeOffRepository;
