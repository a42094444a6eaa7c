// ==========================================
// 校务排课系统 - 应用层
// ==========================================
// 职责: 应用上下文装配
// ==========================================

pub mod state;

// 重导出
pub use state::{get_default_db_path, AppState, DB_PATH_ENV};
