// ==========================================
// 校务排课系统 - 导入层
// ==========================================
// 职责: 从 CSV 目录加载参考数据（教室、班级类型、人员、可用区间）及已有课表、请假单
// ==========================================

pub mod csv_loader;
pub mod error;

// 重导出核心类型
pub use csv_loader::{parse_csv, CsvSeedLoader, SeedRejection, SeedReport, TableLoadStats};
pub use error::{ImportError, ImportResult};
