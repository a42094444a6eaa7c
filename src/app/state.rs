// ==========================================
// 校务排课系统 - 应用状态
// ==========================================
// 职责: 启动时一次性打开连接、建库，并装配仓储 / 引擎 / API
// 初始化失败即启动失败，不做惰性重试
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{ClassApi, TimeOffApi};
use crate::config::ConfigManager;
use crate::db::{init_schema, open_sqlite_connection, read_schema_version};
use crate::engine::{ClassAssignmentEngine, SchedulingRepositories, TimeOffMatcher};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "SCHOOL_SCHEDULER_DB_PATH";

/// 应用状态
///
/// 包含所有API实例和共享资源
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 共享连接
    pub conn: Arc<Mutex<Connection>>,

    /// 仓储集合
    pub repos: SchedulingRepositories,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,

    /// 班级API
    pub class_api: Arc<ClassApi>,

    /// 请假API
    pub time_off_api: Arc<TimeOffApi>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（":memory:" 亦可）
    ///
    /// # 说明
    /// 该方法会：
    /// 1. 打开连接并应用统一 PRAGMA
    /// 2. 建库（幂等）
    /// 3. 初始化所有Repository / Engine / API
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path).map_err(|e| format!("无法打开数据库: {}", e))?;
        init_schema(&conn).map_err(|e| format!("建库失败: {}", e))?;
        let schema_version = read_schema_version(&conn).map_err(|e| format!("读取schema_version失败: {}", e))?;
        tracing::info!(schema_version = ?schema_version, "数据库已就绪");

        Self::from_connection(db_path, Arc::new(Mutex::new(conn)))
    }

    /// 基于已建库的共享连接装配
    pub fn from_connection(db_path: String, conn: Arc<Mutex<Connection>>) -> Result<Self, String> {
        // ==========================================
        // 初始化Repository层
        // ==========================================
        let repos = SchedulingRepositories::from_connection(conn.clone());

        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        // ==========================================
        // 初始化Engine层
        // ==========================================
        let class_engine = Arc::new(ClassAssignmentEngine::new(
            repos.clone(),
            config_manager.clone(),
        ));
        let time_off_matcher = Arc::new(TimeOffMatcher::new(repos.clone(), config_manager.clone()));

        // ==========================================
        // 初始化API层
        // ==========================================
        let class_api = Arc::new(ClassApi::new(class_engine, repos.clone()));
        let time_off_api = Arc::new(TimeOffApi::new(
            time_off_matcher,
            repos.action_log_repo.clone(),
        ));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            db_path,
            conn,
            repos,
            config_manager,
            class_api,
            time_off_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 优先级: 环境变量 > 用户数据目录 > 当前目录
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./school_scheduler.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("school-scheduler");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("school_scheduler.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_in_memory() {
        let state = AppState::new(":memory:".to_string()).unwrap();
        assert!(state.class_api.list_rooms().unwrap().is_empty());
        assert_eq!(state.db_path, ":memory:");
    }
}
