// ==========================================
// 校务排课系统 - 主入口
// ==========================================
// 职责: 初始化日志与应用上下文，输出数据概况
// 初始化失败即退出（非零退出码）
// ==========================================

use school_scheduler::app::{get_default_db_path, AppState};
use school_scheduler::logging;

/// 日志格式环境变量（"json" 为 JSON 行格式）
const LOG_FORMAT_ENV: &str = "SCHOOL_SCHEDULER_LOG_FORMAT";

fn main() {
    match std::env::var(LOG_FORMAT_ENV).as_deref() {
        Ok("json") => logging::init_json(),
        _ => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{}", school_scheduler::APP_NAME);
    tracing::info!("系统版本: {}", school_scheduler::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!("AppState初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    let rooms = app_state.class_api.list_rooms();
    let classes = app_state.class_api.list_classes();
    match (rooms, classes) {
        (Ok(rooms), Ok(classes)) => {
            tracing::info!(rooms = rooms.len(), classes = classes.len(), "数据概况");
        }
        (Err(e), _) | (_, Err(e)) => {
            tracing::error!("读取数据概况失败: {}", e);
            std::process::exit(1);
        }
    }
}
