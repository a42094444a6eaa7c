// ==========================================
// 校务排课系统 - 操作日志写入
// ==========================================
// 业务写入已提交后才记录日志；日志写入失败只告警，不回滚、不改变返回值
// ==========================================

use crate::domain::action_log::{ActionLog, ActionType};
use crate::repository::ActionLogRepository;
use tracing::warn;

/// 记录一条操作日志（尽力而为）
pub(crate) fn record_action(
    repo: &ActionLogRepository,
    action_type: ActionType,
    operator: &str,
    payload: serde_json::Value,
    detail: String,
) {
    let action_log = ActionLog {
        action_id: uuid::Uuid::new_v4().to_string(),
        action_type: action_type.as_str().to_string(),
        action_ts: chrono::Local::now().naive_local(),
        actor: operator.to_string(),
        payload_json: Some(payload),
        detail: Some(detail),
    };

    if let Err(e) = repo.insert(&action_log) {
        warn!(
            action_id = %action_log.action_id,
            action_type = action_type.as_str(),
            error = %e,
            "操作日志写入失败，业务写入已生效"
        );
    }
}
