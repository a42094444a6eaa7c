// ==========================================
// 校务排课系统 - 请假 API
// ==========================================
// 职责: 入参解析 + 调用 TimeOffMatcher + 操作日志
// ==========================================

use std::sync::Arc;

use crate::api::audit::record_action;
use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{parse_date, require_non_empty};
use crate::config::ConfigManager;
use crate::domain::action_log::ActionType;
use crate::domain::time_off::{SubstituteCandidate, TimeOffConfirmation};
use crate::engine::{DateRange, TimeOffMatcher};
use crate::repository::ActionLogRepository;

pub struct TimeOffApi {
    matcher: Arc<TimeOffMatcher<ConfigManager>>,
    action_log_repo: Arc<ActionLogRepository>,
}

impl TimeOffApi {
    pub fn new(
        matcher: Arc<TimeOffMatcher<ConfigManager>>,
        action_log_repo: Arc<ActionLogRepository>,
    ) -> Self {
        Self {
            matcher,
            action_log_repo,
        }
    }

    /// 提交请假单
    ///
    /// # 参数
    /// - staff_number: 教职工编号
    /// - start_date / end_date: "YYYY-MM-DD"，闭区间
    /// - reason: 请假原因
    /// - substitute_number: 指定代课教师（空串视为未指定）
    /// - operator: 操作人
    pub fn request_time_off(
        &self,
        staff_number: &str,
        start_date: &str,
        end_date: &str,
        reason: &str,
        substitute_number: Option<&str>,
        operator: &str,
    ) -> ApiResult<TimeOffConfirmation> {
        let staff_number = require_non_empty("教职工编号", staff_number)?;
        let reason = require_non_empty("请假原因", reason)?;
        let operator = require_non_empty("操作人", operator)?;
        let range = parse_range(start_date, end_date)?;
        let substitute_number = substitute_number
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let confirmation =
            self.matcher
                .submit_time_off(staff_number, range, reason, substitute_number)?;

        record_action(
            &self.action_log_repo,
            ActionType::SubmitTimeOff,
            operator,
            serde_json::json!({
                "request_id": confirmation.request_id,
                "staff_number": confirmation.staff.number,
                "start_date": confirmation.start_date.to_string(),
                "end_date": confirmation.end_date.to_string(),
                "substitute_number": confirmation.substitute.as_ref().map(|s| s.number.clone()),
            }),
            format!(
                "提交请假单: #{} {}",
                confirmation.request_id, confirmation.staff.name
            ),
        );

        Ok(confirmation)
    }

    /// 推荐代课教师
    pub fn suggest_substitutes(
        &self,
        staff_number: &str,
        start_date: &str,
        end_date: &str,
    ) -> ApiResult<Vec<SubstituteCandidate>> {
        let staff_number = require_non_empty("教职工编号", staff_number)?;
        let range = parse_range(start_date, end_date)?;
        Ok(self.matcher.suggest_substitutes(staff_number, range)?)
    }
}

fn parse_range(start_date: &str, end_date: &str) -> ApiResult<DateRange> {
    let start = parse_date("开始日期", start_date)?;
    let end = parse_date("结束日期", end_date)?;
    DateRange::new(start, end).map_err(|e| ApiError::InvalidInput(e.to_string()))
}
