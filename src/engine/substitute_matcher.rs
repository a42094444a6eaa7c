// ==========================================
// 校务排课系统 - 请假与代课匹配
// ==========================================
// 状态机: Draft -> Rejected(StaffNotFound | SubstituteNotFound | SubstituteUnavailable)
//         Draft -> Created
// 红线: 代课教师不得被两张日期重叠的请假单同时占用
// 并发: 预检之后由存储层触发器在 IMMEDIATE 事务内再次强制
// ==========================================

use crate::config::SchedulingConfigReader;
use crate::domain::time_off::{NewTimeOffRequest, SubstituteCandidate, TimeOffConfirmation};
use crate::engine::availability::{to_candidate, AvailabilityIndex};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::interval::DateRange;
use crate::engine::repositories::SchedulingRepositories;
use crate::repository::error::{ExclusionKind, RepositoryError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// TimeOffMatcher - 请假与代课匹配引擎
// ==========================================
pub struct TimeOffMatcher<C>
where
    C: SchedulingConfigReader,
{
    repos: SchedulingRepositories,
    availability: AvailabilityIndex,
    config: Arc<C>,
}

impl<C> TimeOffMatcher<C>
where
    C: SchedulingConfigReader,
{
    pub fn new(repos: SchedulingRepositories, config: Arc<C>) -> Self {
        let availability =
            AvailabilityIndex::new(repos.substitute_repo.clone(), repos.time_off_repo.clone());
        Self {
            repos,
            availability,
            config,
        }
    }

    /// 可用性索引（只读）
    pub fn availability(&self) -> &AvailabilityIndex {
        &self.availability
    }

    /// 提交请假单
    ///
    /// # 参数
    /// - staff_number: 请假教职工编号
    /// - range: 请假日期（闭区间）
    /// - reason: 请假原因
    /// - substitute_number: 指定的代课教师（可选）
    ///
    /// # 错误
    /// - NotFound: 教职工 / 代课教师不存在
    /// - SubstituteUnavailable: 无单条可用区间覆盖，或已承诺重叠请假单
    /// - InvalidInput: 超过已配置的最长请假天数
    #[instrument(skip(self, range, reason), fields(
        staff_number = %staff_number,
        start = %range.start(),
        end = %range.end(),
        substitute_number = ?substitute_number
    ))]
    pub fn submit_time_off(
        &self,
        staff_number: &str,
        range: DateRange,
        reason: &str,
        substitute_number: Option<&str>,
    ) -> EngineResult<TimeOffConfirmation> {
        if let Some(max_days) = self.config.get_max_time_off_days()? {
            if range.days() > max_days {
                return Err(EngineError::InvalidInput(format!(
                    "请假天数 {} 超过上限 {}",
                    range.days(),
                    max_days
                )));
            }
        }

        let staff = self
            .repos
            .staff_repo
            .find_by_number(staff_number)?
            .ok_or_else(|| EngineError::not_found("教职工", staff_number))?;

        let substitute = match substitute_number {
            Some(number) => {
                let substitute = self
                    .repos
                    .substitute_repo
                    .find_by_number(number)?
                    .ok_or_else(|| EngineError::not_found("代课教师", number))?;

                if !self.availability.is_available(substitute.id, &range)? {
                    warn!("代课教师无覆盖该区间的可用记录");
                    return Err(substitute_unavailable(number, &range));
                }
                if self.availability.is_committed(substitute.id, &range)? {
                    warn!("代课教师已承诺重叠请假单");
                    return Err(substitute_unavailable(number, &range));
                }
                Some(substitute)
            }
            None => None,
        };

        let new_request = NewTimeOffRequest {
            staff_id: staff.id,
            start_date: range.start(),
            end_date: range.end(),
            reason: reason.to_string(),
            substitute_id: substitute.as_ref().map(|s| s.id),
        };

        let created = match self.repos.time_off_repo.create(&new_request) {
            Ok(created) => created,
            Err(e) if e.is_exclusion(ExclusionKind::SubstituteCommitment) => {
                warn!("写入时代课教师已被并发承诺");
                let number = substitute.as_ref().map(|s| s.number.as_str()).unwrap_or_default();
                return Err(substitute_unavailable(number, &range));
            }
            Err(e) => return Err(e.into()),
        };

        let confirmation = self
            .repos
            .time_off_repo
            .find_confirmation(created.id)?
            .ok_or_else(|| RepositoryError::NotFound {
                entity: "time_off_request".to_string(),
                id: created.id.to_string(),
            })?;

        info!(request_id = created.id, "请假单已创建");
        Ok(confirmation)
    }

    /// 推荐代课教师
    ///
    /// 1. 该教职工已有重叠请假单且已指定代课、该代课仍可覆盖区间 -> 唯一候选（already_assigned）
    /// 2. 否则列出可覆盖且未承诺重叠请假单的代课教师，按 (姓, 名) 排序
    #[instrument(skip(self, range), fields(staff_number = %staff_number, start = %range.start(), end = %range.end()))]
    pub fn suggest_substitutes(
        &self,
        staff_number: &str,
        range: DateRange,
    ) -> EngineResult<Vec<SubstituteCandidate>> {
        let staff = self
            .repos
            .staff_repo
            .find_by_number(staff_number)?
            .ok_or_else(|| EngineError::not_found("教职工", staff_number))?;

        let assigned = self
            .repos
            .time_off_repo
            .list_by_staff(staff.id)?
            .into_iter()
            .filter(|r| {
                DateRange::new(r.start_date, r.end_date)
                    .map(|existing| existing.overlaps(&range))
                    .unwrap_or(false)
            })
            .find_map(|r| r.substitute_id);

        if let Some(substitute_id) = assigned {
            if let Some(window) = self.availability.covering_interval(substitute_id, &range)? {
                if let Some(substitute) = self.repos.substitute_repo.find_by_id(substitute_id)? {
                    debug!(substitute_number = %substitute.number, "沿用已指定的代课教师");
                    return Ok(vec![to_candidate(substitute, &window, true)]);
                }
            }
            debug!(substitute_id, "已指定的代课教师不再覆盖该区间，重新筛选");
        }

        let committed = self.availability.committed_substitutes(&range)?;
        self.availability.list_candidates(&range, &committed)
    }
}

fn substitute_unavailable(substitute_number: &str, range: &DateRange) -> EngineError {
    EngineError::SubstituteUnavailable {
        substitute_number: substitute_number.to_string(),
        start_date: range.start(),
        end_date: range.end(),
    }
}
