// ==========================================
// 校务排课系统 - 代课可用性索引
// ==========================================
// 职责: 判定代课教师在某日期区间是否可用、列出候选
// 覆盖规则: 必须由“单条”可用区间完整覆盖，不拼接多条部分区间
// 承诺规则: 出现在任一重叠请假单上的代课教师视为已承诺
// ==========================================

use crate::domain::person::Substitute;
use crate::domain::time_off::{Availability, SubstituteCandidate};
use crate::engine::error::EngineResult;
use crate::engine::interval::DateRange;
use crate::repository::{SubstituteRepository, TimeOffRepository};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

// ==========================================
// AvailabilityIndex - 可用性索引
// ==========================================
// 红线: 只读，不写库
pub struct AvailabilityIndex {
    substitute_repo: Arc<SubstituteRepository>,
    time_off_repo: Arc<TimeOffRepository>,
}

impl AvailabilityIndex {
    pub fn new(
        substitute_repo: Arc<SubstituteRepository>,
        time_off_repo: Arc<TimeOffRepository>,
    ) -> Self {
        Self {
            substitute_repo,
            time_off_repo,
        }
    }

    /// 是否存在单条可用区间完整覆盖 `range`
    pub fn is_available(&self, substitute_id: i64, range: &DateRange) -> EngineResult<bool> {
        Ok(self.covering_interval(substitute_id, range)?.is_some())
    }

    /// 覆盖 `range` 的可用区间中开始最早的一条
    pub fn covering_interval(
        &self,
        substitute_id: i64,
        range: &DateRange,
    ) -> EngineResult<Option<Availability>> {
        let rows = self.substitute_repo.list_availability(substitute_id)?;
        Ok(earliest_covering(rows.iter(), range).cloned())
    }

    /// 列出可覆盖 `range` 且不在排除集中的代课教师
    ///
    /// 排序: (last_name, first_name) 升序，同名按编号；每位代课教师仅一条。
    pub fn list_candidates(
        &self,
        range: &DateRange,
        excluded_ids: &HashSet<i64>,
    ) -> EngineResult<Vec<SubstituteCandidate>> {
        let substitutes = self.substitute_repo.list_all()?;

        let mut by_substitute: HashMap<i64, Vec<Availability>> = HashMap::new();
        for row in self.substitute_repo.list_all_availability()? {
            by_substitute.entry(row.substitute_id).or_default().push(row);
        }

        let mut candidates: Vec<SubstituteCandidate> = substitutes
            .into_iter()
            .filter(|s| !excluded_ids.contains(&s.id))
            .filter_map(|s| {
                let rows = by_substitute.get(&s.id)?;
                let window = earliest_covering(rows.iter(), range)?;
                Some(to_candidate(s, window, false))
            })
            .collect();

        candidates.sort_by(|a, b| {
            (&a.last_name, &a.first_name, &a.number).cmp(&(&b.last_name, &b.first_name, &b.number))
        });

        debug!(
            range_start = %range.start(),
            range_end = %range.end(),
            excluded = excluded_ids.len(),
            candidates = candidates.len(),
            "代课候选筛选完成"
        );
        Ok(candidates)
    }

    /// 在与 `range` 重叠的请假单上已承诺的代课教师 id 集合
    pub fn committed_substitutes(&self, range: &DateRange) -> EngineResult<HashSet<i64>> {
        let committed = self
            .time_off_repo
            .list_with_substitute()?
            .into_iter()
            .filter(|r| {
                DateRange::new(r.start_date, r.end_date)
                    .map(|existing| existing.overlaps(range))
                    .unwrap_or(false)
            })
            .filter_map(|r| r.substitute_id)
            .collect();
        Ok(committed)
    }

    /// 代课教师在 `range` 内是否已被承诺
    pub fn is_committed(&self, substitute_id: i64, range: &DateRange) -> EngineResult<bool> {
        Ok(self.committed_substitutes(range)?.contains(&substitute_id))
    }
}

fn earliest_covering<'a>(
    rows: impl Iterator<Item = &'a Availability>,
    range: &DateRange,
) -> Option<&'a Availability> {
    rows.filter(|a| {
        DateRange::new(a.start_date, a.end_date)
            .map(|window| window.covers(range))
            .unwrap_or(false)
    })
    .min_by_key(|a| (a.start_date, a.id))
}

pub(crate) fn to_candidate(
    substitute: Substitute,
    window: &Availability,
    already_assigned: bool,
) -> SubstituteCandidate {
    SubstituteCandidate {
        substitute_id: substitute.id,
        number: substitute.number,
        first_name: substitute.first_name,
        last_name: substitute.last_name,
        work_email: substitute.work_email,
        availability_start: window.start_date,
        availability_end: window.end_date,
        already_assigned,
    }
}
