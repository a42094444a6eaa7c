// ==========================================
// 校务排课系统 - 教室冲突检测
// ==========================================
// 职责: 判定教室在某时段是否已被占用（半开区间）
// 说明: 此处为预检，存储层触发器在写入时再次强制
// ==========================================

use crate::domain::class::ClassSession;
use crate::engine::error::EngineResult;
use crate::engine::interval::{time_overlaps, TimeSlot};
use crate::repository::ClassRepository;
use std::sync::Arc;

pub struct ConflictChecker {
    class_repo: Arc<ClassRepository>,
}

impl ConflictChecker {
    pub fn new(class_repo: Arc<ClassRepository>) -> Self {
        Self { class_repo }
    }

    /// 教室内是否已有与 `slot` 重叠的班级
    pub fn has_conflict(&self, room_number: &str, slot: &TimeSlot) -> EngineResult<bool> {
        Ok(!self.conflicting_sessions(room_number, slot)?.is_empty())
    }

    /// 教室内与 `slot` 重叠的全部班级（按开始时刻）
    pub fn conflicting_sessions(
        &self,
        room_number: &str,
        slot: &TimeSlot,
    ) -> EngineResult<Vec<ClassSession>> {
        let sessions = self
            .class_repo
            .find_by_room(room_number)?
            .into_iter()
            .filter(|s| session_slot_overlaps(s, slot))
            .collect();
        Ok(sessions)
    }
}

fn session_slot_overlaps(session: &ClassSession, slot: &TimeSlot) -> bool {
    time_overlaps(session.start_time, session.duration(), slot.start(), slot.duration())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{seed_room_and_types, setup_test_conn};
    use chrono::{Duration, NaiveTime};

    fn slot(h: u32, m: u32, minutes: i64) -> TimeSlot {
        TimeSlot::new(NaiveTime::from_hms_opt(h, m, 0).unwrap(), Duration::minutes(minutes)).unwrap()
    }

    #[test]
    fn test_conflict_in_same_room_only() {
        let conn = setup_test_conn();
        seed_room_and_types(&conn);
        conn.lock()
            .unwrap()
            .execute("INSERT INTO room (room_number, capacity) VALUES ('R200', 10)", [])
            .unwrap();
        let repo = Arc::new(ClassRepository::new(conn));
        repo.create_session("1HR", "R100", 9 * 3600, 3600, "C").unwrap();
        let checker = ConflictChecker::new(repo);

        assert!(checker.has_conflict("R100", &slot(9, 30, 60)).unwrap());
        assert!(!checker.has_conflict("R100", &slot(10, 0, 30)).unwrap());
        assert!(!checker.has_conflict("R100", &slot(8, 0, 60)).unwrap());
        assert!(!checker.has_conflict("R200", &slot(9, 30, 60)).unwrap());

        let hits = checker.conflicting_sessions("R100", &slot(8, 30, 120)).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].number, "C1");
    }
}
