// ==========================================
// 并发控制测试
// ==========================================
// 职责: 验证“先查后写”竞态由存储层收口
// 两个独立连接（模拟两个进程）同时争用同一资源，恰好一方成功
// ==========================================


#[cfg(test)]
mod concurrent_control_test {
    use school_scheduler::api::ApiError;
    use school_scheduler::app::AppState;
    use std::sync::{Arc, Barrier};
    use std::thread;

    use crate::test_helpers::{add_class_types, add_room, create_test_db, date, open_second_state};

    fn two_states() -> (tempfile::NamedTempFile, AppState, AppState) {
        let (temp_file, db_path) = create_test_db().unwrap();
        let first = AppState::new(db_path.clone()).unwrap();
        let second = open_second_state(&db_path);
        (temp_file, first, second)
    }

    #[test]
    fn test_concurrent_create_class_same_slot() {
        let (_tmp, first, second) = two_states();
        add_room(&first, "R100", 20);
        add_class_types(&first, &["1HR", "2HR"]);

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [(first.class_api.clone(), "1HR"), (second.class_api.clone(), "2HR")]
            .into_iter()
            .map(|(api, class_type)| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    api.create_class(class_type, "R100", "09:00:00", "01:00:00", "admin")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1, "exactly one create must win: {:?}", results);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ApiError::RoomUnavailable(_))));

        assert_eq!(first.class_api.list_classes().unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_commitment_of_one_substitute() {
        let (_tmp, first, second) = two_states();
        first.repos.staff_repo.insert("T1", "Dana", "Ross", None).unwrap();
        first.repos.staff_repo.insert("T2", "Eli", "Park", None).unwrap();
        let sub = first.repos.substitute_repo.insert("SUB1", "Amy", "Brown", None).unwrap();
        first
            .repos
            .substitute_repo
            .insert_availability(sub.id, date("2025-01-01"), date("2025-06-30"))
            .unwrap();

        let barrier = Arc::new(Barrier::new(2));
        let handles: Vec<_> = [(first.time_off_api.clone(), "T1"), (second.time_off_api.clone(), "T2")]
            .into_iter()
            .map(|(api, staff)| {
                let barrier = barrier.clone();
                thread::spawn(move || {
                    barrier.wait();
                    api.request_time_off(staff, "2025-02-01", "2025-02-03", "leave", Some("SUB1"), "admin")
                })
            })
            .collect();

        let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let ok = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(ok, 1, "exactly one commitment must win: {:?}", results);
        assert!(results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, ApiError::SubstituteUnavailable(_))));

        assert_eq!(first.repos.time_off_repo.list_with_substitute().unwrap().len(), 1);
    }

    #[test]
    fn test_shared_connection_threads_serialise() {
        let (_tmp, state, _second) = two_states();
        add_room(&state, "R100", 20);
        add_class_types(&state, &["1HR"]);
        let api = state.class_api.clone();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let api = api.clone();
                thread::spawn(move || {
                    let start = format!("{:02}:00:00", 8 + (i % 4));
                    api.create_class("1HR", "R100", &start, "01:00:00", "admin").is_ok()
                })
            })
            .collect();
        let wins = handles.into_iter().map(|h| h.join().unwrap()).filter(|ok| *ok).count();

        // 4 个互不重叠的时段，每个时段恰好 2 个线程争用
        assert_eq!(wins, 4);
        assert_eq!(api.list_classes().unwrap().len(), 4);
    }
}
