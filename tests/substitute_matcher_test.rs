// ==========================================
// 请假与代课匹配集成测试
// ==========================================
// 职责: 覆盖判定、承诺排他、候选排序与确定性
// ==========================================


#[cfg(test)]
mod substitute_matcher_test {
    use school_scheduler::api::ApiError;
    use school_scheduler::app::AppState;
    use school_scheduler::domain::ActionType;

    use crate::test_helpers::{create_test_state, date};

    fn seed(state: &AppState) {
        let staff = &state.repos.staff_repo;
        staff.insert("T1", "Dana", "Ross", Some("dana@school.org")).unwrap();
        staff.insert("T2", "Eli", "Park", None).unwrap();

        let subs = &state.repos.substitute_repo;
        let sub1 = subs.insert("SUB1", "Amy", "Brown", Some("amy@subs.org")).unwrap();
        let sub2 = subs.insert("SUB2", "Bob", "Adams", None).unwrap();
        let sub3 = subs.insert("SUB3", "Cat", "Adams", None).unwrap();
        for s in [&sub1, &sub2, &sub3] {
            subs.insert_availability(s.id, date("2025-01-01"), date("2025-06-30")).unwrap();
        }
    }

    #[test]
    fn test_sub1_coverage_scenario() {
        let (_tmp, state) = create_test_state();
        seed(&state);

        let confirmation = state
            .time_off_api
            .request_time_off("T1", "2025-02-01", "2025-02-03", "conference", Some("SUB1"), "admin")
            .unwrap();

        assert_eq!(confirmation.start_date, date("2025-02-01"));
        assert_eq!(confirmation.end_date, date("2025-02-03"));
        assert_eq!(confirmation.staff.number, "T1");
        assert_eq!(confirmation.staff.name, "Dana Ross");
        let substitute = confirmation.substitute.unwrap();
        assert_eq!(substitute.number, "SUB1");
        assert_eq!(substitute.name, "Amy Brown");

        let logs = state
            .repos
            .action_log_repo
            .list_by_type(ActionType::SubmitTimeOff.as_str())
            .unwrap();
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn test_sub1_commitment_scenario() {
        let (_tmp, state) = create_test_state();
        seed(&state);
        let api = &state.time_off_api;

        api.request_time_off("T1", "2025-02-01", "2025-02-03", "conference", Some("SUB1"), "admin")
            .unwrap();

        // 同一天首尾相接也算重叠
        let err = api
            .request_time_off("T2", "2025-02-03", "2025-02-04", "medical", Some("SUB1"), "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::SubstituteUnavailable(_)));

        let candidates = api.suggest_substitutes("T2", "2025-02-03", "2025-02-04").unwrap();
        assert!(candidates.iter().all(|c| c.number != "SUB1"));
        assert_eq!(candidates.len(), 2);

        // 不重叠的区间仍可使用 SUB1
        api.request_time_off("T2", "2025-02-04", "2025-02-05", "medical", Some("SUB1"), "admin")
            .unwrap();
    }

    #[test]
    fn test_candidates_are_ordered_and_deterministic() {
        let (_tmp, state) = create_test_state();
        seed(&state);
        let api = &state.time_off_api;

        let first = api.suggest_substitutes("T1", "2025-03-01", "2025-03-05").unwrap();
        let second = api.suggest_substitutes("T1", "2025-03-01", "2025-03-05").unwrap();
        assert_eq!(first, second);

        let numbers: Vec<&str> = first.iter().map(|c| c.number.as_str()).collect();
        assert_eq!(numbers, vec!["SUB2", "SUB3", "SUB1"]);
        assert!(first.iter().all(|c| !c.already_assigned));
        assert_eq!(first[2].work_email.as_deref(), Some("amy@subs.org"));
        assert_eq!(first[2].availability_start, date("2025-01-01"));
        assert_eq!(first[2].availability_end, date("2025-06-30"));
    }

    #[test]
    fn test_existing_assignment_is_returned_alone() {
        let (_tmp, state) = create_test_state();
        seed(&state);
        let api = &state.time_off_api;

        api.request_time_off("T1", "2025-02-01", "2025-02-10", "leave", Some("SUB3"), "admin")
            .unwrap();

        let candidates = api.suggest_substitutes("T1", "2025-02-05", "2025-02-06").unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].number, "SUB3");
        assert!(candidates[0].already_assigned);

        // 其他教职工看到的候选中不含 SUB3
        let others = api.suggest_substitutes("T2", "2025-02-05", "2025-02-06").unwrap();
        assert!(others.iter().all(|c| c.number != "SUB3"));
    }

    #[test]
    fn test_partial_availability_is_not_enough() {
        let (_tmp, state) = create_test_state();
        state.repos.staff_repo.insert("T1", "Dana", "Ross", None).unwrap();
        let subs = &state.repos.substitute_repo;
        let sub = subs.insert("SUB9", "Gus", "Hale", None).unwrap();
        subs.insert_availability(sub.id, date("2025-02-01"), date("2025-02-02")).unwrap();
        subs.insert_availability(sub.id, date("2025-02-03"), date("2025-02-05")).unwrap();

        let api = &state.time_off_api;
        let err = api
            .request_time_off("T1", "2025-02-01", "2025-02-04", "leave", Some("SUB9"), "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::SubstituteUnavailable(_)));
        assert!(api.suggest_substitutes("T1", "2025-02-01", "2025-02-04").unwrap().is_empty());
    }

    #[test]
    fn test_request_validation() {
        let (_tmp, state) = create_test_state();
        seed(&state);
        let api = &state.time_off_api;

        assert!(matches!(
            api.request_time_off("T9", "2025-02-01", "2025-02-03", "leave", None, "admin").unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            api.request_time_off("T1", "2025-02-01", "2025-02-03", "leave", Some("SUB9"), "admin").unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            api.request_time_off("T1", "2025-02-03", "2025-02-01", "leave", None, "admin").unwrap_err(),
            ApiError::InvalidInput(_)
        ));
        assert!(matches!(
            api.request_time_off("T1", "02/01/2025", "2025-02-03", "leave", None, "admin").unwrap_err(),
            ApiError::InvalidInput(_)
        ));

        // 空白代课编号视为未指定
        let confirmation = api
            .request_time_off("T1", "2025-02-01", "2025-02-03", "leave", Some("  "), "admin")
            .unwrap();
        assert!(confirmation.substitute.is_none());
    }

    #[test]
    fn test_audit_failure_keeps_committed_request() {
        let (_tmp, state) = create_test_state();
        seed(&state);
        state.conn.lock().unwrap().execute_batch("DROP TABLE action_log").unwrap();

        let confirmation = state
            .time_off_api
            .request_time_off("T1", "2025-02-01", "2025-02-03", "leave", Some("SUB1"), "admin")
            .unwrap();
        assert_eq!(confirmation.substitute.unwrap().number, "SUB1");

        // 已提交的承诺仍然生效
        let err = state
            .time_off_api
            .request_time_off("T2", "2025-02-02", "2025-02-02", "leave", Some("SUB1"), "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::SubstituteUnavailable(_)));
    }

    #[test]
    fn test_long_leave_accepted_with_default_config() {
        let (_tmp, state) = create_test_state();
        seed(&state);
        let confirmation = state
            .time_off_api
            .request_time_off("T1", "2025-01-01", "2026-12-31", "sabbatical", None, "admin")
            .unwrap();
        assert_eq!(confirmation.end_date, date("2026-12-31"));
    }
}
