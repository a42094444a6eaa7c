// ==========================================
// 班级分配集成测试
// ==========================================
// 职责: 教室冲突、年级过滤、班主任排他、幂等
// ==========================================


#[cfg(test)]
mod class_assignment_test {
    use school_scheduler::api::ApiError;
    use school_scheduler::domain::{ActionType, RosterRole};

    use crate::test_helpers::{add_class_types, add_room, create_test_state};

    fn seed_grade_three(state: &school_scheduler::app::AppState) {
        add_room(state, "R100", 20);
        add_room(state, "R200", 20);
        add_class_types(state, &["1HR", "3HR-A", "3HR-B", "3MATH"]);
        let students = &state.repos.student_repo;
        students.insert("S1", "Ann", "Lee", "3").unwrap();
        students.insert("S2", "Ben", "Kim", "3").unwrap();
        students.insert("S3", "Cal", "Ng", "2").unwrap();
        state.repos.staff_repo.insert("T1", "Dana", "Ross", None).unwrap();
        state.repos.staff_repo.insert("T2", "Eli", "Park", None).unwrap();
    }

    #[test]
    fn test_room_r100_scenario() {
        let (_tmp, state) = create_test_state();
        add_room(&state, "R100", 20);
        add_class_types(&state, &["1HR"]);
        let api = &state.class_api;

        let c1 = api
            .create_class("1HR", "R100", "09:00:00", "01:00:00", "admin")
            .unwrap();
        assert_eq!(c1.number, "C1");

        let err = api
            .create_class("1HR", "R100", "09:30:00", "01:00:00", "admin")
            .unwrap_err();
        assert!(matches!(err, ApiError::RoomUnavailable(_)));

        let c2 = api
            .create_class("1HR", "R100", "10:00:00", "00:30:00", "admin")
            .unwrap();
        assert_eq!(c2.number, "C2");

        assert_eq!(api.list_classes().unwrap().len(), 2);
        let logs = state
            .repos
            .action_log_repo
            .list_by_type(ActionType::CreateClass.as_str())
            .unwrap();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].actor, "admin");
    }

    #[test]
    fn test_competing_homeroom_sections_first_fill_wins() {
        let (_tmp, state) = create_test_state();
        seed_grade_three(&state);
        let api = &state.class_api;

        let a = api.create_class("3HR-A", "R100", "09:00:00", "01:00:00", "admin").unwrap();
        let b = api.create_class("3HR-B", "R200", "09:00:00", "01:00:00", "admin").unwrap();

        let roster_a = api.fill_class(&a.number, "T1", "admin").unwrap();
        assert_eq!(roster_a.grade, "3");
        assert_eq!(roster_a.numbers(RosterRole::Student), vec!["S1", "S2"]);
        assert_eq!(roster_a.numbers(RosterRole::Staff), vec!["T1"]);

        let roster_b = api.fill_class(&b.number, "T2", "admin").unwrap();
        assert!(roster_b.numbers(RosterRole::Student).is_empty());
        assert_eq!(roster_b.numbers(RosterRole::Staff), vec!["T2"]);

        let s1_classes = api.list_classes_for_student("S1").unwrap();
        assert_eq!(s1_classes.len(), 1);
        assert_eq!(s1_classes[0].number, a.number);
    }

    #[test]
    fn test_non_homeroom_target_uses_homeroom_exclusion() {
        let (_tmp, state) = create_test_state();
        seed_grade_three(&state);
        let api = &state.class_api;

        let hr = api.create_class("3HR-A", "R100", "09:00:00", "01:00:00", "admin").unwrap();
        let math = api.create_class("3MATH", "R100", "10:00:00", "01:00:00", "admin").unwrap();

        api.fill_class(&hr.number, "T1", "admin").unwrap();
        let roster = api.fill_class(&math.number, "T2", "admin").unwrap();
        assert!(roster.numbers(RosterRole::Student).is_empty());
    }

    #[test]
    fn test_fill_class_is_idempotent() {
        let (_tmp, state) = create_test_state();
        seed_grade_three(&state);
        let api = &state.class_api;
        let a = api.create_class("3HR-A", "R100", "09:00:00", "01:00:00", "admin").unwrap();

        let first = api.fill_class(&a.number, "T1", "admin").unwrap();
        let second = api.fill_class(&a.number, "T1", "admin").unwrap();
        assert_eq!(first.newly_enrolled, 2);
        assert_eq!(second.newly_enrolled, 0);
        assert_eq!(first.entries, second.entries);

        let students = api.list_students_in_class(&a.number).unwrap();
        let numbers: Vec<&str> = students.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["S1", "S2"]);
    }

    #[test]
    fn test_no_student_holds_two_homerooms() {
        let (_tmp, state) = create_test_state();
        seed_grade_three(&state);
        let api = &state.class_api;
        let a = api.create_class("3HR-A", "R100", "09:00:00", "01:00:00", "admin").unwrap();
        let b = api.create_class("3HR-B", "R200", "09:00:00", "01:00:00", "admin").unwrap();
        api.fill_class(&a.number, "T1", "admin").unwrap();
        api.fill_class(&b.number, "T2", "admin").unwrap();

        for number in ["S1", "S2", "S3"] {
            let homerooms = api
                .list_classes_for_student(number)
                .unwrap()
                .into_iter()
                .filter(|c| c.is_homeroom())
                .count();
            assert!(homerooms <= 1, "{} has {} homerooms", number, homerooms);
        }
    }

    #[test]
    fn test_invalid_inputs_are_rejected_without_writes() {
        let (_tmp, state) = create_test_state();
        add_room(&state, "R100", 20);
        add_class_types(&state, &["1HR"]);
        let api = &state.class_api;

        for (start, duration) in [("9am", "01:00:00"), ("09:00:00", "1h"), ("23:30:00", "01:00:00"), ("09:00:00", "00:00:00")] {
            let err = api.create_class("1HR", "R100", start, duration, "admin").unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)), "{} {}", start, duration);
        }
        assert!(matches!(
            api.create_class("1HR", "R100", "09:00:00", "01:00:00", " ").unwrap_err(),
            ApiError::InvalidInput(_)
        ));
        assert!(matches!(
            api.fill_class("C1", "T1", "admin").unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(api.list_classes().unwrap().is_empty());
    }

    #[test]
    fn test_oversized_duration_is_invalid_input() {
        let (_tmp, state) = create_test_state();
        add_room(&state, "R100", 20);
        add_class_types(&state, &["1HR"]);

        for duration in ["99999999999999:00:00", "9223372036854775807:00:00", "30:00:00"] {
            let err = state
                .class_api
                .create_class("1HR", "R100", "09:00:00", duration, "admin")
                .unwrap_err();
            assert!(matches!(err, ApiError::InvalidInput(_)), "{}", duration);
        }
        assert!(state.class_api.list_classes().unwrap().is_empty());
    }

    #[test]
    fn test_long_class_in_empty_room_with_default_config() {
        let (_tmp, state) = create_test_state();
        add_room(&state, "R100", 20);
        add_class_types(&state, &["1HR"]);

        let session = state
            .class_api
            .create_class("1HR", "R100", "08:00:00", "05:00:00", "admin")
            .unwrap();
        assert_eq!(session.duration_sec, 5 * 3600);

        // 到 24:00 结束的整日时段同样允许
        add_room(&state, "R200", 20);
        state
            .class_api
            .create_class("1HR", "R200", "00:00:00", "24:00:00", "admin")
            .unwrap();
    }

    #[test]
    fn test_audit_failure_keeps_committed_class() {
        let (_tmp, state) = create_test_state();
        add_room(&state, "R100", 20);
        add_class_types(&state, &["1HR"]);
        state.conn.lock().unwrap().execute_batch("DROP TABLE action_log").unwrap();

        let session = state
            .class_api
            .create_class("1HR", "R100", "09:00:00", "01:00:00", "admin")
            .unwrap();
        assert_eq!(session.number, "C1");
        assert_eq!(state.class_api.list_classes().unwrap().len(), 1);

        state.repos.staff_repo.insert("T1", "Dana", "Ross", None).unwrap();
        let roster = state.class_api.fill_class("C1", "T1", "admin").unwrap();
        assert_eq!(roster.numbers(RosterRole::Staff), vec!["T1"]);
    }
}
