// ==========================================
// CSV 参考数据 + 业务流程端到端测试
// ==========================================


#[cfg(test)]
mod seed_flow_test {
    use school_scheduler::domain::RosterRole;
    use school_scheduler::importer::CsvSeedLoader;
    use std::fs;
    use tempfile::TempDir;

    use crate::test_helpers::create_test_state;

    fn write_fixture(dir: &TempDir) {
        let files = [
            ("room.csv", "room_number,capacity,phone\nR100,2,555-0100\nR200,25,\n"),
            ("class_type.csv", "id,description\nKHR,Kindergarten homeroom\n1HR,Grade 1 homeroom\n"),
            (
                "student.csv",
                "number,first_name,last_name,grade\nS1,Ann,Lee,K\nS2,Ben,Kim,K\nS3,Cal,Ng,K\nS4,Dee,Ox,1\n",
            ),
            ("staff.csv", "number,first_name,last_name,work_email\nT1,Dana,Ross,dana@school.org\n"),
            ("substitute.csv", "number,first_name,last_name,work_email\nSUB1,Amy,Brown,\n"),
            ("availability.csv", "substitute_number,start_date,end_date\nSUB1,2025-01-01,2025-06-30\n"),
        ];
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
    }

    #[test]
    fn test_seed_then_schedule() {
        let (_tmp, state) = create_test_state();
        let dir = TempDir::new().unwrap();
        write_fixture(&dir);

        let report = CsvSeedLoader::new(state.repos.clone()).load_dir(dir.path()).unwrap();
        assert_eq!(report.students.inserted, 4);
        assert_eq!(
            report.missing_files,
            vec!["class", "staff_class", "student_class", "time_off_request"]
        );

        let rooms = state.class_api.list_rooms().unwrap();
        assert_eq!(rooms.len(), 2);

        // 超出教室容量只告警，不拒绝
        let class = state
            .class_api
            .create_class("KHR", "R100", "08:00:00", "02:00:00", "admin")
            .unwrap();
        let roster = state.class_api.fill_class(&class.number, "T1", "admin").unwrap();
        assert_eq!(roster.grade, "K");
        assert_eq!(roster.room_capacity, 2);
        assert_eq!(roster.numbers(RosterRole::Student), vec!["S1", "S2", "S3"]);

        let confirmation = state
            .time_off_api
            .request_time_off("T1", "2025-03-03", "2025-03-07", "training", Some("SUB1"), "admin")
            .unwrap();
        assert_eq!(confirmation.substitute.unwrap().name, "Amy Brown");
    }

    fn write_schedule_fixture(dir: &TempDir) {
        write_fixture(dir);
        let files = [
            ("staff.csv", "number,first_name,last_name,work_email\nT1,Dana,Ross,\nT2,Eli,Park,\n"),
            (
                "class.csv",
                "number,class_type_id,room_number,start_time,duration\n\
                 C1,KHR,R200,08:00:00,02:00:00\n\
                 C2,1HR,R200,09:00:00,01:00:00\n\
                 C5,1HR,R200,10:00:00,01:00:00\n",
            ),
            ("staff_class.csv", "staff_number,class_number\nT1,C1\nT2,C5\n"),
            ("student_class.csv", "student_number,class_number\nS1,C1\nS4,C5\nS1,C5\n"),
            (
                "time_off_request.csv",
                "staff_number,start_date,end_date,reason,substitute_number\n\
                 T1,2025-02-03,2025-02-05,conference,SUB1\n\
                 T2,2025-02-05,2025-02-06,illness,SUB1\n\
                 T2,2025-02-05,2025-02-06,illness,\n",
            ),
        ];
        for (name, body) in files {
            fs::write(dir.path().join(name), body).unwrap();
        }
    }

    #[test]
    fn test_seed_existing_schedule_and_commitments() {
        let (_tmp, state) = create_test_state();
        let dir = TempDir::new().unwrap();
        write_schedule_fixture(&dir);

        let loader = CsvSeedLoader::new(state.repos.clone());
        let report = loader.load_dir(dir.path()).unwrap();
        assert!(report.missing_files.is_empty());

        // C2 与 C1 在 R200 重叠
        assert_eq!(report.classes.inserted, 2);
        assert_eq!(report.classes.rejected, 1);
        assert_eq!(report.staff_assignments.inserted, 2);
        // S1 已在 KHR 班主任班，第二个班主任班被拒绝
        assert_eq!(report.enrollments.inserted, 2);
        assert_eq!(report.enrollments.rejected, 1);
        // SUB1 在 02-05 已被 T1 的请假单占用
        assert_eq!(report.time_off_requests.inserted, 2);
        assert_eq!(report.time_off_requests.rejected, 1);
        let tables: Vec<&str> = report.rejections.iter().map(|r| r.table).collect();
        assert_eq!(tables, vec!["class", "student_class", "time_off_request"]);

        // 导入的课表参与后续冲突检测
        let err = state
            .class_api
            .create_class("1HR", "R200", "10:30:00", "00:30:00", "admin")
            .unwrap_err();
        assert!(err.is_conflict());
        let created = state
            .class_api
            .create_class("1HR", "R200", "11:00:00", "00:30:00", "admin")
            .unwrap();
        assert_ne!(created.number, "C5");

        // 导入的承诺参与代课匹配
        let err = state
            .time_off_api
            .request_time_off("T2", "2025-02-04", "2025-02-04", "errand", Some("SUB1"), "admin")
            .unwrap_err();
        assert!(err.is_conflict());
        let assigned = state
            .time_off_api
            .suggest_substitutes("T1", "2025-02-04", "2025-02-04")
            .unwrap();
        assert_eq!(assigned.len(), 1);
        assert!(assigned[0].already_assigned);

        // 重复执行: 已导入的行全部跳过
        let again = loader.load_dir(dir.path()).unwrap();
        assert_eq!(again.classes.inserted, 0);
        assert_eq!(again.enrollments.inserted, 0);
        assert_eq!(again.time_off_requests.inserted, 0);
        assert_eq!(again.time_off_requests.skipped, 2);
    }
}
