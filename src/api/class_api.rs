// ==========================================
// 校务排课系统 - 班级 API
// ==========================================
// 职责: 入参解析 + 调用 ClassAssignmentEngine + 操作日志
// ==========================================

use std::sync::Arc;

use crate::api::audit::record_action;
use crate::api::error::{ApiError, ApiResult};
use crate::api::input::{parse_duration, parse_time_of_day, require_non_empty};
use crate::config::ConfigManager;
use crate::domain::action_log::ActionType;
use crate::domain::class::ClassSession;
use crate::domain::person::Student;
use crate::domain::room::Room;
use crate::domain::roster::RosterResult;
use crate::engine::{ClassAssignmentEngine, SchedulingRepositories, TimeSlot};

// ==========================================
// ClassApi - 班级 API
// ==========================================

/// 班级API
///
/// 职责：
/// 1. 新建班级（时刻/时长字符串解析）
/// 2. 填充班级
/// 3. 教室 / 班级 / 名单查询
/// 4. ActionLog记录
pub struct ClassApi {
    engine: Arc<ClassAssignmentEngine<ConfigManager>>,
    repos: SchedulingRepositories,
}

impl ClassApi {
    pub fn new(
        engine: Arc<ClassAssignmentEngine<ConfigManager>>,
        repos: SchedulingRepositories,
    ) -> Self {
        Self { engine, repos }
    }

    /// 新建班级
    ///
    /// # 参数
    /// - class_type_id: 班级类型编码
    /// - room_number: 教室编号
    /// - start_time: 开始时刻 "HH:MM:SS"
    /// - duration: 时长 "HH:MM:SS"
    /// - operator: 操作人
    pub fn create_class(
        &self,
        class_type_id: &str,
        room_number: &str,
        start_time: &str,
        duration: &str,
        operator: &str,
    ) -> ApiResult<ClassSession> {
        let class_type_id = require_non_empty("班级类型", class_type_id)?;
        let room_number = require_non_empty("教室编号", room_number)?;
        let operator = require_non_empty("操作人", operator)?;
        let start = parse_time_of_day("开始时间", start_time)?;
        let duration = parse_duration("时长", duration)?;
        let slot = TimeSlot::new(start, duration).map_err(|e| ApiError::InvalidInput(e.to_string()))?;

        let session = self.engine.create_class(class_type_id, room_number, slot)?;

        self.record(
            ActionType::CreateClass,
            operator,
            serde_json::json!({
                "class_number": session.number,
                "class_type_id": session.class_type_id.as_str(),
                "room_number": session.room_number,
                "start_time": session.start_time.to_string(),
                "duration_sec": session.duration_sec,
            }),
            format!("新建班级: {} @ {}", session.number, session.room_number),
        );

        Ok(session)
    }

    /// 填充班级（分配教职工 + 同年级学生入班）
    pub fn fill_class(
        &self,
        class_number: &str,
        staff_number: &str,
        operator: &str,
    ) -> ApiResult<RosterResult> {
        let class_number = require_non_empty("班级编号", class_number)?;
        let staff_number = require_non_empty("教职工编号", staff_number)?;
        let operator = require_non_empty("操作人", operator)?;

        let roster = self.engine.fill_class(class_number, staff_number)?;

        self.record(
            ActionType::FillClass,
            operator,
            serde_json::json!({
                "class_number": roster.class.number,
                "staff_number": staff_number,
                "grade": roster.grade,
                "newly_enrolled": roster.newly_enrolled,
            }),
            format!(
                "填充班级: {}，新入班 {} 人",
                roster.class.number, roster.newly_enrolled
            ),
        );

        Ok(roster)
    }

    /// 查询全部教室
    pub fn list_rooms(&self) -> ApiResult<Vec<Room>> {
        Ok(self.repos.room_repo.list_all()?)
    }

    /// 查询全部班级
    pub fn list_classes(&self) -> ApiResult<Vec<ClassSession>> {
        Ok(self.repos.class_repo.list_all()?)
    }

    /// 查询班级内学生（按入班顺序）
    pub fn list_students_in_class(&self, class_number: &str) -> ApiResult<Vec<Student>> {
        let class_number = require_non_empty("班级编号", class_number)?;
        let class = self
            .repos
            .class_repo
            .find_by_number(class_number)?
            .ok_or_else(|| ApiError::NotFound(format!("班级不存在: {}", class_number)))?;
        Ok(self.repos.student_repo.list_by_class(class.id)?)
    }

    /// 查询学生所在班级
    pub fn list_classes_for_student(&self, student_number: &str) -> ApiResult<Vec<ClassSession>> {
        let student_number = require_non_empty("学号", student_number)?;
        let student = self
            .repos
            .student_repo
            .find_by_number(student_number)?
            .ok_or_else(|| ApiError::NotFound(format!("学生不存在: {}", student_number)))?;
        Ok(self.repos.class_repo.list_for_student(student.id)?)
    }

    fn record(&self, action_type: ActionType, operator: &str, payload: serde_json::Value, detail: String) {
        record_action(&self.repos.action_log_repo, action_type, operator, payload, detail);
    }
}
