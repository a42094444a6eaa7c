// ==========================================
// 校务排课系统 - 引擎层仓储聚合
// ==========================================
// 职责: 聚合排课引擎所需的所有 Repository
// 目标: 减少引擎构造函数参数数量
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::repository::{
    ActionLogRepository, ClassRepository, EnrollmentRepository, RoomRepository,
    StaffRepository, StudentRepository, SubstituteRepository, TimeOffRepository,
};

/// 排课引擎仓储集合
///
/// 所有仓储共享同一个连接句柄。
///
/// # 包含的仓储
/// - `room_repo`: 教室
/// - `class_repo`: 班级类型 / 班级
/// - `student_repo` / `staff_repo`: 学生 / 教职工
/// - `enrollment_repo`: 名单关联
/// - `substitute_repo`: 代课教师与可用区间
/// - `time_off_repo`: 请假单
/// - `action_log_repo`: 操作日志
#[derive(Clone)]
pub struct SchedulingRepositories {
    pub room_repo: Arc<RoomRepository>,
    pub class_repo: Arc<ClassRepository>,
    pub student_repo: Arc<StudentRepository>,
    pub staff_repo: Arc<StaffRepository>,
    pub enrollment_repo: Arc<EnrollmentRepository>,
    pub substitute_repo: Arc<SubstituteRepository>,
    pub time_off_repo: Arc<TimeOffRepository>,
    pub action_log_repo: Arc<ActionLogRepository>,
}

impl SchedulingRepositories {
    /// 基于共享连接创建全部仓储
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self {
            room_repo: Arc::new(RoomRepository::new(conn.clone())),
            class_repo: Arc::new(ClassRepository::new(conn.clone())),
            student_repo: Arc::new(StudentRepository::new(conn.clone())),
            staff_repo: Arc::new(StaffRepository::new(conn.clone())),
            enrollment_repo: Arc::new(EnrollmentRepository::new(conn.clone())),
            substitute_repo: Arc::new(SubstituteRepository::new(conn.clone())),
            time_off_repo: Arc::new(TimeOffRepository::new(conn.clone())),
            action_log_repo: Arc::new(ActionLogRepository::new(conn)),
        }
    }
}

// 注: SchedulingRepositories 作为简单的聚合结构体，其正确性由
// 各引擎的测试与集成测试来验证。
