// ==========================================
// 校务排课系统 - 班级分配引擎
// ==========================================
// 职责: 新建班级（教室冲突检测）+ 填充班级（教职工 + 同年级学生）
// 红线: 同一教室时段不得重叠；学生最多持有一个班主任班
// 并发: 预检之后由存储层触发器再次强制，竞态落败映射为同一业务错误
// ==========================================

use crate::config::SchedulingConfigReader;
use crate::domain::class::ClassSession;
use crate::domain::roster::RosterResult;
use crate::domain::types::HOMEROOM_MARKER;
use crate::engine::conflict::ConflictChecker;
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::interval::TimeSlot;
use crate::engine::repositories::SchedulingRepositories;
use crate::repository::error::ExclusionKind;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ClassAssignmentEngine - 班级分配引擎
// ==========================================
pub struct ClassAssignmentEngine<C>
where
    C: SchedulingConfigReader,
{
    repos: SchedulingRepositories,
    conflict_checker: ConflictChecker,
    config: Arc<C>,
}

impl<C> ClassAssignmentEngine<C>
where
    C: SchedulingConfigReader,
{
    /// 创建新的 ClassAssignmentEngine 实例
    ///
    /// # 参数
    /// - repos: 仓储集合
    /// - config: 配置读取器
    pub fn new(repos: SchedulingRepositories, config: Arc<C>) -> Self {
        let conflict_checker = ConflictChecker::new(repos.class_repo.clone());
        Self {
            repos,
            conflict_checker,
            config,
        }
    }

    /// 新建班级
    ///
    /// # 流程
    /// 1. 校验班级类型与教室存在
    /// 2. 校验时长上限（仅在已配置时）
    /// 3. 教室冲突预检
    /// 4. 原子写入（id = max+1，编号 = 前缀 + id）
    ///
    /// # 错误
    /// - NotFound: 班级类型 / 教室不存在
    /// - InvalidInput: 超过已配置的时长上限
    /// - RoomUnavailable: 教室时段被占用
    #[instrument(skip(self, slot), fields(
        class_type_id = %class_type_id,
        room_number = %room_number,
        start = %slot.start(),
        duration_sec = slot.duration_sec()
    ))]
    pub fn create_class(
        &self,
        class_type_id: &str,
        room_number: &str,
        slot: TimeSlot,
    ) -> EngineResult<ClassSession> {
        // === 步骤 1: 参考数据 ===
        let class_type = self
            .repos
            .class_repo
            .find_class_type(class_type_id)?
            .ok_or_else(|| EngineError::not_found("班级类型", class_type_id))?;
        self.repos
            .room_repo
            .find_by_number(room_number)?
            .ok_or_else(|| EngineError::not_found("教室", room_number))?;

        // === 步骤 2: 时长上限 ===
        if let Some(max_minutes) = self.config.get_max_class_duration_minutes()? {
            if slot.duration_sec() > max_minutes.saturating_mul(60) {
                return Err(EngineError::InvalidInput(format!(
                    "班级时长 {} 分钟超过上限 {} 分钟",
                    slot.duration_sec() / 60,
                    max_minutes
                )));
            }
        }

        // === 步骤 3: 冲突预检 ===
        let conflicts = self.conflict_checker.conflicting_sessions(room_number, &slot)?;
        if !conflicts.is_empty() {
            let numbers: Vec<&str> = conflicts.iter().map(|s| s.number.as_str()).collect();
            warn!(conflicting = ?numbers, "教室时段冲突，拒绝新建班级");
            return Err(room_unavailable(room_number, &slot));
        }

        // === 步骤 4: 写入 ===
        let prefix = self.config.get_class_number_prefix()?;
        let session = match self.repos.class_repo.create_session(
            class_type.id.as_str(),
            room_number,
            slot.start_sec(),
            slot.duration_sec(),
            &prefix,
        ) {
            Ok(session) => session,
            Err(e) if e.is_exclusion(ExclusionKind::RoomSchedule) => {
                warn!("写入时教室时段已被并发占用");
                return Err(room_unavailable(room_number, &slot));
            }
            Err(e) => return Err(e.into()),
        };

        info!(class_id = session.id, class_number = %session.number, "班级已创建");
        Ok(session)
    }

    /// 填充班级
    ///
    /// # 流程
    /// 1. 校验班级与教职工存在，从班级类型派生年级
    /// 2. 分配教职工（幂等）
    /// 3. 同年级且未在其他班主任班的学生入班（幂等）
    /// 4. 返回名单（学生在前，教职工在后，各按插入顺序）
    ///
    /// 竞态中被存储层班主任约束拒绝的学生跳过，不视为错误。
    #[instrument(skip(self), fields(class_number = %class_number, staff_number = %staff_number))]
    pub fn fill_class(&self, class_number: &str, staff_number: &str) -> EngineResult<RosterResult> {
        // === 步骤 1: 参考数据 ===
        let class = self
            .repos
            .class_repo
            .find_by_number(class_number)?
            .ok_or_else(|| EngineError::not_found("班级", class_number))?;
        let staff = self
            .repos
            .staff_repo
            .find_by_number(staff_number)?
            .ok_or_else(|| EngineError::not_found("教职工", staff_number))?;
        let grade = class.class_type_id.grade().ok_or_else(|| {
            EngineError::InvalidInput(format!("班级类型编码为空，无法派生年级: {}", class.number))
        })?;
        let room = self
            .repos
            .room_repo
            .find_by_number(&class.room_number)?
            .ok_or_else(|| EngineError::not_found("教室", class.room_number.clone()))?;

        // === 步骤 2: 教职工 ===
        if self.repos.enrollment_repo.assign_staff(staff.id, class.id)? {
            debug!(staff_id = staff.id, "教职工已分配");
        }

        // === 步骤 3: 学生 ===
        let holders = self
            .repos
            .enrollment_repo
            .students_with_marked_class_except(class.id, HOMEROOM_MARKER)?;
        let enrolled = self.repos.enrollment_repo.enrolled_student_ids(class.id)?;

        let mut newly_enrolled = 0usize;
        for student in self.repos.student_repo.list_by_grade(&grade)? {
            if holders.contains(&student.id) || enrolled.contains(&student.id) {
                continue;
            }
            match self.repos.enrollment_repo.enroll_student(student.id, class.id) {
                Ok(true) => newly_enrolled += 1,
                Ok(false) => {}
                Err(e) if e.is_exclusion(ExclusionKind::Homeroom) => {
                    debug!(student_number = %student.number, "学生已被其他班主任班占用，跳过");
                }
                Err(e) => return Err(e.into()),
            }
        }

        // === 步骤 4: 名单 ===
        let entries = self.repos.enrollment_repo.roster(class.id)?;
        let result = RosterResult {
            class,
            grade,
            room_capacity: room.capacity,
            newly_enrolled,
            entries,
        };

        let student_count = result.student_count();
        if student_count > room.capacity as usize {
            warn!(
                student_count,
                capacity = room.capacity,
                "班级人数超过教室容量"
            );
        }
        info!(newly_enrolled, roster_size = result.entries.len(), "班级已填充");
        Ok(result)
    }
}

fn room_unavailable(room_number: &str, slot: &TimeSlot) -> EngineError {
    EngineError::RoomUnavailable {
        room_number: room_number.to_string(),
        start: slot.start(),
        duration_sec: slot.duration_sec(),
    }
}
