// ==========================================
// 校务排课系统 - 班级名单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: student_class / staff_class 关联表读写 + 集合成员查询
// 幂等: 重复关联不报错，返回 false
// ==========================================

use crate::domain::roster::RosterEntry;
use crate::domain::types::RosterRole;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

// ==========================================
// EnrollmentRepository - 名单仓储
// ==========================================
pub struct EnrollmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EnrollmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 分配教职工管理班级
    ///
    /// # 返回
    /// - Ok(true): 新增关联
    /// - Ok(false): 已存在，未变更
    pub fn assign_staff(&self, staff_id: i64, class_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT INTO staff_class (staff_id, class_id)
            SELECT ?1, ?2
            WHERE NOT EXISTS (
                SELECT 1 FROM staff_class WHERE staff_id = ?1 AND class_id = ?2
            )
            "#,
            params![staff_id, class_id],
        )?;
        Ok(rows > 0)
    }

    /// 学生入班
    ///
    /// # 返回
    /// - Ok(true): 新增关联
    /// - Ok(false): 已存在，未变更
    /// - Err(ExclusionViolation{Homeroom}): 学生已有其他班主任班（触发器拒绝）
    pub fn enroll_student(&self, student_id: i64, class_id: i64) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            INSERT INTO student_class (student_id, class_id)
            SELECT ?1, ?2
            WHERE NOT EXISTS (
                SELECT 1 FROM student_class WHERE student_id = ?1 AND class_id = ?2
            )
            "#,
            params![student_id, class_id],
        )?;
        Ok(rows > 0)
    }

    /// 班级内已入班学生 id 集合
    pub fn enrolled_student_ids(&self, class_id: i64) -> RepositoryResult<HashSet<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT student_id FROM student_class WHERE class_id = ?1")?;
        let ids = stmt
            .query_map(params![class_id], |row| row.get::<_, i64>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// 在“其他”班级类型编码含 `marker` 的班级中有入班记录的学生 id 集合
    ///
    /// # 参数
    /// - `excluded_class_id`: 不计入的班级（通常为目标班级本身）
    /// - `marker`: 班级类型标记（班主任班为 "HR"）
    pub fn students_with_marked_class_except(
        &self,
        excluded_class_id: i64,
        marker: &str,
    ) -> RepositoryResult<HashSet<i64>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT DISTINCT sc.student_id
            FROM student_class sc
            JOIN class c ON sc.class_id = c.id
            WHERE c.id <> ?1
              AND instr(c.class_type_id, ?2) > 0
            "#,
        )?;
        let ids = stmt
            .query_map(params![excluded_class_id, marker], |row| row.get::<_, i64>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(ids)
    }

    /// 班级名单（学生 + 教职工），按 (角色, 插入顺序) 排序
    pub fn roster(&self, class_id: i64) -> RepositoryResult<Vec<RosterEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT 0 AS role, s.number, s.first_name, s.last_name, sc.seq
            FROM student s
            JOIN student_class sc ON s.id = sc.student_id
            WHERE sc.class_id = ?1
            UNION ALL
            SELECT 1 AS role, st.number, st.first_name, st.last_name, stc.seq
            FROM staff st
            JOIN staff_class stc ON st.id = stc.staff_id
            WHERE stc.class_id = ?1
            ORDER BY role, seq
            "#,
        )?;
        let entries = stmt
            .query_map(params![class_id], |row| {
                let role = match row.get::<_, i64>(0)? {
                    0 => RosterRole::Student,
                    _ => RosterRole::Staff,
                };
                Ok(RosterEntry {
                    role,
                    number: row.get(1)?,
                    first_name: row.get(2)?,
                    last_name: row.get(3)?,
                    seq: row.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
