// ==========================================
// 校务排课系统 - 人员数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: student / staff 表读写（自然键 number 查询 + id 查询）
// ==========================================

use crate::domain::person::{Staff, Student};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// StudentRepository - 学生仓储
// ==========================================
pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增学生
    pub fn insert(
        &self,
        number: &str,
        first_name: &str,
        last_name: &str,
        grade: &str,
    ) -> RepositoryResult<Student> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO student (number, first_name, last_name, grade) VALUES (?1, ?2, ?3, ?4)",
            params![number, first_name, last_name, grade],
        )?;
        Ok(Student {
            id: conn.last_insert_rowid(),
            number: number.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            grade: grade.to_string(),
        })
    }

    /// 按学号查询
    pub fn find_by_number(&self, number: &str) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                "SELECT id, number, first_name, last_name, grade FROM student WHERE number = ?1",
                params![number],
                map_student,
            )
            .optional()?;
        Ok(student)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let student = conn
            .query_row(
                "SELECT id, number, first_name, last_name, grade FROM student WHERE id = ?1",
                params![id],
                map_student,
            )
            .optional()?;
        Ok(student)
    }

    /// 按年级查询（按 id 升序）
    pub fn list_by_grade(&self, grade: &str) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, number, first_name, last_name, grade FROM student WHERE grade = ?1 ORDER BY id",
        )?;
        let students = stmt
            .query_map(params![grade], map_student)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }

    /// 查询班级内的学生（按入班顺序）
    pub fn list_by_class(&self, class_id: i64) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT s.id, s.number, s.first_name, s.last_name, s.grade
               FROM student s
               JOIN student_class sc ON sc.student_id = s.id
               WHERE sc.class_id = ?1
               ORDER BY sc.seq"#,
        )?;
        let students = stmt
            .query_map(params![class_id], map_student)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(students)
    }
}

fn map_student(row: &Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: row.get(0)?,
        number: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        grade: row.get(4)?,
    })
}

// ==========================================
// StaffRepository - 教职工仓储
// ==========================================
pub struct StaffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StaffRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增教职工
    pub fn insert(
        &self,
        number: &str,
        first_name: &str,
        last_name: &str,
        work_email: Option<&str>,
    ) -> RepositoryResult<Staff> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO staff (number, first_name, last_name, work_email) VALUES (?1, ?2, ?3, ?4)",
            params![number, first_name, last_name, work_email],
        )?;
        Ok(Staff {
            id: conn.last_insert_rowid(),
            number: number.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            work_email: work_email.map(str::to_string),
        })
    }

    /// 按工号查询
    pub fn find_by_number(&self, number: &str) -> RepositoryResult<Option<Staff>> {
        let conn = self.get_conn()?;
        let staff = conn
            .query_row(
                "SELECT id, number, first_name, last_name, work_email FROM staff WHERE number = ?1",
                params![number],
                map_staff,
            )
            .optional()?;
        Ok(staff)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Staff>> {
        let conn = self.get_conn()?;
        let staff = conn
            .query_row(
                "SELECT id, number, first_name, last_name, work_email FROM staff WHERE id = ?1",
                params![id],
                map_staff,
            )
            .optional()?;
        Ok(staff)
    }
}

fn map_staff(row: &Row<'_>) -> rusqlite::Result<Staff> {
    Ok(Staff {
        id: row.get(0)?,
        number: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        work_email: row.get(4)?,
    })
}
