// ==========================================
// 校务排课系统 - 班级数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: class_type / class 表读写
// 并发: 新建班级在 IMMEDIATE 事务内分配 id 并写入，
//       教室时段排他由 trg_class_room_exclusive 触发器兜底
// ==========================================

use crate::domain::class::{ClassSession, ClassType};
use crate::domain::types::ClassTypeCode;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveTime;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};

const SESSION_COLUMNS: &str = "c.id, c.number, c.class_type_id, c.room_number, c.start_sec, c.duration_sec";

// ==========================================
// ClassRepository - 班级仓储
// ==========================================
pub struct ClassRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ClassRepository {
    /// 从已有连接创建仓储实例
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 班级类型
    // ==========================================

    /// 新增班级类型
    pub fn insert_class_type(&self, class_type: &ClassType) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO class_type (id, description) VALUES (?1, ?2)",
            params![class_type.id.as_str(), class_type.description],
        )?;
        Ok(())
    }

    /// 按编码查询班级类型
    pub fn find_class_type(&self, id: &str) -> RepositoryResult<Option<ClassType>> {
        let conn = self.get_conn()?;
        let class_type = conn
            .query_row(
                "SELECT id, description FROM class_type WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ClassType {
                        id: ClassTypeCode::new(row.get::<_, String>(0)?),
                        description: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(class_type)
    }

    // ==========================================
    // 班级
    // ==========================================

    /// 新建班级
    ///
    /// 在同一 IMMEDIATE 事务内分配 id 并写入，班级编号为 `number_prefix + id`。
    /// id 从 MAX(id)+1 起，跳过编号已被占用（例如导入数据）的取值。
    ///
    /// # 返回
    /// - Ok(ClassSession): 新建的班级
    /// - Err(ExclusionViolation{RoomSchedule}): 教室时段已被占用（触发器拒绝）
    pub fn create_session(
        &self,
        class_type_id: &str,
        room_number: &str,
        start_sec: i64,
        duration_sec: i64,
        number_prefix: &str,
    ) -> RepositoryResult<ClassSession> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::transaction)?;

        let mut next_id: i64 = tx.query_row(
            "SELECT COALESCE(MAX(id), 0) + 1 FROM class",
            [],
            |row| row.get(0),
        )?;
        let mut number = format!("{}{}", number_prefix, next_id);
        while number_taken(&tx, &number)? {
            next_id += 1;
            number = format!("{}{}", number_prefix, next_id);
        }

        let session = insert_session_row(
            &tx,
            Some(next_id),
            &number,
            class_type_id,
            room_number,
            start_sec,
            duration_sec,
        )?;

        tx.commit().map_err(RepositoryError::transaction)?;
        Ok(session)
    }

    /// 按给定编号写入班级（导入已有课表）
    ///
    /// 与 `create_session` 相同，教室时段排他由触发器强制。
    pub fn insert_session(
        &self,
        number: &str,
        class_type_id: &str,
        room_number: &str,
        start_sec: i64,
        duration_sec: i64,
    ) -> RepositoryResult<ClassSession> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::transaction)?;
        let session = insert_session_row(
            &tx,
            None,
            number,
            class_type_id,
            room_number,
            start_sec,
            duration_sec,
        )?;
        tx.commit().map_err(RepositoryError::transaction)?;
        Ok(session)
    }

    /// 按班级编号查询
    pub fn find_by_number(&self, number: &str) -> RepositoryResult<Option<ClassSession>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                &format!("SELECT {} FROM class c WHERE c.number = ?1", SESSION_COLUMNS),
                params![number],
                map_session,
            )
            .optional()?;
        Ok(session)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<ClassSession>> {
        let conn = self.get_conn()?;
        let session = conn
            .query_row(
                &format!("SELECT {} FROM class c WHERE c.id = ?1", SESSION_COLUMNS),
                params![id],
                map_session,
            )
            .optional()?;
        Ok(session)
    }

    /// 查询教室内全部班级（按开始时间）
    pub fn find_by_room(&self, room_number: &str) -> RepositoryResult<Vec<ClassSession>> {
        self.query_sessions(
            &format!(
                "SELECT {} FROM class c WHERE c.room_number = ?1 ORDER BY c.start_sec, c.id",
                SESSION_COLUMNS
            ),
            params![room_number],
        )
    }

    /// 列出全部班级（按教室、开始时间）
    pub fn list_all(&self) -> RepositoryResult<Vec<ClassSession>> {
        self.query_sessions(
            &format!(
                "SELECT {} FROM class c ORDER BY c.room_number, c.start_sec, c.id",
                SESSION_COLUMNS
            ),
            [],
        )
    }

    /// 查询学生所在的全部班级（按开始时间）
    pub fn list_for_student(&self, student_id: i64) -> RepositoryResult<Vec<ClassSession>> {
        self.query_sessions(
            &format!(
                r#"SELECT {} FROM class c
                   JOIN student_class sc ON sc.class_id = c.id
                   WHERE sc.student_id = ?1
                   ORDER BY c.start_sec, c.id"#,
                SESSION_COLUMNS
            ),
            params![student_id],
        )
    }

    fn query_sessions<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> RepositoryResult<Vec<ClassSession>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let sessions = stmt
            .query_map(params, map_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(sessions)
    }
}

fn number_taken(conn: &Connection, number: &str) -> rusqlite::Result<bool> {
    let hit = conn
        .query_row("SELECT 1 FROM class WHERE number = ?1", params![number], |_| Ok(()))
        .optional()?;
    Ok(hit.is_some())
}

fn insert_session_row(
    conn: &Connection,
    id: Option<i64>,
    number: &str,
    class_type_id: &str,
    room_number: &str,
    start_sec: i64,
    duration_sec: i64,
) -> RepositoryResult<ClassSession> {
    conn.execute(
        r#"
        INSERT INTO class (id, number, class_type_id, room_number, start_sec, duration_sec)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![id, number, class_type_id, room_number, start_sec, duration_sec],
    )?;
    let session = conn.query_row(
        &format!("SELECT {} FROM class c WHERE c.id = ?1", SESSION_COLUMNS),
        params![conn.last_insert_rowid()],
        map_session,
    )?;
    Ok(session)
}

fn map_session(row: &Row<'_>) -> rusqlite::Result<ClassSession> {
    let start_sec: i64 = row.get(4)?;
    let start_time = u32::try_from(start_sec)
        .ok()
        .and_then(|s| NaiveTime::from_num_seconds_from_midnight_opt(s, 0))
        .ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                4,
                rusqlite::types::Type::Integer,
                format!("start_sec 超出当日范围: {}", start_sec).into(),
            )
        })?;

    Ok(ClassSession {
        id: row.get(0)?,
        number: row.get(1)?,
        class_type_id: ClassTypeCode::new(row.get::<_, String>(2)?),
        room_number: row.get(3)?,
        start_time,
        duration_sec: row.get(5)?,
    })
}
