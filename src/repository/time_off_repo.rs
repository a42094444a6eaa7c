// ==========================================
// 校务排课系统 - 请假单数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 并发: 写入在 IMMEDIATE 事务内执行（数据库级写锁串行化代课承诺），
//       代课教师区间排他由 trg_time_off_substitute_exclusive 触发器兜底
// ==========================================

use crate::domain::person::full_name;
use crate::domain::time_off::{NewTimeOffRequest, PersonRef, TimeOffConfirmation, TimeOffRequest};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::substitute_repo::parse_date_column;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::sync::{Arc, Mutex};

const REQUEST_COLUMNS: &str = "id, staff_id, start_date, end_date, reason, substitute_id";

// ==========================================
// TimeOffRepository - 请假单仓储
// ==========================================
pub struct TimeOffRepository {
    conn: Arc<Mutex<Connection>>,
}

impl TimeOffRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新建请假单
    ///
    /// # 返回
    /// - Ok(TimeOffRequest): 新建的请假单
    /// - Err(ExclusionViolation{SubstituteCommitment}): 代课教师已承诺重叠区间
    pub fn create(&self, request: &NewTimeOffRequest) -> RepositoryResult<TimeOffRequest> {
        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(RepositoryError::transaction)?;

        tx.execute(
            r#"
            INSERT INTO time_off_request (staff_id, start_date, end_date, reason, substitute_id)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                request.staff_id,
                request.start_date.format("%Y-%m-%d").to_string(),
                request.end_date.format("%Y-%m-%d").to_string(),
                request.reason,
                request.substitute_id,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit().map_err(RepositoryError::transaction)?;

        Ok(TimeOffRequest {
            id,
            staff_id: request.staff_id,
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason.clone(),
            substitute_id: request.substitute_id,
        })
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<TimeOffRequest>> {
        let conn = self.get_conn()?;
        let request = conn
            .query_row(
                &format!("SELECT {} FROM time_off_request WHERE id = ?1", REQUEST_COLUMNS),
                params![id],
                map_request,
            )
            .optional()?;
        Ok(request)
    }

    /// 查询教职工的全部请假单（按 id）
    pub fn list_by_staff(&self, staff_id: i64) -> RepositoryResult<Vec<TimeOffRequest>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM time_off_request WHERE staff_id = ?1 ORDER BY id",
            REQUEST_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![staff_id], map_request)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询全部已指定代课教师的请假单（按 id）
    pub fn list_with_substitute(&self) -> RepositoryResult<Vec<TimeOffRequest>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM time_off_request WHERE substitute_id IS NOT NULL ORDER BY id",
            REQUEST_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], map_request)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询请假确认单（关联教职工与代课教师姓名）
    pub fn find_confirmation(&self, id: i64) -> RepositoryResult<Option<TimeOffConfirmation>> {
        let conn = self.get_conn()?;
        let confirmation = conn
            .query_row(
                r#"
                SELECT t.id, t.start_date, t.end_date, t.reason,
                       s.number, s.first_name, s.last_name,
                       sub.number, sub.first_name, sub.last_name
                FROM time_off_request t
                JOIN staff s ON t.staff_id = s.id
                LEFT JOIN substitute sub ON t.substitute_id = sub.id
                WHERE t.id = ?1
                "#,
                params![id],
                |row| {
                    let sub_number: Option<String> = row.get(7)?;
                    let substitute = match sub_number {
                        Some(number) => Some(PersonRef {
                            number,
                            name: full_name(
                                &row.get::<_, String>(8)?,
                                &row.get::<_, String>(9)?,
                            ),
                        }),
                        None => None,
                    };
                    Ok(TimeOffConfirmation {
                        request_id: row.get(0)?,
                        start_date: parse_date_column(row, 1)?,
                        end_date: parse_date_column(row, 2)?,
                        reason: row.get(3)?,
                        staff: PersonRef {
                            number: row.get(4)?,
                            name: full_name(&row.get::<_, String>(5)?, &row.get::<_, String>(6)?),
                        },
                        substitute,
                    })
                },
            )
            .optional()?;
        Ok(confirmation)
    }
}

fn map_request(row: &Row<'_>) -> rusqlite::Result<TimeOffRequest> {
    Ok(TimeOffRequest {
        id: row.get(0)?,
        staff_id: row.get(1)?,
        start_date: parse_date_column(row, 2)?,
        end_date: parse_date_column(row, 3)?,
        reason: row.get(4)?,
        substitute_id: row.get(5)?,
    })
}
