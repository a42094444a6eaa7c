// ==========================================
// 校务排课系统 - 代课教师数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑（覆盖判定在 AvailabilityIndex）
// 职责: substitute / availability 表读写
// ==========================================

use crate::domain::person::Substitute;
use crate::domain::time_off::Availability;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// SubstituteRepository - 代课教师仓储
// ==========================================
pub struct SubstituteRepository {
    conn: Arc<Mutex<Connection>>,
}

impl SubstituteRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增代课教师
    pub fn insert(
        &self,
        number: &str,
        first_name: &str,
        last_name: &str,
        work_email: Option<&str>,
    ) -> RepositoryResult<Substitute> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO substitute (number, first_name, last_name, work_email) VALUES (?1, ?2, ?3, ?4)",
            params![number, first_name, last_name, work_email],
        )?;
        Ok(Substitute {
            id: conn.last_insert_rowid(),
            number: number.to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            work_email: work_email.map(str::to_string),
        })
    }

    /// 按编号查询
    pub fn find_by_number(&self, number: &str) -> RepositoryResult<Option<Substitute>> {
        let conn = self.get_conn()?;
        let sub = conn
            .query_row(
                "SELECT id, number, first_name, last_name, work_email FROM substitute WHERE number = ?1",
                params![number],
                map_substitute,
            )
            .optional()?;
        Ok(sub)
    }

    /// 按 id 查询
    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Substitute>> {
        let conn = self.get_conn()?;
        let sub = conn
            .query_row(
                "SELECT id, number, first_name, last_name, work_email FROM substitute WHERE id = ?1",
                params![id],
                map_substitute,
            )
            .optional()?;
        Ok(sub)
    }

    /// 列出全部代课教师（按 last_name, first_name, number）
    pub fn list_all(&self) -> RepositoryResult<Vec<Substitute>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, number, first_name, last_name, work_email
               FROM substitute
               ORDER BY last_name, first_name, number"#,
        )?;
        let subs = stmt
            .query_map([], map_substitute)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(subs)
    }

    // ==========================================
    // 可用区间
    // ==========================================

    /// 新增可用区间
    pub fn insert_availability(
        &self,
        substitute_id: i64,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> RepositoryResult<Availability> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO availability (substitute_id, start_date, end_date) VALUES (?1, ?2, ?3)",
            params![
                substitute_id,
                start_date.format("%Y-%m-%d").to_string(),
                end_date.format("%Y-%m-%d").to_string(),
            ],
        )?;
        Ok(Availability {
            id: conn.last_insert_rowid(),
            substitute_id,
            start_date,
            end_date,
        })
    }

    /// 查询代课教师的全部可用区间（按开始日期）
    pub fn list_availability(&self, substitute_id: i64) -> RepositoryResult<Vec<Availability>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, substitute_id, start_date, end_date
               FROM availability
               WHERE substitute_id = ?1
               ORDER BY start_date, id"#,
        )?;
        let rows = stmt
            .query_map(params![substitute_id], map_availability)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// 查询全部可用区间（按代课教师、开始日期）
    pub fn list_all_availability(&self) -> RepositoryResult<Vec<Availability>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"SELECT id, substitute_id, start_date, end_date
               FROM availability
               ORDER BY substitute_id, start_date, id"#,
        )?;
        let rows = stmt
            .query_map([], map_availability)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn map_substitute(row: &Row<'_>) -> rusqlite::Result<Substitute> {
    Ok(Substitute {
        id: row.get(0)?,
        number: row.get(1)?,
        first_name: row.get(2)?,
        last_name: row.get(3)?,
        work_email: row.get(4)?,
    })
}

fn map_availability(row: &Row<'_>) -> rusqlite::Result<Availability> {
    Ok(Availability {
        id: row.get(0)?,
        substitute_id: row.get(1)?,
        start_date: parse_date_column(row, 2)?,
        end_date: parse_date_column(row, 3)?,
    })
}

/// 解析 `YYYY-MM-DD` 文本列
pub(crate) fn parse_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let raw: String = row.get(idx)?;
    NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
