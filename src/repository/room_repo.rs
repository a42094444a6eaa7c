// ==========================================
// 校务排课系统 - 教室数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::room::Room;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

// ==========================================
// RoomRepository - 教室仓储
// ==========================================
pub struct RoomRepository {
    conn: Arc<Mutex<Connection>>,
}

impl RoomRepository {
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

    /// 新增教室
    pub fn insert(&self, room: &Room) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO room (room_number, capacity, phone) VALUES (?1, ?2, ?3)",
            params![room.room_number, room.capacity, room.phone],
        )?;
        Ok(())
    }

    /// 按教室编号查询
    pub fn find_by_number(&self, room_number: &str) -> RepositoryResult<Option<Room>> {
        let conn = self.get_conn()?;
        let room = conn
            .query_row(
                "SELECT room_number, capacity, phone FROM room WHERE room_number = ?1",
                params![room_number],
                map_room,
            )
            .optional()?;
        Ok(room)
    }

    /// 列出全部教室（按编号）
    pub fn list_all(&self) -> RepositoryResult<Vec<Room>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT room_number, capacity, phone FROM room ORDER BY room_number")?;
        let rooms = stmt
            .query_map([], map_room)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rooms)
    }
}

fn map_room(row: &Row<'_>) -> rusqlite::Result<Room> {
    Ok(Room {
        room_number: row.get(0)?,
        capacity: row.get(1)?,
        phone: row.get(2)?,
    })
}
