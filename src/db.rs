// ==========================================
// 校务排课系统 - SQLite 连接初始化与建库
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键 + busy_timeout）
// - 建库脚本集中在此处，启动时执行一次（幂等）
// - 冲突类不变量在存储层以触发器兜底，避免“先查后写”竞态
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 触发器中止消息: 教室时段被占用
pub const ROOM_UNAVAILABLE_MARKER: &str = "ROOM_UNAVAILABLE";

/// 触发器中止消息: 代课教师已被重叠请假单占用
pub const SUBSTITUTE_COMMITTED_MARKER: &str = "SUBSTITUTE_COMMITTED";

/// 触发器中止消息: 学生已有其他班主任班
pub const HOMEROOM_CONFLICT_MARKER: &str = "HOMEROOM_CONFLICT";

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 建库（幂等）
///
/// 时间存储为“距午夜秒数”，日期存储为 `YYYY-MM-DD` 文本（字典序即日期序）。
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA_SQL)?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> = conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS config_kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS room (
    room_number TEXT PRIMARY KEY,
    capacity INTEGER NOT NULL CHECK (capacity >= 0),
    phone TEXT
);

CREATE TABLE IF NOT EXISTS class_type (
    id TEXT PRIMARY KEY,
    description TEXT
);

CREATE TABLE IF NOT EXISTS class (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL UNIQUE,
    class_type_id TEXT NOT NULL REFERENCES class_type(id),
    room_number TEXT NOT NULL REFERENCES room(room_number),
    start_sec INTEGER NOT NULL CHECK (start_sec >= 0),
    duration_sec INTEGER NOT NULL CHECK (duration_sec > 0),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (start_sec + duration_sec <= 86400)
);

CREATE INDEX IF NOT EXISTS idx_class_room ON class(room_number, start_sec);

-- 同一教室不得出现时段重叠 [start, start+duration)
CREATE TRIGGER IF NOT EXISTS trg_class_room_exclusive
BEFORE INSERT ON class
WHEN EXISTS (
    SELECT 1 FROM class c
    WHERE c.room_number = NEW.room_number
      AND NEW.start_sec < c.start_sec + c.duration_sec
      AND c.start_sec < NEW.start_sec + NEW.duration_sec
)
BEGIN
    SELECT RAISE(ABORT, 'ROOM_UNAVAILABLE');
END;

CREATE TABLE IF NOT EXISTS student (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    grade TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_student_grade ON student(grade);

CREATE TABLE IF NOT EXISTS staff (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    work_email TEXT
);

CREATE TABLE IF NOT EXISTS student_class (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id INTEGER NOT NULL REFERENCES student(id),
    class_id INTEGER NOT NULL REFERENCES class(id),
    UNIQUE (student_id, class_id)
);

-- 学生最多持有一个班主任班（class_type_id 含 HR）
CREATE TRIGGER IF NOT EXISTS trg_student_single_homeroom
BEFORE INSERT ON student_class
WHEN instr((SELECT class_type_id FROM class WHERE id = NEW.class_id), 'HR') > 0
 AND EXISTS (
    SELECT 1 FROM student_class sc
    JOIN class c ON sc.class_id = c.id
    WHERE sc.student_id = NEW.student_id
      AND c.id <> NEW.class_id
      AND instr(c.class_type_id, 'HR') > 0
)
BEGIN
    SELECT RAISE(ABORT, 'HOMEROOM_CONFLICT');
END;

CREATE TABLE IF NOT EXISTS staff_class (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    staff_id INTEGER NOT NULL REFERENCES staff(id),
    class_id INTEGER NOT NULL REFERENCES class(id),
    UNIQUE (staff_id, class_id)
);

CREATE TABLE IF NOT EXISTS substitute (
    id INTEGER PRIMARY KEY,
    number TEXT NOT NULL UNIQUE,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    work_email TEXT
);

CREATE TABLE IF NOT EXISTS availability (
    id INTEGER PRIMARY KEY,
    substitute_id INTEGER NOT NULL REFERENCES substitute(id),
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    CHECK (start_date <= end_date)
);

CREATE INDEX IF NOT EXISTS idx_availability_sub ON availability(substitute_id);

CREATE TABLE IF NOT EXISTS time_off_request (
    id INTEGER PRIMARY KEY,
    staff_id INTEGER NOT NULL REFERENCES staff(id),
    start_date TEXT NOT NULL,
    end_date TEXT NOT NULL,
    reason TEXT NOT NULL,
    substitute_id INTEGER REFERENCES substitute(id),
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    CHECK (start_date <= end_date)
);

CREATE INDEX IF NOT EXISTS idx_time_off_staff ON time_off_request(staff_id);
CREATE INDEX IF NOT EXISTS idx_time_off_sub ON time_off_request(substitute_id);

-- 代课教师不得被两张日期重叠的请假单同时占用（闭区间）
CREATE TRIGGER IF NOT EXISTS trg_time_off_substitute_exclusive
BEFORE INSERT ON time_off_request
WHEN NEW.substitute_id IS NOT NULL AND EXISTS (
    SELECT 1 FROM time_off_request t
    WHERE t.substitute_id = NEW.substitute_id
      AND t.start_date <= NEW.end_date
      AND NEW.start_date <= t.end_date
)
BEGIN
    SELECT RAISE(ABORT, 'SUBSTITUTE_COMMITTED');
END;

CREATE TABLE IF NOT EXISTS action_log (
    action_id TEXT PRIMARY KEY,
    action_type TEXT NOT NULL,
    action_ts TEXT NOT NULL,
    actor TEXT NOT NULL,
    payload_json TEXT,
    detail TEXT
);
"#;
