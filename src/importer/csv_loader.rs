// ==========================================
// 校务排课系统 - CSV 数据加载
// ==========================================
// 目录约定: 每张表一个 `{table}.csv`，首行为表头
// 加载顺序: room -> class_type -> student -> staff -> substitute -> availability
//           -> class -> staff_class -> student_class -> time_off_request
// 缺失的文件跳过并告警；已存在的自然键跳过（可重复执行）
// 课表与请假单经仓储写入，违反教室 / 班主任 / 代课承诺排他的行被拒绝并记入报告
// ==========================================

use crate::api::error::ApiResult;
use crate::api::input::{parse_duration, parse_time_of_day};
use crate::domain::class::ClassType;
use crate::domain::room::Room;
use crate::domain::time_off::NewTimeOffRequest;
use crate::domain::types::ClassTypeCode;
use crate::engine::{SchedulingRepositories, TimeSlot};
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::error::ExclusionKind;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{info, warn};

/// CSV 行（表头 -> 去空白后的值）
pub type RawRecord = HashMap<String, String>;

/// 单表加载统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableLoadStats {
    pub inserted: usize,
    pub skipped: usize,
    /// 被存储层排他约束拒绝的行数
    pub rejected: usize,
}

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedRejection {
    pub table: &'static str,
    pub row: usize,
    pub reason: String,
}

/// 整体加载报告
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub rooms: TableLoadStats,
    pub class_types: TableLoadStats,
    pub students: TableLoadStats,
    pub staff: TableLoadStats,
    pub substitutes: TableLoadStats,
    pub availability: TableLoadStats,
    pub classes: TableLoadStats,
    pub staff_assignments: TableLoadStats,
    pub enrollments: TableLoadStats,
    pub time_off_requests: TableLoadStats,
    pub missing_files: Vec<String>,
    pub rejections: Vec<SeedRejection>,
}

// ==========================================
// CsvSeedLoader - 参考数据加载器
// ==========================================
pub struct CsvSeedLoader {
    repos: SchedulingRepositories,
}

impl CsvSeedLoader {
    pub fn new(repos: SchedulingRepositories) -> Self {
        Self { repos }
    }

    /// 从目录加载全部数据
    pub fn load_dir(&self, dir: &Path) -> ImportResult<SeedReport> {
        if !dir.is_dir() {
            return Err(ImportError::DirectoryNotFound(dir.display().to_string()));
        }

        let mut report = SeedReport::default();

        if let Some(rows) = read_table(dir, "room", &mut report.missing_files)? {
            report.rooms = self.load_rooms(&rows)?;
        }
        if let Some(rows) = read_table(dir, "class_type", &mut report.missing_files)? {
            report.class_types = self.load_class_types(&rows)?;
        }
        if let Some(rows) = read_table(dir, "student", &mut report.missing_files)? {
            report.students = self.load_students(&rows)?;
        }
        if let Some(rows) = read_table(dir, "staff", &mut report.missing_files)? {
            report.staff = self.load_staff(&rows)?;
        }
        if let Some(rows) = read_table(dir, "substitute", &mut report.missing_files)? {
            report.substitutes = self.load_substitutes(&rows)?;
        }
        if let Some(rows) = read_table(dir, "availability", &mut report.missing_files)? {
            report.availability = self.load_availability(&rows)?;
        }
        if let Some(rows) = read_table(dir, "class", &mut report.missing_files)? {
            report.classes = self.load_classes(&rows, &mut report.rejections)?;
        }
        if let Some(rows) = read_table(dir, "staff_class", &mut report.missing_files)? {
            report.staff_assignments = self.load_staff_assignments(&rows)?;
        }
        if let Some(rows) = read_table(dir, "student_class", &mut report.missing_files)? {
            report.enrollments = self.load_enrollments(&rows, &mut report.rejections)?;
        }
        if let Some(rows) = read_table(dir, "time_off_request", &mut report.missing_files)? {
            report.time_off_requests = self.load_time_off_requests(&rows, &mut report.rejections)?;
        }

        info!(
            rooms = report.rooms.inserted,
            class_types = report.class_types.inserted,
            students = report.students.inserted,
            staff = report.staff.inserted,
            substitutes = report.substitutes.inserted,
            availability = report.availability.inserted,
            classes = report.classes.inserted,
            enrollments = report.enrollments.inserted,
            time_off_requests = report.time_off_requests.inserted,
            rejected = report.rejections.len(),
            "数据加载完成"
        );
        Ok(report)
    }

    /// room.csv: room_number, capacity, phone
    pub fn load_rooms(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "room";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let room_number = required(row, TABLE, line, "room_number")?;
            if self.repos.room_repo.find_by_number(room_number)?.is_some() {
                stats.skipped += 1;
                continue;
            }
            let capacity_raw = required(row, TABLE, line, "capacity")?;
            let capacity = capacity_raw
                .parse::<u32>()
                .map_err(|e| ImportError::TypeConversionError {
                    table: TABLE,
                    row: line,
                    field: "capacity",
                    message: e.to_string(),
                })?;
            self.repos.room_repo.insert(&Room {
                room_number: room_number.to_string(),
                capacity,
                phone: optional(row, "phone").map(str::to_string),
            })?;
            stats.inserted += 1;
        }
        Ok(stats)
    }

    /// class_type.csv: id, description
    pub fn load_class_types(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "class_type";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let id = required(row, TABLE, idx + 1, "id")?;
            if self.repos.class_repo.find_class_type(id)?.is_some() {
                stats.skipped += 1;
                continue;
            }
            self.repos.class_repo.insert_class_type(&ClassType {
                id: ClassTypeCode::new(id),
                description: optional(row, "description").map(str::to_string),
            })?;
            stats.inserted += 1;
        }
        Ok(stats)
    }

    /// student.csv: number, first_name, last_name, grade
    pub fn load_students(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "student";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let number = required(row, TABLE, line, "number")?;
            if self.repos.student_repo.find_by_number(number)?.is_some() {
                stats.skipped += 1;
                continue;
            }
            self.repos.student_repo.insert(
                number,
                required(row, TABLE, line, "first_name")?,
                required(row, TABLE, line, "last_name")?,
                required(row, TABLE, line, "grade")?,
            )?;
            stats.inserted += 1;
        }
        Ok(stats)
    }

    /// staff.csv: number, first_name, last_name, work_email
    pub fn load_staff(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "staff";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let number = required(row, TABLE, line, "number")?;
            if self.repos.staff_repo.find_by_number(number)?.is_some() {
                stats.skipped += 1;
                continue;
            }
            self.repos.staff_repo.insert(
                number,
                required(row, TABLE, line, "first_name")?,
                required(row, TABLE, line, "last_name")?,
                optional(row, "work_email"),
            )?;
            stats.inserted += 1;
        }
        Ok(stats)
    }

    /// substitute.csv: number, first_name, last_name, work_email
    pub fn load_substitutes(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "substitute";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let number = required(row, TABLE, line, "number")?;
            if self.repos.substitute_repo.find_by_number(number)?.is_some() {
                stats.skipped += 1;
                continue;
            }
            self.repos.substitute_repo.insert(
                number,
                required(row, TABLE, line, "first_name")?,
                required(row, TABLE, line, "last_name")?,
                optional(row, "work_email"),
            )?;
            stats.inserted += 1;
        }
        Ok(stats)
    }

    /// availability.csv: substitute_number, start_date, end_date
    ///
    /// 完全相同的区间已存在时跳过。
    pub fn load_availability(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "availability";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let number = required(row, TABLE, line, "substitute_number")?;
            let substitute = self
                .repos
                .substitute_repo
                .find_by_number(number)?
                .ok_or_else(|| ImportError::DanglingReference {
                    table: TABLE,
                    row: line,
                    message: format!("代课教师不存在: {}", number),
                })?;
            let start = date_field(row, TABLE, line, "start_date")?;
            let end = date_field(row, TABLE, line, "end_date")?;
            if start > end {
                return Err(ImportError::TypeConversionError {
                    table: TABLE,
                    row: line,
                    field: "end_date",
                    message: format!("结束日期早于开始日期: {} > {}", start, end),
                });
            }

            let exists = self
                .repos
                .substitute_repo
                .list_availability(substitute.id)?
                .iter()
                .any(|a| a.start_date == start && a.end_date == end);
            if exists {
                stats.skipped += 1;
                continue;
            }
            self.repos
                .substitute_repo
                .insert_availability(substitute.id, start, end)?;
            stats.inserted += 1;
        }
        Ok(stats)
    }

    /// class.csv: number, class_type_id, room_number, start_time, duration
    ///
    /// 时刻 / 时长格式为 HH:MM:SS；与已导入班级教室时段重叠的行被拒绝。
    pub fn load_classes(
        &self,
        rows: &[RawRecord],
        rejections: &mut Vec<SeedRejection>,
    ) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "class";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let number = required(row, TABLE, line, "number")?;
            if self.repos.class_repo.find_by_number(number)?.is_some() {
                stats.skipped += 1;
                continue;
            }

            let class_type_id = required(row, TABLE, line, "class_type_id")?;
            if self.repos.class_repo.find_class_type(class_type_id)?.is_none() {
                return Err(dangling(TABLE, line, format!("班级类型不存在: {}", class_type_id)));
            }
            let room_number = required(row, TABLE, line, "room_number")?;
            if self.repos.room_repo.find_by_number(room_number)?.is_none() {
                return Err(dangling(TABLE, line, format!("教室不存在: {}", room_number)));
            }

            let start = converted(
                parse_time_of_day("start_time", required(row, TABLE, line, "start_time")?),
                TABLE,
                line,
                "start_time",
            )?;
            let duration = converted(
                parse_duration("duration", required(row, TABLE, line, "duration")?),
                TABLE,
                line,
                "duration",
            )?;
            let slot = TimeSlot::new(start, duration).map_err(|e| ImportError::TypeConversionError {
                table: TABLE,
                row: line,
                field: "duration",
                message: e.to_string(),
            })?;

            match self.repos.class_repo.insert_session(
                number,
                class_type_id,
                room_number,
                slot.start_sec(),
                slot.duration_sec(),
            ) {
                Ok(_) => stats.inserted += 1,
                Err(e) if e.is_exclusion(ExclusionKind::RoomSchedule) => {
                    reject(
                        &mut stats,
                        rejections,
                        TABLE,
                        line,
                        format!("教室 {} 在 {} 起的时段已被占用", room_number, start),
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stats)
    }

    /// staff_class.csv: staff_number, class_number
    pub fn load_staff_assignments(&self, rows: &[RawRecord]) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "staff_class";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let staff_number = required(row, TABLE, line, "staff_number")?;
            let staff = self
                .repos
                .staff_repo
                .find_by_number(staff_number)?
                .ok_or_else(|| dangling(TABLE, line, format!("教职工不存在: {}", staff_number)))?;
            let class_id = self.class_id(row, TABLE, line)?;

            if self.repos.enrollment_repo.assign_staff(staff.id, class_id)? {
                stats.inserted += 1;
            } else {
                stats.skipped += 1;
            }
        }
        Ok(stats)
    }

    /// student_class.csv: student_number, class_number
    ///
    /// 学生已有其他班主任班时，第二个班主任班的行被拒绝。
    pub fn load_enrollments(
        &self,
        rows: &[RawRecord],
        rejections: &mut Vec<SeedRejection>,
    ) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "student_class";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let student_number = required(row, TABLE, line, "student_number")?;
            let student = self
                .repos
                .student_repo
                .find_by_number(student_number)?
                .ok_or_else(|| dangling(TABLE, line, format!("学生不存在: {}", student_number)))?;
            let class_id = self.class_id(row, TABLE, line)?;

            match self.repos.enrollment_repo.enroll_student(student.id, class_id) {
                Ok(true) => stats.inserted += 1,
                Ok(false) => stats.skipped += 1,
                Err(e) if e.is_exclusion(ExclusionKind::Homeroom) => {
                    reject(
                        &mut stats,
                        rejections,
                        TABLE,
                        line,
                        format!("学生 {} 已有其他班主任班", student_number),
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stats)
    }

    /// time_off_request.csv: staff_number, start_date, end_date, reason, substitute_number
    ///
    /// substitute_number 可为空；完全相同的请假单已存在时跳过；
    /// 代课教师已被重叠请假单占用的行被拒绝。
    pub fn load_time_off_requests(
        &self,
        rows: &[RawRecord],
        rejections: &mut Vec<SeedRejection>,
    ) -> ImportResult<TableLoadStats> {
        const TABLE: &str = "time_off_request";
        let mut stats = TableLoadStats::default();
        for (idx, row) in rows.iter().enumerate() {
            let line = idx + 1;
            let staff_number = required(row, TABLE, line, "staff_number")?;
            let staff = self
                .repos
                .staff_repo
                .find_by_number(staff_number)?
                .ok_or_else(|| dangling(TABLE, line, format!("教职工不存在: {}", staff_number)))?;
            let substitute_id = match optional(row, "substitute_number") {
                Some(number) => Some(
                    self.repos
                        .substitute_repo
                        .find_by_number(number)?
                        .ok_or_else(|| dangling(TABLE, line, format!("代课教师不存在: {}", number)))?
                        .id,
                ),
                None => None,
            };
            let start = date_field(row, TABLE, line, "start_date")?;
            let end = date_field(row, TABLE, line, "end_date")?;
            if start > end {
                return Err(ImportError::TypeConversionError {
                    table: TABLE,
                    row: line,
                    field: "end_date",
                    message: format!("结束日期早于开始日期: {} > {}", start, end),
                });
            }
            let reason = required(row, TABLE, line, "reason")?;

            let exists = self
                .repos
                .time_off_repo
                .list_by_staff(staff.id)?
                .iter()
                .any(|r| {
                    r.start_date == start
                        && r.end_date == end
                        && r.reason == reason
                        && r.substitute_id == substitute_id
                });
            if exists {
                stats.skipped += 1;
                continue;
            }

            let request = NewTimeOffRequest {
                staff_id: staff.id,
                start_date: start,
                end_date: end,
                reason: reason.to_string(),
                substitute_id,
            };
            match self.repos.time_off_repo.create(&request) {
                Ok(_) => stats.inserted += 1,
                Err(e) if e.is_exclusion(ExclusionKind::SubstituteCommitment) => {
                    reject(
                        &mut stats,
                        rejections,
                        TABLE,
                        line,
                        format!("代课教师在 {} ~ {} 已被其他请假单占用", start, end),
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(stats)
    }

    fn class_id(&self, row: &RawRecord, table: &'static str, line: usize) -> ImportResult<i64> {
        let class_number = required(row, table, line, "class_number")?;
        let class = self
            .repos
            .class_repo
            .find_by_number(class_number)?
            .ok_or_else(|| dangling(table, line, format!("班级不存在: {}", class_number)))?;
        Ok(class.id)
    }
}

fn dangling(table: &'static str, row: usize, message: String) -> ImportError {
    ImportError::DanglingReference { table, row, message }
}

fn reject(
    stats: &mut TableLoadStats,
    rejections: &mut Vec<SeedRejection>,
    table: &'static str,
    row: usize,
    reason: String,
) {
    warn!(table, row, reason = %reason, "行被排他约束拒绝");
    stats.rejected += 1;
    rejections.push(SeedRejection { table, row, reason });
}

fn converted<T>(
    result: ApiResult<T>,
    table: &'static str,
    row: usize,
    field: &'static str,
) -> ImportResult<T> {
    result.map_err(|e| ImportError::TypeConversionError {
        table,
        row,
        field,
        message: e.to_string(),
    })
}

/// 读取 `{table}.csv`，文件缺失时返回 None
fn read_table(
    dir: &Path,
    table: &str,
    missing: &mut Vec<String>,
) -> ImportResult<Option<Vec<RawRecord>>> {
    let path = dir.join(format!("{}.csv", table));
    if !path.exists() {
        warn!(file = %path.display(), "CSV 文件不存在，跳过");
        missing.push(table.to_string());
        return Ok(None);
    }
    Ok(Some(parse_csv(&path)?))
}

/// 解析 CSV 为 (表头 -> 值) 记录
pub fn parse_csv(path: &Path) -> ImportResult<Vec<RawRecord>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row_map = HashMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                row_map.insert(header.clone(), value.trim().to_string());
            }
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.is_empty()) {
            continue;
        }

        records.push(row_map);
    }

    Ok(records)
}

fn required<'a>(
    row: &'a RawRecord,
    table: &'static str,
    line: usize,
    field: &'static str,
) -> ImportResult<&'a str> {
    optional(row, field).ok_or(ImportError::MissingField {
        table,
        row: line,
        field,
    })
}

fn optional<'a>(row: &'a RawRecord, field: &str) -> Option<&'a str> {
    row.get(field).map(String::as_str).filter(|v| !v.is_empty())
}

fn date_field(
    row: &RawRecord,
    table: &'static str,
    line: usize,
    field: &'static str,
) -> ImportResult<NaiveDate> {
    let raw = required(row, table, line, field)?;
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| ImportError::TypeConversionError {
        table,
        row: line,
        field,
        message: format!("{} ({})", e, raw),
    })
}
