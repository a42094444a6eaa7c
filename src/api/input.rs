// ==========================================
// 校务排课系统 - API 入参解析
// ==========================================
// 时刻 / 时长: HH:MM:SS；日期: YYYY-MM-DD
// 解析失败一律返回 InvalidInput，不重试、不交互
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use chrono::{Duration, NaiveDate, NaiveTime};

/// 解析当日时刻 "HH:MM:SS"
pub fn parse_time_of_day(field: &str, raw: &str) -> ApiResult<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S")
        .map_err(|_| ApiError::InvalidInput(format!("{}格式错误（应为 HH:MM:SS）: {}", field, raw)))
}

/// 解析时长 "HH:MM:SS"（小时不限于 0-23）
pub fn parse_duration(field: &str, raw: &str) -> ApiResult<Duration> {
    let invalid = || ApiError::InvalidInput(format!("{}格式错误（应为 HH:MM:SS）: {}", field, raw));

    let parts: Vec<&str> = raw.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(invalid());
    }
    let hours: i64 = parts[0].parse().map_err(|_| invalid())?;
    let minutes: i64 = parts[1].parse().map_err(|_| invalid())?;
    let seconds: i64 = parts[2].parse().map_err(|_| invalid())?;
    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&seconds) {
        return Err(invalid());
    }

    hours
        .checked_mul(3600)
        .and_then(|h| h.checked_add(minutes * 60 + seconds))
        .and_then(Duration::try_seconds)
        .ok_or_else(|| ApiError::InvalidInput(format!("{}超出范围: {}", field, raw)))
}

/// 解析日期 "YYYY-MM-DD"
pub fn parse_date(field: &str, raw: &str) -> ApiResult<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::InvalidInput(format!("{}格式错误（应为 YYYY-MM-DD）: {}", field, raw)))
}

/// 非空校验
pub fn require_non_empty<'a>(field: &str, raw: &'a str) -> ApiResult<&'a str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput(format!("{}不能为空", field)));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("时长", "01:30:00").unwrap(), Duration::minutes(90));
        assert_eq!(parse_duration("时长", "00:00:45").unwrap(), Duration::seconds(45));
        assert!(parse_duration("时长", "1:61:00").is_err());
        assert!(parse_duration("时长", "90").is_err());
        assert!(parse_duration("时长", "aa:00:00").is_err());
    }

    #[test]
    fn test_parse_duration_out_of_range() {
        assert!(matches!(
            parse_duration("时长", "99999999999999:00:00"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_duration("时长", "9223372036854775807:59:59"),
            Err(ApiError::InvalidInput(_))
        ));
        assert_eq!(parse_duration("时长", "30:00:00").unwrap(), Duration::hours(30));
    }

    #[test]
    fn test_parse_time_and_date() {
        assert_eq!(
            parse_time_of_day("开始时间", " 09:30:00 ").unwrap(),
            NaiveTime::from_hms_opt(9, 30, 0).unwrap()
        );
        assert!(parse_time_of_day("开始时间", "25:00:00").is_err());
        assert!(parse_date("开始日期", "2025-02-30").is_err());
        assert!(require_non_empty("教职工编号", "   ").is_err());
    }
}
