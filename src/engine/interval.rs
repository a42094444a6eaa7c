// ==========================================
// 校务排课系统 - 时间区间工具
// ==========================================
// 职责: 纯函数区间判定，无 I/O
// 时段: 半开区间 [start, start+duration)，首尾相接不算重叠
// 日期: 闭区间 [start_date, end_date]
// ==========================================

use chrono::{Duration, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 一天的秒数
pub const SECONDS_PER_DAY: i64 = 86_400;

/// 区间构造错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntervalError {
    #[error("时长必须大于 0: {0}s")]
    NonPositiveDuration(i64),

    #[error("时段跨越午夜: start={start}, duration={duration_sec}s")]
    CrossesMidnight { start: NaiveTime, duration_sec: i64 },

    #[error("日期区间起点晚于终点: {start} > {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

fn seconds_of(t: NaiveTime) -> i64 {
    t.num_seconds_from_midnight() as i64
}

/// 两个时段是否重叠（半开区间）
///
/// 以距午夜秒数比较，结束时刻不会回绕。
pub fn time_overlaps(start_a: NaiveTime, dur_a: Duration, start_b: NaiveTime, dur_b: Duration) -> bool {
    let a0 = seconds_of(start_a);
    let b0 = seconds_of(start_b);
    let a1 = a0 + dur_a.num_seconds();
    let b1 = b0 + dur_b.num_seconds();
    a0 < b1 && b0 < a1
}

/// 两个日期区间是否重叠（闭区间，对称）
pub fn date_range_overlaps(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> bool {
    start_a <= end_b && start_b <= end_a
}

/// 覆盖区间是否完整包含目标区间
pub fn date_range_covers(
    cov_start: NaiveDate,
    cov_end: NaiveDate,
    tgt_start: NaiveDate,
    tgt_end: NaiveDate,
) -> bool {
    cov_start <= tgt_start && cov_end >= tgt_end
}

// ==========================================
// TimeSlot - 当日时段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    start: NaiveTime,
    duration_sec: i64,
}

impl TimeSlot {
    /// 构造时段
    ///
    /// # 错误
    /// - 时长 <= 0
    /// - start + duration 超过 24:00
    pub fn new(start: NaiveTime, duration: Duration) -> Result<Self, IntervalError> {
        let duration_sec = duration.num_seconds();
        if duration_sec <= 0 {
            return Err(IntervalError::NonPositiveDuration(duration_sec));
        }
        if seconds_of(start) + duration_sec > SECONDS_PER_DAY {
            return Err(IntervalError::CrossesMidnight { start, duration_sec });
        }
        Ok(Self { start, duration_sec })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn start_sec(&self) -> i64 {
        seconds_of(self.start)
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(self.duration_sec)
    }

    pub fn duration_sec(&self) -> i64 {
        self.duration_sec
    }

    /// 结束时刻（距午夜秒数，不含）
    pub fn end_sec(&self) -> i64 {
        self.start_sec() + self.duration_sec
    }

    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        time_overlaps(self.start, self.duration(), other.start, other.duration())
    }
}

// ==========================================
// DateRange - 闭日期区间
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, IntervalError> {
        if start > end {
            return Err(IntervalError::InvertedDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// 区间包含的天数（含首尾）
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        date_range_overlaps(self.start, self.end, other.start, other.end)
    }

    /// self 是否完整覆盖 target
    pub fn covers(&self, target: &DateRange) -> bool {
        date_range_covers(self.start, self.end, target.start, target.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_time_overlaps_half_open() {
        let hour = Duration::hours(1);
        assert!(time_overlaps(t(9, 0), hour, t(9, 30), hour));
        assert!(time_overlaps(t(9, 30), hour, t(9, 0), hour));
        // 首尾相接
        assert!(!time_overlaps(t(9, 0), hour, t(10, 0), Duration::minutes(30)));
        assert!(!time_overlaps(t(10, 0), hour, t(9, 0), hour));
        // 包含
        assert!(time_overlaps(t(8, 0), Duration::hours(4), t(9, 0), hour));
    }

    #[test]
    fn test_date_range_overlaps_closed() {
        // 同一天首尾相接也算重叠
        assert!(date_range_overlaps(d("2025-02-01"), d("2025-02-03"), d("2025-02-03"), d("2025-02-04")));
        assert!(!date_range_overlaps(d("2025-02-01"), d("2025-02-03"), d("2025-02-04"), d("2025-02-05")));
    }

    #[test]
    fn test_date_range_covers() {
        let cov = DateRange::new(d("2025-01-01"), d("2025-06-30")).unwrap();
        assert!(cov.covers(&DateRange::new(d("2025-02-01"), d("2025-02-03")).unwrap()));
        assert!(cov.covers(&cov));
        assert!(!cov.covers(&DateRange::new(d("2025-06-30"), d("2025-07-01")).unwrap()));
    }

    #[test]
    fn test_time_slot_validation() {
        assert_eq!(
            TimeSlot::new(t(9, 0), Duration::zero()),
            Err(IntervalError::NonPositiveDuration(0))
        );
        assert!(matches!(
            TimeSlot::new(t(23, 30), Duration::hours(1)),
            Err(IntervalError::CrossesMidnight { .. })
        ));
        let slot = TimeSlot::new(t(23, 0), Duration::hours(1)).unwrap();
        assert_eq!(slot.end_sec(), SECONDS_PER_DAY);
    }

    #[test]
    fn test_date_range_rejects_inverted() {
        assert!(DateRange::new(d("2025-02-03"), d("2025-02-01")).is_err());
        assert_eq!(DateRange::new(d("2025-02-01"), d("2025-02-03")).unwrap().days(), 3);
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0i64..400).prop_map(|offset| d("2025-01-01") + Duration::days(offset))
    }

    proptest! {
        #[test]
        fn prop_date_range_overlaps_is_symmetric(
            a0 in arb_date(), a1 in arb_date(), b0 in arb_date(), b1 in arb_date()
        ) {
            prop_assert_eq!(
                date_range_overlaps(a0, a1, b0, b1),
                date_range_overlaps(b0, b1, a0, a1)
            );
        }

        #[test]
        fn prop_time_overlaps_is_symmetric(
            a in 0i64..86_000, da in 1i64..400, b in 0i64..86_000, db in 1i64..400
        ) {
            let ta = NaiveTime::from_num_seconds_from_midnight_opt(a as u32, 0).unwrap();
            let tb = NaiveTime::from_num_seconds_from_midnight_opt(b as u32, 0).unwrap();
            prop_assert_eq!(
                time_overlaps(ta, Duration::seconds(da), tb, Duration::seconds(db)),
                time_overlaps(tb, Duration::seconds(db), ta, Duration::seconds(da))
            );
        }

        #[test]
        fn prop_covering_range_overlaps_target(
            a0 in arb_date(), a1 in arb_date(), b0 in arb_date(), b1 in arb_date()
        ) {
            prop_assume!(a0 <= a1 && b0 <= b1);
            if date_range_covers(a0, a1, b0, b1) {
                prop_assert!(date_range_overlaps(a0, a1, b0, b1));
            }
        }
    }
}
