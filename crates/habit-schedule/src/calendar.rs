//! Calendar arithmetic over naive `YYYY-MM-DD` dates.
//!
//! Everything here is pure except [`today`], which reads the local wall
//! clock and is only meant to be called from the service layer.

use crate::error::{ScheduleError, ScheduleResult};
use chrono::{Datelike, Duration, Local, NaiveDate};
use std::fmt;

/// Storage and display format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Parse a `YYYY-MM-DD` string.
pub fn parse_date(s: &str) -> ScheduleResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ScheduleError::InvalidDate(s.to_string()))
}

/// Parse a date the caller guarantees is well formed.
///
/// # Panics
///
/// Panics if `s` is not a valid `YYYY-MM-DD` date. A malformed string here is
/// a bug in the calling layer; use [`parse_date`] for user input.
pub fn date(s: &str) -> NaiveDate {
    match parse_date(s) {
        Ok(d) => d,
        Err(e) => panic!("{e}"),
    }
}

/// Format as `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Format as e.g. `Tue, Feb 10 2026`.
pub fn format_human(date: NaiveDate) -> String {
    format!(
        "{}, {} {}",
        DAY_NAMES[day_of_week(date) as usize],
        date.format("%b"),
        date.format("%-d %Y")
    )
}

/// Day of week, `0 = Sunday` .. `6 = Saturday`.
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// ISO-8601 week containing `date`.
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    let week = date.iso_week();
    IsoWeek {
        year: week.year(),
        week: week.week(),
    }
}

/// Add `n` days (negative to go back).
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    date + Duration::days(n)
}

/// `a - b` in whole days; positive when `a` is later.
pub fn diff_days(a: NaiveDate, b: NaiveDate) -> i64 {
    a.signed_duration_since(b).num_days()
}

/// Today's date on the local wall clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// An ISO-8601 week, used as a grouping key for weekly streaks.
///
/// Ordering is by year then week number, which matches the `YYYY-W##`
/// string ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IsoWeek {
    /// ISO week-numbering year (may differ from the calendar year near January 1).
    pub year: i32,
    /// Week number, `1..=53`.
    pub week: u32,
}

impl IsoWeek {
    /// Whether `next` is the week directly after `self`.
    ///
    /// Across a year boundary only week 1 can follow, and only from week 52
    /// or later, since the last week of a year is 52 or 53.
    pub fn is_followed_by(&self, next: &IsoWeek) -> bool {
        if self.year == next.year {
            next.week == self.week + 1
        } else if next.year == self.year + 1 && next.week == 1 {
            self.week >= 52
        } else {
            false
        }
    }
}

impl fmt::Display for IsoWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-W{:02}", self.year, self.week)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let d = parse_date("2026-02-10").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2026, 2, 10).unwrap());
        assert_eq!(format_date(d), "2026-02-10");
        assert_eq!(format_date(date("2026-01-05")), "2026-01-05");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert_eq!(
            parse_date("2026-13-01"),
            Err(ScheduleError::InvalidDate("2026-13-01".to_string()))
        );
        assert!(parse_date("yesterday").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    #[should_panic(expected = "Invalid date")]
    fn test_trusted_date_panics_on_garbage() {
        date("02/10/2026");
    }

    #[test]
    fn test_day_of_week() {
        assert_eq!(day_of_week(date("2026-02-10")), 2); // Tuesday
        assert_eq!(day_of_week(date("2026-02-08")), 0); // Sunday
        assert_eq!(day_of_week(date("2026-02-14")), 6); // Saturday
    }

    #[test]
    fn test_iso_week() {
        assert_eq!(iso_week(date("2026-02-10")).to_string(), "2026-W07");
        assert_eq!(iso_week(date("2026-02-03")).to_string(), "2026-W06");
        // Monday starts the week, Sunday ends it
        assert_eq!(iso_week(date("2026-02-09")), iso_week(date("2026-02-15")));
        assert_ne!(iso_week(date("2026-02-08")), iso_week(date("2026-02-09")));
    }

    #[test]
    fn test_iso_week_year_boundary() {
        // 2021-01-01 is a Friday and belongs to the last week of 2020
        assert_eq!(iso_week(date("2021-01-01")).to_string(), "2020-W53");
        // 2024-12-30 is a Monday and starts week 1 of 2025
        assert_eq!(iso_week(date("2024-12-30")).to_string(), "2025-W01");
    }

    #[test]
    fn test_week_adjacency() {
        let w = |year, week| IsoWeek { year, week };
        assert!(w(2026, 6).is_followed_by(&w(2026, 7)));
        assert!(!w(2026, 6).is_followed_by(&w(2026, 8)));
        assert!(!w(2026, 7).is_followed_by(&w(2026, 6)));
        assert!(w(2025, 52).is_followed_by(&w(2026, 1)));
        assert!(w(2020, 53).is_followed_by(&w(2021, 1)));
        assert!(!w(2025, 51).is_followed_by(&w(2026, 1)));
        assert!(!w(2025, 52).is_followed_by(&w(2026, 2)));
        assert!(!w(2024, 52).is_followed_by(&w(2026, 1)));
    }

    #[test]
    fn test_add_days() {
        assert_eq!(add_days(date("2026-02-10"), 1), date("2026-02-11"));
        assert_eq!(add_days(date("2026-02-10"), -1), date("2026-02-09"));
        assert_eq!(add_days(date("2026-02-28"), 1), date("2026-03-01"));
        assert_eq!(add_days(date("2024-02-28"), 1), date("2024-02-29"));
        assert_eq!(add_days(date("2026-01-01"), -1), date("2025-12-31"));
    }

    #[test]
    fn test_diff_days() {
        assert_eq!(diff_days(date("2026-02-12"), date("2026-02-10")), 2);
        assert_eq!(diff_days(date("2026-02-10"), date("2026-02-12")), -2);
        assert_eq!(diff_days(date("2027-01-01"), date("2026-01-01")), 365);
    }

    #[test]
    fn test_format_human() {
        assert_eq!(format_human(date("2026-02-10")), "Tue, Feb 10 2026");
        assert_eq!(format_human(date("2026-03-01")), "Sun, Mar 1 2026");
    }
}
