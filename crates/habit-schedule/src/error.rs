//! Error types for parsing schedule input.

use thiserror::Error;

/// Errors raised while turning untrusted input into schedule values.
///
/// The calculations themselves never fail; these only come from the
/// string and integer boundaries where stored or typed data enters the core.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    /// Not a `YYYY-MM-DD` calendar date.
    #[error("Invalid date: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),

    /// Weekday index outside `0..=6`.
    #[error("Invalid weekday: {0} (expected 0=Sunday .. 6=Saturday)")]
    InvalidWeekday(u8),

    /// Day list that is not comma separated integers.
    #[error("Invalid day list: {0} (expected e.g. 1,3,5)")]
    InvalidDays(String),

    /// Frequency tag that names no recurrence.
    #[error("Unknown frequency: {0} (expected daily, weekly or specific_days)")]
    UnknownFrequency(String),

    /// `specific_days` given without a day list.
    #[error("Days are required for specific_days frequency")]
    MissingDays,
}

/// Result type for schedule parsing.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
