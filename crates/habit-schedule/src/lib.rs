//! # habit-schedule
//!
//! Recurrence and streak engine for the habit tracker.
//!
//! ## Features
//!
//! - Calendar arithmetic on naive `YYYY-MM-DD` dates, including ISO week keys
//! - Daily, weekly and specific-weekday recurrences with a due-date predicate
//! - Current and best streaks with a per-recurrence grace rule
//! - A clock-aware façade so everything underneath stays pure
//!
//! ## Example
//!
//! ```
//! use habit_schedule::{calendar, calculate_streaks, CompletionLog, Recurrence};
//!
//! let log = CompletionLog::parse(["2026-02-09", "2026-02-08"]).unwrap();
//! let result = calculate_streaks(&log, &Recurrence::Daily, calendar::date("2026-02-10"));
//! assert_eq!(result.current_streak, 2);
//! ```

pub mod calendar;
mod error;
mod recurrence;
mod service;
mod streak;

pub use calendar::IsoWeek;
pub use error::{ScheduleError, ScheduleResult};
pub use recurrence::{DaySet, Recurrence};
pub use service::{Clock, FixedClock, HabitScheduler, Scheduled, SystemClock};
pub use streak::{calculate_streaks, CompletionLog, StreakResult, MAX_WALK_DAYS};
