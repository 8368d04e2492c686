//! Recurrence models and the due-date predicate.

use crate::calendar::day_of_week;
use crate::error::{ScheduleError, ScheduleResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// How often a habit recurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "frequency", rename_all = "snake_case")]
pub enum Recurrence {
    /// Due every calendar day.
    Daily,
    /// Due any day; one completion per ISO week keeps the streak.
    Weekly,
    /// Due on the listed weekdays only.
    SpecificDays { days: DaySet },
}

impl Recurrence {
    /// Build a recurrence from its storage tag and optional weekday list.
    ///
    /// `days` is ignored for `daily` and `weekly`. For `specific_days` an
    /// absent list is an error; an empty one is accepted and never due.
    pub fn from_parts(frequency: &str, days: Option<&[u8]>) -> ScheduleResult<Self> {
        match frequency {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "specific_days" => {
                let days = days.ok_or(ScheduleError::MissingDays)?;
                Ok(Self::SpecificDays {
                    days: DaySet::from_indices(days.iter().copied())?,
                })
            }
            other => Err(ScheduleError::UnknownFrequency(other.to_string())),
        }
    }

    /// Storage tag for this recurrence.
    pub fn frequency(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::SpecificDays { .. } => "specific_days",
        }
    }

    /// Weekday set for `SpecificDays`, `None` otherwise.
    pub fn days(&self) -> Option<&DaySet> {
        match self {
            Self::SpecificDays { days } => Some(days),
            _ => None,
        }
    }

    /// Whether `date` is a due occurrence.
    ///
    /// Weekly habits are due every day: the one-per-week constraint only
    /// exists in the streak calculation.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self {
            Self::Daily | Self::Weekly => true,
            Self::SpecificDays { days } => days.contains(day_of_week(date)),
        }
    }
}

impl Default for Recurrence {
    fn default() -> Self {
        Self::Daily
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::SpecificDays { days } => write!(f, "Days: {}", days),
        }
    }
}

/// A set of weekdays indexed `0 = Sunday` .. `6 = Saturday`.
///
/// Stored as a bitmask; serialized as a sorted list of indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct DaySet(u8);

impl DaySet {
    /// Empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Build from weekday indices, rejecting anything above 6.
    pub fn from_indices(indices: impl IntoIterator<Item = u8>) -> ScheduleResult<Self> {
        let mut set = Self::empty();
        for index in indices {
            if index > 6 {
                return Err(ScheduleError::InvalidWeekday(index));
            }
            set.0 |= 1 << index;
        }
        Ok(set)
    }

    /// Parse a comma separated list such as `1,3,5`.
    pub fn parse_list(s: &str) -> ScheduleResult<Self> {
        let mut indices = Vec::new();
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let index = part
                .parse::<u8>()
                .map_err(|_| ScheduleError::InvalidDays(s.to_string()))?;
            indices.push(index);
        }
        Self::from_indices(indices)
    }

    /// Whether weekday `index` is in the set.
    pub fn contains(&self, index: u8) -> bool {
        index <= 6 && self.0 & (1 << index) != 0
    }

    /// Whether no weekday is selected.
    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of selected weekdays.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        (0..7u8).filter(move |i| self.contains(*i))
    }
}

impl TryFrom<Vec<u8>> for DaySet {
    type Error = ScheduleError;

    fn try_from(indices: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_indices(indices)
    }
}

impl From<DaySet> for Vec<u8> {
    fn from(set: DaySet) -> Self {
        set.iter().collect()
    }
}

impl fmt::Display for DaySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<_> = self.iter().map(|i| DAY_NAMES[i as usize]).collect();
        write!(f, "{}", names.join(", "))
    }
}
