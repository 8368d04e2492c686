//! Data models for habit tracking.

use chrono::{DateTime, NaiveDate, Utc};
use habit_schedule::{Recurrence, Scheduled, StreakResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique habit identifier.
pub type HabitId = Uuid;

/// Longest accepted habit title, in characters.
pub const MAX_TITLE_LEN: usize = 200;

/// A habit to track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier.
    pub id: HabitId,
    /// Habit title.
    pub title: String,
    /// When the habit recurs.
    #[serde(flatten)]
    pub recurrence: Recurrence,
    /// Archived habits are hidden from lists and summaries.
    pub active: bool,
    /// Current streak as of the last completion change.
    pub current_streak: u32,
    /// Best streak ever recorded.
    pub best_streak: u32,
    /// Most recent completion date.
    pub last_completed_at: Option<NaiveDate>,
    /// When the habit was created.
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new active habit with no history.
    pub fn new(title: impl Into<String>, recurrence: Recurrence) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            recurrence,
            active: true,
            current_streak: 0,
            best_streak: 0,
            last_completed_at: None,
            created_at: Utc::now(),
        }
    }

    /// Fold a fresh calculation into the stored streak fields.
    ///
    /// The stored best never decreases, even if a recomputation over the
    /// current history (e.g. after an uncheck) comes out lower.
    pub fn apply_streak(&mut self, result: StreakResult, last_completed_at: Option<NaiveDate>) {
        self.current_streak = result.current_streak;
        self.best_streak = result.best_streak.max(self.best_streak);
        self.last_completed_at = last_completed_at;
    }
}

impl Scheduled for Habit {
    fn recurrence(&self) -> &Recurrence {
        &self.recurrence
    }
}

/// A habit marked done on a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    /// Unique identifier.
    pub id: Uuid,
    /// Associated habit.
    pub habit_id: HabitId,
    /// Date of the completion.
    pub date: NaiveDate,
    /// When the completion was recorded.
    pub created_at: DateTime<Utc>,
}

impl Completion {
    pub fn new(habit_id: HabitId, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            habit_id,
            date,
            created_at: Utc::now(),
        }
    }
}

/// A habit with its most recent completions.
#[derive(Debug, Clone, Serialize)]
pub struct HabitDetail {
    #[serde(flatten)]
    pub habit: Habit,
    pub recent_completions: Vec<Completion>,
}

/// Streak overview row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HabitStreakOverview {
    pub id: HabitId,
    pub title: String,
    pub frequency: &'static str,
    pub current_streak: u32,
    pub best_streak: u32,
    pub active: bool,
}

impl From<&Habit> for HabitStreakOverview {
    fn from(habit: &Habit) -> Self {
        Self {
            id: habit.id,
            title: habit.title.clone(),
            frequency: habit.recurrence.frequency(),
            current_streak: habit.current_streak,
            best_streak: habit.best_streak,
            active: habit.active,
        }
    }
}

/// A habit due today and whether it has been done.
#[derive(Debug, Clone, Serialize)]
pub struct DueHabit {
    #[serde(flatten)]
    pub habit: Habit,
    pub done: bool,
}

/// Habit with the highest running streak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveStreak {
    pub habit: String,
    pub streak: u32,
}

/// Daily summary across all active habits.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSummary {
    pub date: NaiveDate,
    pub date_formatted: String,
    pub habits_due: Vec<DueHabit>,
    pub habits_due_count: usize,
    pub habits_done_count: usize,
    pub best_active_streak: Option<ActiveStreak>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use habit_schedule::calendar::date;

    #[test]
    fn test_habit_creation() {
        let habit = Habit::new("Exercise", Recurrence::Weekly);
        assert_eq!(habit.title, "Exercise");
        assert!(habit.active);
        assert_eq!(habit.current_streak, 0);
        assert_eq!(habit.last_completed_at, None);
    }

    #[test]
    fn test_apply_streak_keeps_best() {
        let mut habit = Habit::new("Read", Recurrence::Daily);
        habit.apply_streak(
            StreakResult {
                current_streak: 5,
                best_streak: 5,
            },
            Some(date("2026-02-10")),
        );
        assert_eq!((habit.current_streak, habit.best_streak), (5, 5));

        habit.apply_streak(
            StreakResult {
                current_streak: 1,
                best_streak: 3,
            },
            Some(date("2026-02-08")),
        );
        assert_eq!((habit.current_streak, habit.best_streak), (1, 5));
        assert_eq!(habit.last_completed_at, Some(date("2026-02-08")));
    }

    #[test]
    fn test_habit_json_shape() {
        let habit = Habit::new("Stretch", Recurrence::Daily);
        let json = serde_json::to_value(&habit).unwrap();
        assert_eq!(json["frequency"], "daily");
        assert_eq!(json["title"], "Stretch");

        let back: Habit = serde_json::from_value(json).unwrap();
        assert_eq!(back, habit);
    }
}
