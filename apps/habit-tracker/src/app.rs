//! Habit operations on top of the store and the scheduler.

use crate::config::Config;
use crate::db::{Database, DbError};
use crate::models::{
    ActiveStreak, Completion, DueHabit, Habit, HabitDetail, HabitId, HabitStreakOverview,
    StatusSummary, MAX_TITLE_LEN,
};
use chrono::NaiveDate;
use habit_schedule::{calendar, Clock, CompletionLog, HabitScheduler, Recurrence, SystemClock};
use thiserror::Error;

/// Errors from habit operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Habit not found: {0}")]
    NotFound(HabitId),
    #[error("{0}")]
    Validation(String),
    #[error("Habit already checked for {0}")]
    AlreadyChecked(NaiveDate),
    #[error("No completion found for {0}")]
    NotChecked(NaiveDate),
}

pub type AppResult<T> = Result<T, AppError>;

/// Changes for [`App::edit`]; `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct HabitUpdate {
    pub title: Option<String>,
    pub recurrence: Option<Recurrence>,
}

/// Application state.
pub struct App<C: Clock = SystemClock> {
    /// Database connection.
    pub db: Database,
    /// Configuration.
    pub config: Config,
    scheduler: HabitScheduler<C>,
}

impl<C: Clock> App<C> {
    pub fn new(db: Database, config: Config, clock: C) -> Self {
        Self {
            db,
            config,
            scheduler: HabitScheduler::with_clock(clock),
        }
    }

    /// The reference date for "today" operations.
    pub fn today(&self) -> NaiveDate {
        self.scheduler.today()
    }

    /// Create a habit.
    pub fn add(&self, title: &str, recurrence: Recurrence) -> AppResult<Habit> {
        validate_title(title)?;
        validate_recurrence(&recurrence)?;

        let habit = Habit::new(title, recurrence);
        self.db.insert_habit(&habit)?;
        tracing::info!(id = %habit.id, title = %habit.title, frequency = habit.recurrence.frequency(), "added habit");
        Ok(habit)
    }

    /// Change title and/or recurrence.
    ///
    /// A new recurrence applies to the whole history, so the stored streak is
    /// recomputed.
    pub fn edit(&self, id: HabitId, update: HabitUpdate) -> AppResult<Habit> {
        let mut habit = self.find(id)?;

        if let Some(title) = update.title {
            validate_title(&title)?;
            habit.title = title;
        }

        if let Some(recurrence) = update.recurrence {
            validate_recurrence(&recurrence)?;
            if recurrence != habit.recurrence {
                habit.recurrence = recurrence;
                self.refresh_streak(&mut habit)?;
            }
        }

        self.db.update_habit(&habit)?;
        tracing::info!(id = %habit.id, "edited habit");
        Ok(habit)
    }

    /// Mark a habit done on `date` (default today).
    pub fn check(&self, id: HabitId, date: Option<NaiveDate>) -> AppResult<Completion> {
        let mut habit = self.find(id)?;
        let date = date.unwrap_or_else(|| self.today());

        if self.db.get_completion(id, date)?.is_some() {
            return Err(AppError::AlreadyChecked(date));
        }

        let completion = Completion::new(id, date);
        self.db.insert_completion(&completion)?;

        self.refresh_streak(&mut habit)?;
        self.db.update_habit(&habit)?;
        Ok(completion)
    }

    /// Remove the completion on `date` (default today).
    pub fn uncheck(&self, id: HabitId, date: Option<NaiveDate>) -> AppResult<Habit> {
        let mut habit = self.find(id)?;
        let date = date.unwrap_or_else(|| self.today());

        if !self.db.delete_completion(id, date)? {
            return Err(AppError::NotChecked(date));
        }

        self.refresh_streak(&mut habit)?;
        self.db.update_habit(&habit)?;
        Ok(habit)
    }

    pub fn archive(&self, id: HabitId) -> AppResult<Habit> {
        self.set_active(id, false)
    }

    pub fn restore(&self, id: HabitId) -> AppResult<Habit> {
        self.set_active(id, true)
    }

    /// Delete a habit and its history.
    pub fn remove(&self, id: HabitId) -> AppResult<()> {
        if !self.db.delete_habit(id)? {
            return Err(AppError::NotFound(id));
        }
        tracing::info!(%id, "removed habit");
        Ok(())
    }

    /// Habits, active only unless `include_archived`.
    pub fn list(&self, include_archived: bool) -> AppResult<Vec<Habit>> {
        Ok(self.db.list_habits(include_archived)?)
    }

    /// A habit with its recent completions.
    pub fn show(&self, id: HabitId) -> AppResult<HabitDetail> {
        let habit = self.find(id)?;
        let recent_completions = self
            .db
            .recent_completions(id, self.config.display.recent_completions)?;
        Ok(HabitDetail {
            habit,
            recent_completions,
        })
    }

    /// Stored streaks of all active habits.
    pub fn streaks(&self) -> AppResult<Vec<HabitStreakOverview>> {
        Ok(self
            .db
            .list_habits(false)?
            .iter()
            .map(HabitStreakOverview::from)
            .collect())
    }

    /// Active habits due today, with whether each is already done.
    pub fn due_today(&self) -> AppResult<Vec<DueHabit>> {
        let today = self.today();
        let mut due = Vec::new();

        for habit in self.db.list_habits(false)? {
            if !self.scheduler.is_due_today(&habit) {
                continue;
            }
            let done = self.db.get_completion(habit.id, today)?.is_some();
            due.push(DueHabit { habit, done });
        }

        Ok(due)
    }

    /// Today's summary.
    pub fn status(&self) -> AppResult<StatusSummary> {
        let today = self.today();
        let habits_due = self.due_today()?;
        let habits_done_count = habits_due.iter().filter(|h| h.done).count();

        let best_active_streak = self
            .db
            .list_habits(false)?
            .into_iter()
            .filter(|h| h.current_streak > 0)
            .fold(None::<ActiveStreak>, |best, h| match best {
                Some(b) if b.streak >= h.current_streak => Some(b),
                _ => Some(ActiveStreak {
                    habit: h.title,
                    streak: h.current_streak,
                }),
            });

        Ok(StatusSummary {
            date: today,
            date_formatted: calendar::format_human(today),
            habits_due_count: habits_due.len(),
            habits_due,
            habits_done_count,
            best_active_streak,
        })
    }

    fn find(&self, id: HabitId) -> AppResult<Habit> {
        self.db.get_habit(id)?.ok_or(AppError::NotFound(id))
    }

    fn set_active(&self, id: HabitId, active: bool) -> AppResult<Habit> {
        let mut habit = self.find(id)?;
        habit.active = active;
        self.db.update_habit(&habit)?;
        tracing::info!(%id, active, "changed habit state");
        Ok(habit)
    }

    /// Recompute streaks from the stored completions and fold them into `habit`.
    fn refresh_streak(&self, habit: &mut Habit) -> AppResult<()> {
        let completions: CompletionLog = self.db.completion_dates(habit.id)?.into_iter().collect();
        let result = self.scheduler.recompute_streak(&*habit, &completions);
        habit.apply_streak(result, completions.newest());
        tracing::info!(
            id = %habit.id,
            current = habit.current_streak,
            best = habit.best_streak,
            "recomputed streak"
        );
        Ok(())
    }
}

fn validate_title(title: &str) -> AppResult<()> {
    let len = title.chars().count();
    if len == 0 || len > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "Habit title must be 1-{} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(())
}

fn validate_recurrence(recurrence: &Recurrence) -> AppResult<()> {
    match recurrence.days() {
        Some(days) if days.is_empty() => Err(AppError::Validation(
            "Days are required for specific_days frequency".to_string(),
        )),
        _ => Ok(()),
    }
}
