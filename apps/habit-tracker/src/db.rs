//! Database operations for habit tracking.

use crate::models::{Completion, Habit, HabitId};
use chrono::{NaiveDate, Utc};
use habit_schedule::{calendar, Recurrence, ScheduleError};
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Corrupt row: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("Corrupt id: {0}")]
    Uuid(#[from] uuid::Error),
    #[error("Corrupt timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at path.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::debug!(path = %path.display(), "opened habit database");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn init(&self) -> DbResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS habits (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                frequency TEXT NOT NULL,
                days TEXT,
                active INTEGER NOT NULL DEFAULT 1,
                current_streak INTEGER NOT NULL DEFAULT 0,
                best_streak INTEGER NOT NULL DEFAULT 0,
                last_completed_at TEXT,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS completions (
                id TEXT PRIMARY KEY,
                habit_id TEXT NOT NULL REFERENCES habits(id),
                date TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(habit_id, date)
            );

            CREATE INDEX IF NOT EXISTS idx_completions_habit ON completions(habit_id);
            "#,
        )?;
        Ok(())
    }

    /// Insert a new habit.
    pub fn insert_habit(&self, habit: &Habit) -> DbResult<()> {
        let days = serialize_days(&habit.recurrence)?;

        self.conn.execute(
            r#"
            INSERT INTO habits (id, title, frequency, days, active, current_streak,
                                best_streak, last_completed_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                habit.id.to_string(),
                habit.title,
                habit.recurrence.frequency(),
                days,
                habit.active as i32,
                habit.current_streak,
                habit.best_streak,
                habit.last_completed_at.map(calendar::format_date),
                habit.created_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(id = %habit.id, "inserted habit");
        Ok(())
    }

    /// Update an existing habit. Returns whether a row was changed.
    pub fn update_habit(&self, habit: &Habit) -> DbResult<bool> {
        let days = serialize_days(&habit.recurrence)?;

        let changed = self.conn.execute(
            r#"
            UPDATE habits SET
                title = ?2, frequency = ?3, days = ?4, active = ?5, current_streak = ?6,
                best_streak = ?7, last_completed_at = ?8
            WHERE id = ?1
            "#,
            params![
                habit.id.to_string(),
                habit.title,
                habit.recurrence.frequency(),
                days,
                habit.active as i32,
                habit.current_streak,
                habit.best_streak,
                habit.last_completed_at.map(calendar::format_date),
            ],
        )?;
        tracing::debug!(id = %habit.id, changed, "updated habit");
        Ok(changed > 0)
    }

    /// Delete a habit and all its completions.
    pub fn delete_habit(&self, id: HabitId) -> DbResult<bool> {
        self.conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1",
            params![id.to_string()],
        )?;
        let deleted = self
            .conn
            .execute("DELETE FROM habits WHERE id = ?1", params![id.to_string()])?;
        tracing::debug!(%id, deleted, "deleted habit");
        Ok(deleted > 0)
    }

    /// Get a habit by ID.
    pub fn get_habit(&self, id: HabitId) -> DbResult<Option<Habit>> {
        let mut stmt = self.conn.prepare("SELECT * FROM habits WHERE id = ?1")?;
        let row = stmt
            .query_row(params![id.to_string()], HabitRow::from_row)
            .optional()?;
        row.map(HabitRow::into_habit).transpose()
    }

    /// List all habits (optionally including archived).
    pub fn list_habits(&self, include_archived: bool) -> DbResult<Vec<Habit>> {
        let sql = if include_archived {
            "SELECT * FROM habits ORDER BY created_at, rowid"
        } else {
            "SELECT * FROM habits WHERE active = 1 ORDER BY created_at, rowid"
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map([], HabitRow::from_row)?
            .collect::<SqlResult<Vec<_>>>()?;

        rows.into_iter().map(HabitRow::into_habit).collect()
    }

    /// Record a completion.
    pub fn insert_completion(&self, completion: &Completion) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO completions (id, habit_id, date, created_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                completion.id.to_string(),
                completion.habit_id.to_string(),
                calendar::format_date(completion.date),
                completion.created_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(habit_id = %completion.habit_id, date = %completion.date, "inserted completion");
        Ok(())
    }

    /// Remove the completion for a habit on a date. Returns whether one existed.
    pub fn delete_completion(&self, habit_id: HabitId, date: NaiveDate) -> DbResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1 AND date = ?2",
            params![habit_id.to_string(), calendar::format_date(date)],
        )?;
        tracing::debug!(%habit_id, %date, deleted, "deleted completion");
        Ok(deleted > 0)
    }

    /// Get the completion for a habit on a specific date.
    pub fn get_completion(&self, habit_id: HabitId, date: NaiveDate) -> DbResult<Option<Completion>> {
        let mut stmt = self
            .conn
            .prepare("SELECT * FROM completions WHERE habit_id = ?1 AND date = ?2")?;
        let row = stmt
            .query_row(
                params![habit_id.to_string(), calendar::format_date(date)],
                CompletionRow::from_row,
            )
            .optional()?;
        row.map(CompletionRow::into_completion).transpose()
    }

    /// All completion dates for a habit, newest first.
    pub fn completion_dates(&self, habit_id: HabitId) -> DbResult<Vec<NaiveDate>> {
        let mut stmt = self
            .conn
            .prepare("SELECT date FROM completions WHERE habit_id = ?1 ORDER BY date DESC")?;
        let dates = stmt
            .query_map(params![habit_id.to_string()], |row| row.get::<_, String>(0))?
            .collect::<SqlResult<Vec<_>>>()?;

        dates
            .iter()
            .map(|d| calendar::parse_date(d).map_err(DbError::from))
            .collect()
    }

    /// The `limit` most recent completions for a habit.
    pub fn recent_completions(&self, habit_id: HabitId, limit: usize) -> DbResult<Vec<Completion>> {
        let mut stmt = self.conn.prepare(
            "SELECT * FROM completions WHERE habit_id = ?1 ORDER BY date DESC LIMIT ?2",
        )?;
        let rows = stmt
            .query_map(
                params![habit_id.to_string(), limit as i64],
                CompletionRow::from_row,
            )?
            .collect::<SqlResult<Vec<_>>>()?;

        rows.into_iter().map(CompletionRow::into_completion).collect()
    }
}

// Helper functions

fn serialize_days(recurrence: &Recurrence) -> DbResult<Option<String>> {
    recurrence
        .days()
        .map(|days| serde_json::to_string(&Vec::<u8>::from(*days)))
        .transpose()
        .map_err(DbError::from)
}

fn deserialize_recurrence(frequency: &str, days: Option<String>) -> DbResult<Recurrence> {
    let days: Option<Vec<u8>> = days.map(|d| serde_json::from_str(&d)).transpose()?;
    Ok(Recurrence::from_parts(frequency, days.as_deref())?)
}

fn parse_timestamp(s: &str) -> DbResult<chrono::DateTime<Utc>> {
    Ok(chrono::DateTime::parse_from_rfc3339(s)?.with_timezone(&Utc))
}

/// Raw `habits` row, converted once the statement is done.
struct HabitRow {
    id: String,
    title: String,
    frequency: String,
    days: Option<String>,
    active: i32,
    current_streak: u32,
    best_streak: u32,
    last_completed_at: Option<String>,
    created_at: String,
}

impl HabitRow {
    fn from_row(row: &rusqlite::Row) -> SqlResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            frequency: row.get("frequency")?,
            days: row.get("days")?,
            active: row.get("active")?,
            current_streak: row.get("current_streak")?,
            best_streak: row.get("best_streak")?,
            last_completed_at: row.get("last_completed_at")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_habit(self) -> DbResult<Habit> {
        Ok(Habit {
            id: Uuid::parse_str(&self.id)?,
            title: self.title,
            recurrence: deserialize_recurrence(&self.frequency, self.days)?,
            active: self.active != 0,
            current_streak: self.current_streak,
            best_streak: self.best_streak,
            last_completed_at: self
                .last_completed_at
                .as_deref()
                .map(calendar::parse_date)
                .transpose()?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

/// Raw `completions` row.
struct CompletionRow {
    id: String,
    habit_id: String,
    date: String,
    created_at: String,
}

impl CompletionRow {
    fn from_row(row: &rusqlite::Row) -> SqlResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            habit_id: row.get("habit_id")?,
            date: row.get("date")?,
            created_at: row.get("created_at")?,
        })
    }

    fn into_completion(self) -> DbResult<Completion> {
        Ok(Completion {
            id: Uuid::parse_str(&self.id)?,
            habit_id: Uuid::parse_str(&self.habit_id)?,
            date: calendar::parse_date(&self.date)?,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}
