//! Plain-text and JSON rendering for command output.

use crate::models::{DueHabit, Habit, HabitDetail, HabitStreakOverview, StatusSummary};
use chrono::NaiveDate;
use habit_schedule::calendar;
use serde::Serialize;
use std::fmt::Write;

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Render rows under a header, columns padded to the widest cell.
pub fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    let format_row = |cells: Vec<&str>| -> String {
        let padded: Vec<String> = cells
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                let w = widths.get(i).copied().unwrap_or(0);
                format!("{:width$}", cell, width = w)
            })
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let mut lines = vec![format_row(headers.to_vec())];
    let sep: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    lines.push(sep.join("  "));
    for row in rows {
        lines.push(format_row(row.iter().map(String::as_str).collect()));
    }
    lines.join("\n")
}

/// Formats dates with the configured pattern.
///
/// A pattern chrono cannot render falls back to `YYYY-MM-DD`.
pub struct DateStyle<'a>(pub &'a str);

impl DateStyle<'_> {
    pub fn date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        match write!(out, "{}", date.format(self.0)) {
            Ok(()) => out,
            Err(_) => calendar::format_date(date),
        }
    }

    pub fn optional(&self, date: Option<NaiveDate>) -> String {
        date.map(|d| self.date(d)).unwrap_or_else(|| "-".to_string())
    }
}

pub fn habits_table(habits: &[Habit], style: &DateStyle) -> String {
    let rows: Vec<Vec<String>> = habits
        .iter()
        .map(|h| {
            vec![
                h.id.to_string(),
                h.title.clone(),
                h.recurrence.to_string(),
                h.current_streak.to_string(),
                h.best_streak.to_string(),
                style.optional(h.last_completed_at),
                if h.active { "active" } else { "archived" }.to_string(),
            ]
        })
        .collect();
    render_table(
        &["ID", "TITLE", "SCHEDULE", "CURRENT", "BEST", "LAST DONE", "STATE"],
        &rows,
    )
}

pub fn streaks_table(streaks: &[HabitStreakOverview]) -> String {
    let rows: Vec<Vec<String>> = streaks
        .iter()
        .map(|s| {
            vec![
                s.title.clone(),
                s.frequency.to_string(),
                s.current_streak.to_string(),
                s.best_streak.to_string(),
            ]
        })
        .collect();
    render_table(&["TITLE", "FREQUENCY", "CURRENT", "BEST"], &rows)
}

pub fn due_table(due: &[DueHabit]) -> String {
    let rows: Vec<Vec<String>> = due
        .iter()
        .map(|d| {
            vec![
                if d.done { "[x]" } else { "[ ]" }.to_string(),
                d.habit.title.clone(),
                d.habit.current_streak.to_string(),
                d.habit.id.to_string(),
            ]
        })
        .collect();
    render_table(&["DONE", "TITLE", "STREAK", "ID"], &rows)
}

pub fn habit_detail(detail: &HabitDetail, style: &DateStyle) -> String {
    let habit = &detail.habit;
    let mut lines = vec![
        format!("{} ({})", habit.title, habit.id),
        format!("Schedule:     {}", habit.recurrence),
        format!("State:        {}", if habit.active { "active" } else { "archived" }),
        format!("Streak:       {} (best {})", habit.current_streak, habit.best_streak),
        format!("Last done:    {}", style.optional(habit.last_completed_at)),
    ];
    if detail.recent_completions.is_empty() {
        lines.push("No completions yet".to_string());
    } else {
        let dates: Vec<String> = detail
            .recent_completions
            .iter()
            .map(|c| style.date(c.date))
            .collect();
        lines.push(format!("Completions:  {}", dates.join(", ")));
    }
    lines.join("\n")
}

pub fn status_summary(status: &StatusSummary) -> String {
    let mut lines = vec![
        status.date_formatted.clone(),
        format!(
            "Habits: {}/{} done",
            status.habits_done_count, status.habits_due_count
        ),
    ];
    if let Some(best) = &status.best_active_streak {
        lines.push(format!("Best active streak: {} ({})", best.habit, best.streak));
    }
    if !status.habits_due.is_empty() {
        lines.push(String::new());
        lines.push(due_table(&status.habits_due));
    }
    lines.join("\n")
}
