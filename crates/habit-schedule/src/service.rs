//! Scheduling façade used by habit stores.
//!
//! This is the only layer that knows what day it is. Everything below it
//! takes the reference date as a parameter.

use crate::calendar;
use crate::recurrence::Recurrence;
use crate::streak::{calculate_streaks, CompletionLog, StreakResult};
use chrono::NaiveDate;

/// Source of the reference date.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        calendar::today()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// Anything with a recurrence, typically a stored habit record.
pub trait Scheduled {
    fn recurrence(&self) -> &Recurrence;
}

impl Scheduled for Recurrence {
    fn recurrence(&self) -> &Recurrence {
        self
    }
}

/// Answers "is it due today" and "what is the streak now" for a habit.
#[derive(Debug, Clone, Default)]
pub struct HabitScheduler<C = SystemClock> {
    clock: C,
}

impl HabitScheduler<SystemClock> {
    /// Scheduler on the local wall clock.
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> HabitScheduler<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }

    /// The reference date used by both operations.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn is_due_today<H: Scheduled + ?Sized>(&self, habit: &H) -> bool {
        habit.recurrence().is_due_on(self.today())
    }

    /// Streaks for `habit` after its completion log changed.
    ///
    /// Nothing is stored; the caller persists the result.
    pub fn recompute_streak<H: Scheduled + ?Sized>(
        &self,
        habit: &H,
        completions: &CompletionLog,
    ) -> StreakResult {
        calculate_streaks(completions, habit.recurrence(), self.today())
    }
}
