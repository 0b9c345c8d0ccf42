//! Project bounds and whole-project date shift
//!
//! A shift is a rigid translation: every start and end moves by the same
//! number of days, so spans and relative spacing are kept exactly. No
//! calendar or working-day checks happen here.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use sitegantt_core::ScheduleTask;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

/// `date + days`, saturating to `date` when the result is out of range
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days == 0 {
        return date;
    }
    match Duration::try_days(days).and_then(|delta| date.checked_add_signed(delta)) {
        Some(moved) => moved,
        None => {
            warn!(%date, days, "date out of range; left unshifted");
            date
        }
    }
}

/// Signed whole days from `from` to `to`
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

/// Earliest start and latest end across a task list
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProjectBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl ProjectBounds {
    /// `None` when no task carries the needed dates
    pub fn of(tasks: &[ScheduleTask]) -> Option<Self> {
        Some(Self {
            start: project_start(tasks)?,
            end: project_end(tasks)?,
        })
    }

    /// Calendar span in days (absolute)
    pub fn duration_days(&self) -> i64 {
        days_between(self.start, self.end).abs()
    }
}

/// Minimum start date, skipping tasks without one
pub fn project_start(tasks: &[ScheduleTask]) -> Option<NaiveDate> {
    tasks.iter().filter_map(|t| t.start_date).min()
}

/// Maximum end date, skipping tasks without one
pub fn project_end(tasks: &[ScheduleTask]) -> Option<NaiveDate> {
    tasks.iter().filter_map(|t| t.end_date).max()
}

/// Which project boundary a new date pins
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Boundary {
    #[default]
    Start,
    End,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

impl FromStr for Boundary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "end" | "finish" => Ok(Self::End),
            other => Err(format!("unknown boundary '{other}' (expected start or end)")),
        }
    }
}

/// Days needed to move the chosen boundary onto `target`.
///
/// `None` when the list has no date for that boundary.
pub fn shift_delta(tasks: &[ScheduleTask], target: NaiveDate, which: Boundary) -> Option<i64> {
    let current = match which {
        Boundary::Start => project_start(tasks)?,
        Boundary::End => project_end(tasks)?,
    };
    Some(days_between(current, target))
}

/// Translate every task so the chosen boundary lands on `target`.
///
/// Returns a new list; a zero delta (or no reference date) returns an
/// unchanged copy.
pub fn shift_project(tasks: &[ScheduleTask], target: NaiveDate, which: Boundary) -> Vec<ScheduleTask> {
    let delta = shift_delta(tasks, target, which).unwrap_or(0);
    if delta == 0 {
        debug!(%target, %which, "project shift is a no-op");
        return tasks.to_vec();
    }
    debug!(%target, %which, delta, "shifting project");
    shift_all(tasks, delta)
}

/// Add `days` to every start and end date
pub fn shift_all(tasks: &[ScheduleTask], days: i64) -> Vec<ScheduleTask> {
    tasks
        .iter()
        .map(|task| {
            let mut task = task.clone();
            task.start_date = task.start_date.map(|d| add_days(d, days));
            task.end_date = task.end_date.map(|d| add_days(d, days));
            task
        })
        .collect()
}
