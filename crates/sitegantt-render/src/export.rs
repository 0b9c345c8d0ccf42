//! Tabular export projection
//!
//! Flattens the schedule into spreadsheet rows: a short project header block
//! followed by one row per task (hidden rows included) with the name indented
//! by level.

use rust_decimal::Decimal;
use serde::Serialize;
use sitegantt_core::Schedule;
use sitegantt_engine::{ProjectBounds, TaskTree};

/// Column titles, in order
pub const COLUMNS: [&str; 9] = [
    "ID",
    "Task Mode",
    "Task Name",
    "Duration",
    "Start",
    "Finish",
    "Predecessors",
    "Resource Names",
    "Cost",
];

/// Column widths in characters, matching [`COLUMNS`]
pub const COLUMN_WIDTHS: [u16; 9] = [8, 15, 50, 12, 12, 12, 15, 30, 15];

/// Task mode written for every row
pub const TASK_MODE: &str = "Auto Scheduled";

const INDENT: &str = "    ";

/// One exported task line
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRow {
    pub id: String,
    pub task_mode: &'static str,
    /// Activity prefixed with four spaces per level
    pub name: String,
    pub duration: String,
    pub start: String,
    pub finish: String,
    pub predecessors: String,
    pub resources: String,
    pub cost: Decimal,
}

impl ExportRow {
    /// Cell texts in column order (cost as plain text)
    pub fn cells(&self) -> [String; 9] {
        [
            self.id.clone(),
            self.task_mode.to_string(),
            self.name.clone(),
            self.duration.clone(),
            self.start.clone(),
            self.finish.clone(),
            self.predecessors.clone(),
            self.resources.clone(),
            self.cost.to_string(),
        ]
    }
}

/// Project-level lines written above the task table
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportHeader {
    pub project: String,
    pub start: String,
    pub finish: String,
    pub total_duration: String,
}

impl ExportHeader {
    /// Label/value pairs in output order
    pub fn lines(&self) -> [(&'static str, &str); 4] {
        [
            ("Project:", self.project.as_str()),
            ("Start Date:", self.start.as_str()),
            ("Finish Date:", self.finish.as_str()),
            ("Total Duration:", self.total_duration.as_str()),
        ]
    }
}

/// Header plus task rows
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ExportTable {
    pub header: ExportHeader,
    pub rows: Vec<ExportRow>,
}

/// Projects a schedule into an [`ExportTable`]
#[derive(Clone, Debug)]
pub struct ExportProjector {
    /// chrono format string for date cells
    pub date_format: String,
}

impl Default for ExportProjector {
    fn default() -> Self {
        Self {
            date_format: "%Y-%m-%d".into(),
        }
    }
}

impl ExportProjector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the date format used for every date cell
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    pub fn project(&self, schedule: &Schedule) -> ExportTable {
        ExportTable {
            header: self.header(schedule),
            rows: self.rows(schedule),
        }
    }

    pub fn header(&self, schedule: &Schedule) -> ExportHeader {
        let bounds = ProjectBounds::of(&schedule.tasks);
        ExportHeader {
            project: schedule.project_name.clone(),
            start: bounds
                .map(|b| b.start.format(&self.date_format).to_string())
                .unwrap_or_default(),
            finish: bounds
                .map(|b| b.end.format(&self.date_format).to_string())
                .unwrap_or_default(),
            total_duration: format!("{} days", bounds.map_or(0, |b| b.duration_days())),
        }
    }

    /// Every task, in schedule order, with rolled-up cost
    pub fn rows(&self, schedule: &Schedule) -> Vec<ExportRow> {
        let tree = TaskTree::build(&schedule.tasks);
        let date = |d: Option<chrono::NaiveDate>| {
            d.map(|d| d.format(&self.date_format).to_string())
                .unwrap_or_default()
        };

        schedule
            .tasks
            .iter()
            .map(|task| ExportRow {
                id: task.task_id.to_string(),
                task_mode: TASK_MODE,
                name: format!("{}{}", INDENT.repeat(task.level()), task.activity),
                duration: format!("{} days", task.duration),
                start: date(task.start_date),
                finish: date(task.end_date),
                predecessors: task
                    .dependencies
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                resources: task.resources.clone(),
                cost: tree.rolled_up_cost(&task.task_id),
            })
            .collect()
    }
}

/// `Schedule_<project name with underscores>.xlsx`
pub fn default_file_name(project_name: &str) -> String {
    let stem = project_name.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        "Schedule.xlsx".to_string()
    } else {
        format!("Schedule_{stem}.xlsx")
    }
}
