//! # sitegantt-core
//!
//! Core domain model for the sitegantt construction schedule engine.
//!
//! This crate provides:
//! - Domain types: `ScheduleTask`, `Schedule`, `TaskPath`, `CollapseState`
//! - Oracle ingestion: lenient parsing of generated `scheduleItems` payloads
//! - Project settings consumed by the expansion step
//! - Error types and the `Renderer` trait
//!
//! ## Example
//!
//! ```rust
//! use sitegantt_core::{Schedule, ScheduleTask, TaskPath};
//!
//! let schedule = Schedule::new(
//!     "Office Block",
//!     "",
//!     vec![
//!         ScheduleTask::new("1.2", "Site Clearance"),
//!         ScheduleTask::new("1", "Preliminaries"),
//!         ScheduleTask::new("1.1", "Mobilisation"),
//!     ],
//! );
//! assert_eq!(schedule.tasks[0].task_id, TaskPath::parse("1"));
//! ```

pub mod collapse;
pub mod oracle;
pub mod path;

pub use collapse::CollapseState;
pub use path::{compare, Segment, TaskPath, FLOOR_PLACEHOLDER};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Schedule Task
// ============================================================================

/// One schedule line item, keyed by its hierarchical ID
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleTask {
    /// Opaque bookkeeping identifier (not shown to users)
    #[serde(default = "new_task_uid", deserialize_with = "oracle::lenient_string")]
    pub id: String,
    /// WBS position key
    #[serde(default)]
    pub task_id: TaskPath,
    /// Human-readable name
    #[serde(default, deserialize_with = "oracle::lenient_string")]
    pub activity: String,
    /// Classification tag (not used for hierarchy)
    #[serde(default, deserialize_with = "oracle::lenient_string")]
    pub category: String,
    /// Informational duration in days; the date pair drives rendering
    #[serde(default, deserialize_with = "oracle::lenient_days")]
    pub duration: i64,
    #[serde(default, deserialize_with = "oracle::lenient_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "oracle::lenient_date")]
    pub end_date: Option<NaiveDate>,
    /// Predecessor task IDs
    #[serde(default, deserialize_with = "oracle::lenient_dependencies")]
    pub dependencies: Vec<TaskPath>,
    /// Free-text resource label
    #[serde(default, deserialize_with = "oracle::lenient_string")]
    pub resources: String,
    /// Leaf cost; summaries derive theirs by rollup
    #[serde(
        default,
        deserialize_with = "oracle::lenient_cost",
        skip_serializing_if = "Option::is_none"
    )]
    pub total_cost: Option<Decimal>,
    /// Percent complete (0-100)
    #[serde(default, deserialize_with = "oracle::lenient_progress")]
    pub progress: u8,
    /// Supplied by the oracle, never derived here
    #[serde(default, deserialize_with = "oracle::lenient_bool")]
    pub critical_path: bool,
    #[serde(
        default,
        deserialize_with = "oracle::lenient_optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<String>,
    /// Typical-floor template marker, replaced by concrete floors on expansion
    #[serde(default)]
    pub is_template: bool,
}

/// Fresh opaque identifier for a task record
pub fn new_task_uid() -> String {
    uuid::Uuid::new_v4().to_string()
}

impl ScheduleTask {
    /// Create a task with the given WBS ID and activity name
    pub fn new(task_id: impl Into<TaskPath>, activity: impl Into<String>) -> Self {
        let task_id = task_id.into();
        Self {
            id: new_task_uid(),
            is_template: task_id.has_placeholder(),
            task_id,
            activity: activity.into(),
            category: String::new(),
            duration: 1,
            start_date: None,
            end_date: None,
            dependencies: Vec::new(),
            resources: String::new(),
            total_cost: None,
            progress: 0,
            critical_path: false,
            notes: None,
        }
    }

    /// Set start and end dates
    pub fn dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    /// Set the informational duration in days
    pub fn duration(mut self, days: i64) -> Self {
        self.duration = days;
        self
    }

    /// Add a predecessor
    pub fn depends_on(mut self, predecessor: impl Into<TaskPath>) -> Self {
        self.dependencies.push(predecessor.into());
        self
    }

    /// Set the leaf cost
    pub fn cost(mut self, cost: impl Into<Decimal>) -> Self {
        self.total_cost = Some(cost.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn resources(mut self, resources: impl Into<String>) -> Self {
        self.resources = resources.into();
        self
    }

    /// Set percent complete, clamped to 100
    pub fn progress(mut self, pct: u8) -> Self {
        self.progress = pct.min(100);
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical_path = true;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Mark as a typical-floor template
    pub fn template(mut self) -> Self {
        self.is_template = true;
        self
    }

    /// Duration used for bar widths (never below one day)
    pub fn display_duration(&self) -> i64 {
        self.duration.max(1)
    }

    /// Nesting level (segment count minus one)
    pub fn level(&self) -> usize {
        self.task_id.depth()
    }

    /// Name-based template heuristic applied when the oracle gave no marker.
    /// A top-level phase is never a template whatever its name.
    pub fn looks_like_template(&self) -> bool {
        self.task_id.has_placeholder()
            || (self.task_id.depth() > 0 && self.activity.contains("Typical"))
    }
}

// ============================================================================
// Schedule
// ============================================================================

/// A generated schedule: project header plus its task list
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub summary: String,
    /// Tasks in display order
    #[serde(rename = "scheduleItems", default)]
    pub tasks: Vec<ScheduleTask>,
}

impl Schedule {
    /// Create a schedule, sorting tasks into display order
    pub fn new(
        project_name: impl Into<String>,
        summary: impl Into<String>,
        tasks: Vec<ScheduleTask>,
    ) -> Self {
        let mut schedule = Self {
            project_name: project_name.into(),
            summary: summary.into(),
            tasks,
        };
        schedule.sort_tasks();
        schedule
    }

    /// Stable numeric sort by task ID
    pub fn sort_tasks(&mut self) {
        sort_by_task_id(&mut self.tasks);
    }

    /// Find a task by WBS ID
    pub fn get(&self, task_id: &TaskPath) -> Option<&ScheduleTask> {
        self.tasks.iter().find(|t| &t.task_id == task_id)
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

/// Stable sort into display order
pub fn sort_by_task_id(tasks: &mut [ScheduleTask]) {
    tasks.sort_by(|a, b| a.task_id.display_cmp(&b.task_id));
}

// ============================================================================
// Project Settings
// ============================================================================

/// Kind of project being scheduled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    #[default]
    Building,
    Infrastructure,
}

/// Granularity the oracle was asked for
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    /// Phases and milestones only
    Master,
    /// Full WBS with typical-floor templates
    #[default]
    Detail,
}

/// Project parameters that gate and drive floor expansion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub project_type: ProjectType,
    pub detail_level: DetailLevel,
    /// Number of typical floors to generate
    pub floor_count: u32,
    /// Passed to the prompt layer; expansion does not read it
    pub basement_count: u32,
    /// Fallback anchor when the schedule has no substructure phase
    pub start_date: Option<NaiveDate>,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            project_type: ProjectType::Building,
            detail_level: DetailLevel::Detail,
            floor_count: 1,
            basement_count: 0,
            start_date: None,
        }
    }
}

impl ProjectSettings {
    /// Floor expansion only applies to detailed building schedules
    pub fn expands_floors(&self) -> bool {
        self.project_type == ProjectType::Building
            && self.detail_level == DetailLevel::Detail
            && self.floor_count > 0
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering
pub trait Renderer {
    type Output;

    /// Render a schedule with the given outline state
    fn render(
        &self,
        schedule: &Schedule,
        collapsed: &CollapseState,
    ) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Oracle payload could not be read at all
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Schedule payload must be a JSON object")]
    NotAnObject,
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn task_builder() {
        let task = ScheduleTask::new("2.1", "Excavation")
            .dates(date(2025, 1, 1), date(2025, 1, 5))
            .duration(4)
            .depends_on("1.3")
            .cost(1200)
            .progress(140)
            .critical();

        assert_eq!(task.task_id, TaskPath::parse("2.1"));
        assert_eq!(task.level(), 1);
        assert_eq!(task.dependencies, vec![TaskPath::parse("1.3")]);
        assert_eq!(task.total_cost, Some(Decimal::from(1200)));
        assert_eq!(task.progress, 100);
        assert!(task.critical_path);
        assert!(!task.is_template);
    }

    #[test]
    fn zero_duration_clamped_for_display() {
        let task = ScheduleTask::new("1", "Handover").duration(0);
        assert_eq!(task.duration, 0);
        assert_eq!(task.display_duration(), 1);
    }

    #[test]
    fn placeholder_ids_are_templates() {
        assert!(ScheduleTask::new("3.X.1", "Columns").is_template);
        assert!(ScheduleTask::new("3.4", "Typical Floor Slab").looks_like_template());
        assert!(!ScheduleTask::new("3.4", "Roof Slab").looks_like_template());
        assert!(!ScheduleTask::new("3", "Superstructure (Typical Floors)").looks_like_template());
    }

    #[test]
    fn schedule_sorts_numerically() {
        let schedule = Schedule::new(
            "Test",
            "",
            vec![
                ScheduleTask::new("3.10", "c"),
                ScheduleTask::new("3.2", "b"),
                ScheduleTask::new("3", "a"),
            ],
        );
        let ids: Vec<String> = schedule.tasks.iter().map(|t| t.task_id.to_string()).collect();
        assert_eq!(ids, vec!["3", "3.2", "3.10"]);
        assert!(schedule.get(&"3.2".into()).is_some());
    }

    #[test]
    fn settings_gate_expansion() {
        let mut settings = ProjectSettings::default();
        assert!(settings.expands_floors());
        settings.project_type = ProjectType::Infrastructure;
        assert!(!settings.expands_floors());
        settings.project_type = ProjectType::Building;
        settings.detail_level = DetailLevel::Master;
        assert!(!settings.expands_floors());
        settings.detail_level = DetailLevel::Detail;
        settings.floor_count = 0;
        assert!(!settings.expands_floors());
    }
}
