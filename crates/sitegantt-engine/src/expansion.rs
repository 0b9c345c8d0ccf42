//! Typical-floor template expansion
//!
//! Generated building schedules describe one generic floor under `3.X`.
//! [`FloorExpander`] replaces that template with one concrete sub-tree per
//! floor:
//!
//! 1. Anchor the first floor at the latest substructure (phase 2) end.
//! 2. Per floor `f`, synthesize summary `3.f` and clone every template task
//!    with `X` replaced by `f`, offset by `(f - 1) * stagger` days.
//! 3. Chain structural work vertically (floor `f` columns wait for floor
//!    `f - 1` columns).
//! 4. Push envelope/external phases (4+) past the last slab pour.
//!
//! Expansion is idempotent: its output carries no template tasks, so a
//! second pass finds nothing to do.

use crate::shift::{add_days, days_between};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitegantt_core::{
    new_task_uid, sort_by_task_id, ProjectSettings, ScheduleTask, Segment, TaskPath,
};
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Category given to generated structure tasks
pub const STRUCTURE_CATEGORY: &str = "Superstructure";

/// Note attached to synthesized floor summaries
pub const GENERATED_NOTE: &str = "Generated by high-rise floor cycle";

// ============================================================================
// Configuration
// ============================================================================

/// Expansion parameters. The day constants are planning heuristics, not
/// derived from the template's own durations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpansionConfig {
    /// Floors to generate
    pub floor_count: u32,
    /// Calendar days between consecutive floor starts
    pub floor_stagger_days: i64,
    /// Nominal span of each synthesized floor summary
    pub floor_window_days: i64,
    /// Gap between the last slab and the first post-structure task
    pub post_phase_buffer_days: i64,
    /// Top-level ID holding the template (`3`)
    pub structure_phase: u64,
    /// Top-level ID whose end anchors floor 1 (`2`)
    pub substructure_phase: u64,
    /// Lowest top-level ID pushed past the structure (`4`)
    pub first_post_phase: u64,
    /// Anchor used when no substructure task has an end date
    pub project_start: Option<NaiveDate>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            floor_count: 1,
            floor_stagger_days: 7,
            floor_window_days: 30,
            post_phase_buffer_days: 7,
            structure_phase: 3,
            substructure_phase: 2,
            first_post_phase: 4,
            project_start: None,
        }
    }
}

impl ExpansionConfig {
    pub fn new(floor_count: u32) -> Self {
        Self {
            floor_count,
            ..Self::default()
        }
    }

    /// Defaults with the floor count and anchor taken from project settings
    pub fn from_settings(settings: &ProjectSettings) -> Self {
        Self::default().with_settings(settings)
    }

    /// Overlay the project's floor count and start date
    pub fn with_settings(mut self, settings: &ProjectSettings) -> Self {
        self.floor_count = settings.floor_count;
        if settings.start_date.is_some() {
            self.project_start = settings.start_date;
        }
        self
    }

    pub fn floor_stagger(mut self, days: i64) -> Self {
        self.floor_stagger_days = days;
        self
    }

    pub fn floor_window(mut self, days: i64) -> Self {
        self.floor_window_days = days;
        self
    }

    pub fn post_phase_buffer(mut self, days: i64) -> Self {
        self.post_phase_buffer_days = days;
        self
    }

    pub fn project_start(mut self, date: NaiveDate) -> Self {
        self.project_start = Some(date);
        self
    }
}

// ============================================================================
// Report
// ============================================================================

/// What an expansion pass did
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExpansionReport {
    /// Template tasks cloned per floor (the `3.X` root is not counted)
    pub templates: usize,
    pub floors: u32,
    /// Concrete clones produced (`templates * floors` less any dropped ID collisions)
    pub cloned: usize,
    /// Floor summaries synthesized (`floors`)
    pub floor_summaries: usize,
    /// Floor 1 start date
    pub anchor: Option<NaiveDate>,
    /// Days added to every post-structure task (0 when none)
    pub post_shift_days: i64,
    /// A top-level structure summary was synthesized
    pub implicit_structure_summary: bool,
}

impl ExpansionReport {
    pub fn expanded(&self) -> bool {
        self.cloned > 0 || self.floor_summaries > 0
    }
}

// ============================================================================
// Expander
// ============================================================================

/// Replicates typical-floor templates across the configured floor count
#[derive(Clone, Debug, Default)]
pub struct FloorExpander {
    config: ExpansionConfig,
}

impl FloorExpander {
    pub fn new(config: ExpansionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExpansionConfig {
        &self.config
    }

    /// A task belongs to the template set when flagged or when its ID holds
    /// the floor placeholder. Top-level phases are never templates, so an
    /// oracle `3` named "Superstructure (Typical Floors)" stays a summary.
    pub fn is_template(task: &ScheduleTask) -> bool {
        (task.is_template || task.task_id.has_placeholder()) && task.task_id.depth() > 0
    }

    /// Expand templates, returning the new task list in display order.
    ///
    /// Input without template tasks comes back unchanged (sorted).
    pub fn expand(&self, tasks: &[ScheduleTask]) -> (Vec<ScheduleTask>, ExpansionReport) {
        let cfg = &self.config;
        let (templates, base): (Vec<&ScheduleTask>, Vec<&ScheduleTask>) =
            tasks.iter().partition(|t| Self::is_template(t));

        if templates.is_empty() {
            debug!("no template tasks; expansion skipped");
            return (sorted(tasks.to_vec()), ExpansionReport::default());
        }
        if cfg.floor_count == 0 {
            warn!(
                templates = templates.len(),
                "floor count is 0; template tasks left unexpanded"
            );
            return (sorted(tasks.to_vec()), ExpansionReport::default());
        }

        let mut templates = templates;
        templates.sort_by(|a, b| a.task_id.display_cmp(&b.task_id));
        // offsets are measured from the first template, the `3.X` root included
        let template_origin = templates.iter().find_map(|t| t.start_date);
        let anchor = self.anchor_date(&base, &templates, tasks);

        let templates: Vec<&ScheduleTask> = templates
            .into_iter()
            .filter(|t| !self.is_template_root(&t.task_id))
            .collect();
        for t in templates.iter().filter(|t| !t.task_id.has_placeholder()) {
            warn!(task_id = %t.task_id, activity = %t.activity, "template without floor placeholder; nesting it under each floor");
        }
        let template_ids: HashSet<&TaskPath> = templates.iter().map(|t| &t.task_id).collect();

        let mut generated = Vec::new();
        let mut seen: HashSet<TaskPath> = HashSet::new();
        let mut cloned = 0;
        for floor in 1..=u64::from(cfg.floor_count) {
            let floor_start = add_days(anchor, (floor as i64 - 1) * cfg.floor_stagger_days);
            let summary = self.floor_summary(floor, floor_start);
            seen.insert(summary.task_id.clone());
            generated.push(summary);
            for template in &templates {
                let task = self.clone_for_floor(
                    template,
                    floor,
                    floor_start,
                    template_origin,
                    &template_ids,
                );
                if !seen.insert(task.task_id.clone()) {
                    warn!(task_id = %task.task_id, template = %template.task_id, "generated ID already taken; clone dropped");
                    continue;
                }
                generated.push(task);
                cloned += 1;
            }
        }

        let mut report = ExpansionReport {
            templates: templates.len(),
            floors: cfg.floor_count,
            cloned,
            floor_summaries: cfg.floor_count as usize,
            anchor: Some(anchor),
            ..ExpansionReport::default()
        };

        let post_shift = self.post_phase_shift(&generated, &base);
        report.post_shift_days = post_shift;

        let structure_id = TaskPath::from_indices(&[cfg.structure_phase]);
        let has_structure_summary = base.iter().any(|t| t.task_id == structure_id);
        if !has_structure_summary {
            generated.push(self.structure_summary(anchor, &generated));
            report.implicit_structure_summary = true;
        }

        let generated_ids: HashSet<TaskPath> =
            generated.iter().map(|t| t.task_id.clone()).collect();
        let mut result: Vec<ScheduleTask> = base
            .into_iter()
            .filter(|t| {
                let replaced = generated_ids.contains(&t.task_id);
                if replaced {
                    debug!(task_id = %t.task_id, "base task replaced by generated floor task");
                }
                !replaced
            })
            .map(|t| self.shifted_if_post_phase(t, post_shift))
            .collect();
        result.extend(generated);

        info!(
            floors = report.floors,
            cloned = report.cloned,
            summaries = report.floor_summaries,
            post_shift_days = report.post_shift_days,
            "expanded typical floor template"
        );
        (sorted(result), report)
    }

    /// `3.X` itself: replaced by the synthesized per-floor summaries
    fn is_template_root(&self, id: &TaskPath) -> bool {
        matches!(
            id.segments(),
            [Segment::Index(phase), Segment::FloorPlaceholder] if *phase == self.config.structure_phase
        )
    }

    fn anchor_date(
        &self,
        base: &[&ScheduleTask],
        templates: &[&ScheduleTask],
        all: &[ScheduleTask],
    ) -> NaiveDate {
        let substructure_end = base
            .iter()
            .filter(|t| t.task_id.top_level() == Some(self.config.substructure_phase))
            .filter_map(|t| t.end_date)
            .max();
        substructure_end
            .or(self.config.project_start)
            .or_else(|| templates.iter().find_map(|t| t.start_date))
            .or_else(|| all.iter().filter_map(|t| t.start_date).min())
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    fn floor_summary_id(&self, floor: u64) -> TaskPath {
        TaskPath::from_indices(&[self.config.structure_phase, floor])
    }

    fn floor_summary(&self, floor: u64, floor_start: NaiveDate) -> ScheduleTask {
        let window = self.config.floor_window_days;
        let mut summary = ScheduleTask::new(
            self.floor_summary_id(floor),
            format!("Floor {floor} (Level {floor})"),
        )
        .dates(floor_start, add_days(floor_start, window))
        .duration(window)
        .category(STRUCTURE_CATEGORY)
        .critical()
        .notes(GENERATED_NOTE);
        if floor > 1 {
            summary = summary.depends_on(self.floor_summary_id(floor - 1));
        }
        summary
    }

    fn concrete_id(&self, template_id: &TaskPath, floor: u64) -> TaskPath {
        if template_id.has_placeholder() {
            template_id.with_floor(floor)
        } else {
            template_id.rebased_under_floor(floor)
        }
    }

    fn clone_for_floor(
        &self,
        template: &ScheduleTask,
        floor: u64,
        floor_start: NaiveDate,
        template_origin: Option<NaiveDate>,
        template_ids: &HashSet<&TaskPath>,
    ) -> ScheduleTask {
        let mut task = template.clone();
        task.id = new_task_uid();
        task.is_template = false;
        task.task_id = self.concrete_id(&template.task_id, floor);
        task.activity = template
            .activity
            .replace("Typical Floor", &format!("Floor {floor}"))
            .replace("Level X", &format!("Level {floor}"));

        let offset = match (template.start_date, template_origin) {
            (Some(start), Some(origin)) => days_between(origin, start),
            _ => 0,
        };
        let start = add_days(floor_start, offset);
        let span = match (template.start_date, template.end_date) {
            (Some(s), Some(e)) => days_between(s, e),
            _ => template.duration,
        };
        task.start_date = Some(start);
        task.end_date = Some(add_days(start, span));

        task.dependencies = template
            .dependencies
            .iter()
            .map(|dep| {
                if dep.has_placeholder() || template_ids.contains(dep) {
                    self.concrete_id(dep, floor)
                } else {
                    dep.clone()
                }
            })
            .collect();

        if floor > 1 && (task.activity.contains("Column") || task.activity.contains("Slab")) {
            let below = self.concrete_id(&template.task_id, floor - 1);
            if !task.dependencies.contains(&below) {
                task.dependencies.push(below);
            }
        }
        task
    }

    /// Days to push phases 4+ so they start after the last slab/concrete end
    fn post_phase_shift(&self, generated: &[ScheduleTask], base: &[&ScheduleTask]) -> i64 {
        let structure_end = generated
            .iter()
            .filter(|t| t.activity.contains("Slab") || t.activity.contains("Concrete"))
            .filter_map(|t| t.end_date)
            .max();
        let first_post_start = base
            .iter()
            .filter(|t| self.is_post_phase(t))
            .filter_map(|t| t.start_date)
            .min();

        match (structure_end, first_post_start) {
            (Some(end), Some(start)) if end > start => {
                let shift = days_between(start, end) + self.config.post_phase_buffer_days;
                debug!(%end, %start, shift, "pushing post-structure phases");
                shift
            }
            _ => 0,
        }
    }

    fn is_post_phase(&self, task: &ScheduleTask) -> bool {
        task.task_id
            .top_level()
            .is_some_and(|phase| phase >= self.config.first_post_phase)
    }

    fn shifted_if_post_phase(&self, task: &ScheduleTask, days: i64) -> ScheduleTask {
        let mut task = task.clone();
        if days != 0 && self.is_post_phase(&task) {
            task.start_date = task.start_date.map(|d| add_days(d, days));
            task.end_date = task.end_date.map(|d| add_days(d, days));
        }
        task
    }

    fn structure_summary(&self, anchor: NaiveDate, generated: &[ScheduleTask]) -> ScheduleTask {
        let end = generated
            .iter()
            .filter_map(|t| t.end_date)
            .max()
            .unwrap_or(anchor);
        let mut summary = ScheduleTask::new(
            TaskPath::from_indices(&[self.config.structure_phase]),
            STRUCTURE_CATEGORY,
        )
        .dates(anchor, end)
        .duration(days_between(anchor, end))
        .category(STRUCTURE_CATEGORY)
        .critical()
        .notes(GENERATED_NOTE);
        if self.config.substructure_phase > 0 {
            summary = summary.depends_on(TaskPath::from_indices(&[self.config.substructure_phase]));
        }
        summary
    }
}

fn sorted(mut tasks: Vec<ScheduleTask>) -> Vec<ScheduleTask> {
    sort_by_task_id(&mut tasks);
    tasks
}

/// Expand only when the project settings call for it (detailed building
/// schedules with at least one floor)
pub fn expand_for_project(
    tasks: &[ScheduleTask],
    settings: &ProjectSettings,
    config: &ExpansionConfig,
) -> (Vec<ScheduleTask>, ExpansionReport) {
    if !settings.expands_floors() {
        debug!(
            project_type = ?settings.project_type,
            detail_level = ?settings.detail_level,
            floors = settings.floor_count,
            "floor expansion not applicable"
        );
        return (sorted(tasks.to_vec()), ExpansionReport::default());
    }
    FloorExpander::new(config.clone().with_settings(settings)).expand(tasks)
}
