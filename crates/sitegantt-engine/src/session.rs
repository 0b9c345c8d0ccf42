//! Interactive schedule model
//!
//! Owns the current task list and collapse set. Every mutation replaces the
//! task list wholesale; derived views (tree, rows, bounds) are recomputed
//! from scratch on each call.

use crate::expansion::{expand_for_project, ExpansionConfig, ExpansionReport};
use crate::rows::{rows_from_tree, TaskRow};
use crate::shift::{self, Boundary, ProjectBounds};
use crate::tree::TaskTree;
use chrono::NaiveDate;
use sitegantt_core::{CollapseState, ProjectSettings, Schedule, TaskPath};
use tracing::debug;

#[derive(Clone, Debug, Default)]
pub struct ScheduleSession {
    schedule: Schedule,
    collapsed: CollapseState,
}

impl ScheduleSession {
    /// Wrap a schedule as-is (tasks are re-sorted into display order)
    pub fn new(mut schedule: Schedule) -> Self {
        schedule.sort_tasks();
        Self {
            schedule,
            collapsed: CollapseState::new(),
        }
    }

    /// Load a freshly generated schedule, running floor expansion once
    pub fn from_generated(
        schedule: Schedule,
        settings: &ProjectSettings,
        config: &ExpansionConfig,
    ) -> (Self, ExpansionReport) {
        let (tasks, report) = expand_for_project(&schedule.tasks, settings, config);
        let schedule = Schedule {
            tasks,
            ..schedule
        };
        (Self::new(schedule), report)
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn into_schedule(self) -> Schedule {
        self.schedule
    }

    pub fn collapsed(&self) -> &CollapseState {
        &self.collapsed
    }

    pub fn tree(&self) -> TaskTree<'_> {
        TaskTree::build(&self.schedule.tasks)
    }

    /// Every row, hidden ones included
    pub fn rows(&self) -> Vec<TaskRow<'_>> {
        rows_from_tree(&self.tree(), &self.schedule.tasks, &self.collapsed)
    }

    pub fn visible_rows(&self) -> Vec<TaskRow<'_>> {
        self.rows().into_iter().filter(|r| r.is_visible).collect()
    }

    pub fn bounds(&self) -> Option<ProjectBounds> {
        ProjectBounds::of(&self.schedule.tasks)
    }

    /// Returns `true` if the task is now collapsed
    pub fn toggle_collapse(&mut self, task_id: &TaskPath) -> bool {
        self.collapsed.toggle(task_id)
    }

    pub fn expand_all(&mut self) {
        self.collapsed.expand_all();
    }

    /// Collapse every summary task, at every depth
    pub fn collapse_all(&mut self) {
        let summaries: Vec<TaskPath> = self.tree().summary_ids().cloned().collect();
        debug!(summaries = summaries.len(), "collapsing all summaries");
        self.collapsed.collapse_all(summaries);
    }

    /// Move the whole project so `which` lands on `target`; returns the delta
    /// in days (0 when nothing moved)
    pub fn shift_project(&mut self, target: NaiveDate, which: Boundary) -> i64 {
        let delta = shift::shift_delta(&self.schedule.tasks, target, which).unwrap_or(0);
        if delta != 0 {
            self.schedule.tasks = shift::shift_all(&self.schedule.tasks, delta);
        }
        delta
    }
}
