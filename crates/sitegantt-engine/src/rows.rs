//! Render-ready outline rows
//!
//! One [`TaskRow`] per task in display order, carrying the derived
//! attributes a Gantt or table view needs. Hidden rows are still produced
//! (export uses them); use [`visible_rows`] for the on-screen list.

use crate::tree::TaskTree;
use rust_decimal::Decimal;
use serde::Serialize;
use sitegantt_core::{CollapseState, ScheduleTask};

/// A task plus its per-render derived attributes
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRow<'a> {
    pub task: &'a ScheduleTask,
    /// Segment count minus one
    pub level: usize,
    pub is_summary: bool,
    pub has_children: bool,
    /// No collapsed ancestor
    pub is_visible: bool,
    /// The row itself is folded (children hidden)
    pub is_collapsed: bool,
    pub rolled_up_cost: Decimal,
}

/// Derive one row per task, keeping input order
pub fn project_rows<'a>(tasks: &'a [ScheduleTask], collapsed: &CollapseState) -> Vec<TaskRow<'a>> {
    let tree = TaskTree::build(tasks);
    rows_from_tree(&tree, tasks, collapsed)
}

/// Same as [`project_rows`] for callers that already hold the tree
pub fn rows_from_tree<'a>(
    tree: &TaskTree<'a>,
    tasks: &'a [ScheduleTask],
    collapsed: &CollapseState,
) -> Vec<TaskRow<'a>> {
    tasks
        .iter()
        .map(|task| {
            let id = &task.task_id;
            let is_summary = tree.is_summary(id);
            TaskRow {
                task,
                level: task.level(),
                is_summary,
                has_children: is_summary,
                is_visible: !collapsed.hides(id),
                is_collapsed: is_summary && collapsed.is_collapsed(id),
                rolled_up_cost: tree.rolled_up_cost(id),
            }
        })
        .collect()
}

/// Rows with no collapsed ancestor, in display order
pub fn visible_rows<'a>(tasks: &'a [ScheduleTask], collapsed: &CollapseState) -> Vec<TaskRow<'a>> {
    project_rows(tasks, collapsed)
        .into_iter()
        .filter(|row| row.is_visible)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sitegantt_core::TaskPath;

    fn outline() -> Vec<ScheduleTask> {
        vec![
            ScheduleTask::new("1", "Prelims"),
            ScheduleTask::new("1.1", "Mobilise").cost(10),
            ScheduleTask::new("2", "Substructure"),
            ScheduleTask::new("2.1", "Piling"),
            ScheduleTask::new("2.1.1", "Test piles").cost(5),
            ScheduleTask::new("2.2", "Ground beams").cost(7),
        ]
    }

    fn visible_ids(tasks: &[ScheduleTask], state: &CollapseState) -> Vec<String> {
        visible_rows(tasks, state)
            .iter()
            .map(|r| r.task.task_id.to_string())
            .collect()
    }

    #[test]
    fn derived_attributes() {
        let tasks = outline();
        let rows = project_rows(&tasks, &CollapseState::new());
        let piling = &rows[3];
        assert_eq!(piling.level, 1);
        assert!(piling.is_summary);
        assert!(piling.is_visible);
        assert_eq!(piling.rolled_up_cost, Decimal::from(5));
        assert_eq!(rows[2].rolled_up_cost, Decimal::from(12));
        assert!(!rows[5].has_children);
    }

    #[test]
    fn collapsed_branch_hides_descendants_only() {
        let tasks = outline();
        let mut state = CollapseState::new();
        state.toggle(&TaskPath::from("2"));
        assert_eq!(visible_ids(&tasks, &state), vec!["1", "1.1", "2"]);

        let rows = project_rows(&tasks, &state);
        assert!(rows[2].is_collapsed);
        assert_eq!(rows.len(), tasks.len());
    }

    #[test]
    fn collapsing_a_leaf_changes_nothing() {
        let tasks = outline();
        let before = visible_ids(&tasks, &CollapseState::new());
        let state: CollapseState = [TaskPath::from("2.2")].into_iter().collect();
        assert_eq!(visible_ids(&tasks, &state), before);
        assert!(!project_rows(&tasks, &state)[5].is_collapsed);
    }
}
