//! WBS tree reconstruction and cost rollup
//!
//! The oracle returns a flat list. Parentage is implied by the ID alone:
//! `"3.2.1"` belongs to `"3.2"` if, and only if, a task with exactly that ID
//! exists. Children whose parent is missing stay unlinked (orphans keep their
//! nominal depth but get no collapse affordance).
//!
//! Rollup is recomputed on demand. Parent IDs are strictly shorter than their
//! children's, so recursion always terminates.

use rust_decimal::Decimal;
use sitegantt_core::{ScheduleTask, TaskPath};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A task plus the IDs of its direct children, in input order
#[derive(Clone, Debug)]
pub struct TaskNode<'a> {
    pub task: &'a ScheduleTask,
    pub children: Vec<TaskPath>,
}

/// Parent/child lookup over a flat task list
#[derive(Clone, Debug, Default)]
pub struct TaskTree<'a> {
    nodes: HashMap<TaskPath, TaskNode<'a>>,
    order: Vec<TaskPath>,
}

impl<'a> TaskTree<'a> {
    /// Build the lookup. The first record wins when IDs repeat.
    pub fn build(tasks: &'a [ScheduleTask]) -> Self {
        let mut nodes: HashMap<TaskPath, TaskNode<'a>> = HashMap::with_capacity(tasks.len());
        let mut order = Vec::with_capacity(tasks.len());

        for task in tasks {
            if nodes.contains_key(&task.task_id) {
                warn!(task_id = %task.task_id, "duplicate task ID; keeping the first record");
                continue;
            }
            nodes.insert(
                task.task_id.clone(),
                TaskNode {
                    task,
                    children: Vec::new(),
                },
            );
            order.push(task.task_id.clone());
        }

        let mut orphans = 0usize;
        for id in &order {
            let Some(parent_id) = id.parent() else {
                continue;
            };
            match nodes.get_mut(&parent_id) {
                Some(parent) => parent.children.push(id.clone()),
                None => orphans += 1,
            }
        }

        debug!(tasks = order.len(), orphans, "built task tree");
        Self { nodes, order }
    }

    pub fn get(&self, id: &TaskPath) -> Option<&TaskNode<'a>> {
        self.nodes.get(id)
    }

    /// Direct children (empty for leaves and unknown IDs)
    pub fn children(&self, id: &TaskPath) -> &[TaskPath] {
        self.nodes.get(id).map_or(&[], |n| n.children.as_slice())
    }

    pub fn is_summary(&self, id: &TaskPath) -> bool {
        !self.children(id).is_empty()
    }

    /// IDs of every task with at least one child, in input order
    pub fn summary_ids(&self) -> impl Iterator<Item = &TaskPath> + '_ {
        self.order.iter().filter(|id| self.is_summary(id))
    }

    /// Leaf cost, or the sum over children for summaries. Unknown IDs cost 0.
    pub fn rolled_up_cost(&self, id: &TaskPath) -> Decimal {
        let Some(node) = self.nodes.get(id) else {
            return Decimal::ZERO;
        };
        if node.children.is_empty() {
            return node.task.total_cost.unwrap_or(Decimal::ZERO);
        }
        node.children
            .iter()
            .map(|child| self.rolled_up_cost(child))
            .sum()
    }

    /// Sum of rolled-up cost over top-level and orphaned rows
    pub fn total_cost(&self) -> Decimal {
        self.order
            .iter()
            .filter(|id| id.parent().map_or(true, |p| !self.nodes.contains_key(&p)))
            .map(|id| self.rolled_up_cost(id))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
