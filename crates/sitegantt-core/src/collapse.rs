//! Collapse state for the Gantt outline
//!
//! The set of summary rows the user has folded. A task is hidden when any
//! proper ancestor is in the set; its own membership never hides it.

use crate::TaskPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollapseState {
    collapsed: BTreeSet<TaskPath>,
}

impl CollapseState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip membership; returns `true` if the path is now collapsed
    pub fn toggle(&mut self, path: &TaskPath) -> bool {
        if self.collapsed.remove(path) {
            false
        } else {
            self.collapsed.insert(path.clone());
            true
        }
    }

    pub fn collapse(&mut self, path: TaskPath) {
        self.collapsed.insert(path);
    }

    pub fn expand_all(&mut self) {
        self.collapsed.clear();
    }

    /// Replace the set with exactly the given summary IDs
    pub fn collapse_all<I>(&mut self, summary_ids: I)
    where
        I: IntoIterator<Item = TaskPath>,
    {
        self.collapsed = summary_ids.into_iter().collect();
    }

    pub fn is_collapsed(&self, path: &TaskPath) -> bool {
        self.collapsed.contains(path)
    }

    /// True when a collapsed ancestor hides `path`
    pub fn hides(&self, path: &TaskPath) -> bool {
        !self.collapsed.is_empty() && path.ancestors().any(|a| self.collapsed.contains(&a))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TaskPath> {
        self.collapsed.iter()
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }
}

impl FromIterator<TaskPath> for CollapseState {
    fn from_iter<I: IntoIterator<Item = TaskPath>>(iter: I) -> Self {
        Self {
            collapsed: iter.into_iter().collect(),
        }
    }
}
