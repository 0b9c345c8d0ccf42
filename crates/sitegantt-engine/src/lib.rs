//! # sitegantt-engine
//!
//! Schedule synthesis over a flat, generated task list.
//!
//! This crate provides:
//! - WBS tree reconstruction from hierarchical IDs, with cost rollup
//! - Outline rows with visibility under a collapse set
//! - Typical-floor template expansion
//! - Project bounds and rigid whole-project date shift
//! - `ScheduleSession`, the interactive model tying these together
//!
//! ## Example
//!
//! ```rust,ignore
//! use sitegantt_core::{oracle, ProjectSettings};
//! use sitegantt_engine::{ExpansionConfig, ScheduleSession};
//!
//! let schedule = oracle::read_response("response.json")?;
//! let settings = ProjectSettings { floor_count: 8, ..Default::default() };
//! let (mut session, report) =
//!     ScheduleSession::from_generated(schedule, &settings, &ExpansionConfig::default());
//! session.collapse_all();
//! ```

pub mod expansion;
pub mod rows;
pub mod session;
pub mod shift;
pub mod tree;

pub use expansion::{expand_for_project, ExpansionConfig, ExpansionReport, FloorExpander};
pub use rows::{project_rows, visible_rows, TaskRow};
pub use session::ScheduleSession;
pub use shift::{shift_delta, shift_project, Boundary, ProjectBounds};
pub use tree::{TaskNode, TaskTree};
