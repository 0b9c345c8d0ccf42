//! Gantt geometry and dependency routing
//!
//! Pure layout: maps visible rows to pixel bars and predecessor edges to
//! orthogonal polylines. Coordinates are relative to the chart area (origin
//! at the top-left of the first row, `x = 0` at the view start).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sitegantt_core::TaskPath;
use sitegantt_engine::shift::{add_days, days_between};
use sitegantt_engine::TaskRow;
use std::collections::HashMap;
use std::fmt::Write;

/// Timeline length used when no task carries a date
pub const EMPTY_TIMELINE_DAYS: i64 = 60;

/// Fixed rendering constants for the timeline
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GanttLayout {
    /// Pixels per calendar day
    pub day_width: f64,
    /// Pixels per row
    pub row_height: f64,
    /// Days shown before the earliest start
    pub lead_days: i64,
    /// Days shown after the latest end
    pub trailing_days: i64,
    /// Space left between an arrow tip and its target bar
    pub arrow_gap: f64,
    /// Horizontal run out of the predecessor before the first bend
    pub elbow_stub: f64,
    /// Vertical step used to route around a backward edge
    pub detour: f64,
}

impl Default for GanttLayout {
    fn default() -> Self {
        Self {
            day_width: 24.0,
            row_height: 32.0,
            lead_days: 7,
            trailing_days: 14,
            arrow_gap: 8.0,
            elbow_stub: 10.0,
            detour: 10.0,
        }
    }
}

impl GanttLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure pixels per day
    pub fn day_width(mut self, px: f64) -> Self {
        self.day_width = px;
        self
    }

    /// Configure row height
    pub fn row_height(mut self, px: f64) -> Self {
        self.row_height = px;
        self
    }

    pub fn lead_days(mut self, days: i64) -> Self {
        self.lead_days = days;
        self
    }

    pub fn trailing_days(mut self, days: i64) -> Self {
        self.trailing_days = days;
        self
    }

    /// Timeline origin: earliest start minus the lead, or `fallback` minus
    /// the lead when nothing is dated
    pub fn view_start(&self, rows: &[TaskRow<'_>], fallback: NaiveDate) -> NaiveDate {
        let earliest = rows.iter().filter_map(|r| r.task.start_date).min();
        add_days(earliest.unwrap_or(fallback), -self.lead_days)
    }

    /// Days covered from `view_start` through the last end plus the trailing
    /// margin
    pub fn total_days(&self, rows: &[TaskRow<'_>], view_start: NaiveDate) -> i64 {
        let last = rows
            .iter()
            .filter_map(|r| r.task.end_date)
            .max()
            .or_else(|| rows.iter().filter_map(|r| r.task.start_date).max());
        match last {
            Some(end) => (days_between(view_start, end) + self.trailing_days).max(1),
            None => EMPTY_TIMELINE_DAYS,
        }
    }

    /// Lay out `rows`. Bounds come from every row; only visible rows get
    /// bars and edges.
    pub fn compute(&self, rows: &[TaskRow<'_>]) -> GanttGeometry {
        self.compute_with_fallback(rows, chrono::Local::now().date_naive())
    }

    /// [`compute`](Self::compute) with an explicit origin for undated
    /// schedules
    pub fn compute_with_fallback(&self, rows: &[TaskRow<'_>], fallback: NaiveDate) -> GanttGeometry {
        let view_start = self.view_start(rows, fallback);
        let total_days = self.total_days(rows, view_start);

        let bars: Vec<Bar> = rows
            .iter()
            .filter(|r| r.is_visible)
            .enumerate()
            .map(|(index, row)| self.bar(row, index, view_start))
            .collect();
        let connectors = self.route(&bars, rows);

        GanttGeometry {
            view_start,
            total_days,
            width: total_days as f64 * self.day_width,
            height: bars.len() as f64 * self.row_height,
            bars,
            connectors,
        }
    }

    fn bar(&self, row: &TaskRow<'_>, index: usize, view_start: NaiveDate) -> Bar {
        let task = row.task;
        let offset = task
            .start_date
            .map_or(0, |start| days_between(view_start, start));
        Bar {
            task_id: task.task_id.clone(),
            label: task.activity.clone(),
            level: row.level,
            row: index,
            x: (offset as f64 * self.day_width).floor(),
            width: (task.display_duration() as f64 * self.day_width).floor(),
            y: index as f64 * self.row_height + self.row_height / 2.0,
            kind: if row.is_summary {
                BarKind::Summary
            } else {
                BarKind::Task {
                    progress: task.progress,
                    critical: task.critical_path,
                }
            },
        }
    }

    fn route(&self, bars: &[Bar], rows: &[TaskRow<'_>]) -> Vec<Connector> {
        let mut index: HashMap<&TaskPath, usize> = HashMap::with_capacity(bars.len());
        for (i, bar) in bars.iter().enumerate() {
            index.entry(&bar.task_id).or_insert(i);
        }

        let visible = rows.iter().filter(|r| r.is_visible);
        let mut connectors = Vec::new();
        for (target, row) in bars.iter().zip(visible) {
            for dep in &row.task.dependencies {
                let Some(&source) = index.get(dep) else {
                    continue;
                };
                let source = &bars[source];
                if source.task_id == target.task_id {
                    continue;
                }
                connectors.push(self.connector(source, target));
            }
        }
        connectors
    }

    /// Orthogonal path from the end of `source` into the start of `target`
    pub fn connector(&self, source: &Bar, target: &Bar) -> Connector {
        let (x1, y1) = (source.end_x(), source.y);
        let (x2, y2) = (target.x - self.arrow_gap, target.y);
        let bend = x1 + self.elbow_stub;

        let points = if x2 >= x1 {
            vec![(x1, y1), (bend, y1), (bend, y2), (x2, y2)]
        } else {
            let lane = y1 + self.detour;
            let entry = x2 - self.detour;
            vec![
                (x1, y1),
                (bend, y1),
                (bend, lane),
                (entry, lane),
                (entry, y2),
                (x2, y2),
            ]
        };

        Connector {
            from: source.task_id.clone(),
            to: target.task_id.clone(),
            points,
        }
    }
}

/// How a bar is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BarKind {
    /// Bracket spanning the children
    Summary,
    /// Filled bar with a progress overlay
    Task { progress: u8, critical: bool },
}

/// One visible row's horizontal span
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub task_id: TaskPath,
    pub label: String,
    pub level: usize,
    /// Position among visible rows
    pub row: usize,
    pub x: f64,
    pub width: f64,
    /// Vertical center of the row
    pub y: f64,
    pub kind: BarKind,
}

impl Bar {
    pub fn end_x(&self) -> f64 {
        self.x + self.width
    }

    /// Width of the progress overlay (0 for summaries)
    pub fn progress_width(&self) -> f64 {
        match self.kind {
            BarKind::Task { progress, .. } => self.width * f64::from(progress.min(100)) / 100.0,
            BarKind::Summary => 0.0,
        }
    }
}

/// Dependency edge as an orthogonal polyline
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Connector {
    pub from: TaskPath,
    pub to: TaskPath,
    pub points: Vec<(f64, f64)>,
}

impl Connector {
    /// Routed around the bars because the target starts left of the source end
    pub fn is_detour(&self) -> bool {
        self.points.len() > 4
    }

    /// SVG path data (`M x y L x y ...`)
    pub fn svg_path(&self) -> String {
        let mut d = String::new();
        for (i, (x, y)) in self.points.iter().enumerate() {
            let cmd = if i == 0 { 'M' } else { 'L' };
            if i > 0 {
                d.push(' ');
            }
            let _ = write!(d, "{cmd} {x} {y}");
        }
        d
    }
}

/// Complete layout for one render
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GanttGeometry {
    pub view_start: NaiveDate,
    pub total_days: i64,
    /// Chart area width in pixels
    pub width: f64,
    /// Chart area height in pixels
    pub height: f64,
    pub bars: Vec<Bar>,
    pub connectors: Vec<Connector>,
}

impl GanttGeometry {
    pub fn bar(&self, task_id: &TaskPath) -> Option<&Bar> {
        self.bars.iter().find(|b| &b.task_id == task_id)
    }

    /// Dates of every day column, starting at `view_start`
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.total_days).map(move |i| add_days(self.view_start, i))
    }
}
