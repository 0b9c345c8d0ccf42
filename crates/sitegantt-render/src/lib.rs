//! # sitegantt-render
//!
//! Rendering backends for sitegantt schedules.
//!
//! This crate provides:
//! - Gantt geometry and orthogonal dependency routing
//! - SVG Gantt chart rendering
//! - Export projection (indented rows plus project header)
//! - XLSX schedule export
//!
//! ## Example
//!
//! ```rust,ignore
//! use sitegantt_core::{CollapseState, Renderer};
//! use sitegantt_render::{ExcelExporter, SvgGanttRenderer};
//!
//! let svg = SvgGanttRenderer::new().render(&schedule, &CollapseState::new())?;
//! let xlsx_bytes = ExcelExporter::new().export(&schedule)?;
//! std::fs::write("schedule.xlsx", xlsx_bytes)?;
//! ```

pub mod excel;
pub mod export;
pub mod geometry;

pub use excel::ExcelExporter;
pub use export::{default_file_name, ExportHeader, ExportProjector, ExportRow, ExportTable};
pub use geometry::{Bar, BarKind, Connector, GanttGeometry, GanttLayout};

use chrono::{Datelike, NaiveDate, Weekday};
use sitegantt_core::{CollapseState, RenderError, Renderer, Schedule};
use sitegantt_engine::project_rows;
use svg::node::element::{Definitions, Group, Line, Marker, Path, Polygon, Rectangle, Text};
use svg::Document;

/// SVG Gantt chart renderer configuration
#[derive(Clone, Debug)]
pub struct SvgGanttRenderer {
    /// Timeline geometry
    pub layout: GanttLayout,
    /// Width of the task name column in pixels
    pub label_width: u32,
    /// Header height in pixels
    pub header_height: u32,
    /// Indent per outline level in the name column
    pub indent: u32,
    /// Color for critical path tasks
    pub critical_color: String,
    /// Color for normal tasks
    pub normal_color: String,
    /// Color for summary brackets
    pub summary_color: String,
    /// Dependency arrow color
    pub connector_color: String,
    /// Weekend column shading
    pub weekend_color: String,
    /// Background color
    pub background_color: String,
    /// Grid line color
    pub grid_color: String,
    /// Text color
    pub text_color: String,
    /// Font family
    pub font_family: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Undated schedules are drawn from here (today when unset)
    pub fallback_start: Option<NaiveDate>,
}

impl Default for SvgGanttRenderer {
    fn default() -> Self {
        Self {
            layout: GanttLayout::default(),
            label_width: 280,
            header_height: 48,
            indent: 14,
            critical_color: "#e74c3c".into(),
            normal_color: "#3498db".into(),
            summary_color: "#2c3e50".into(),
            connector_color: "#94a3b8".into(),
            weekend_color: "#f1f5f9".into(),
            background_color: "#ffffff".into(),
            grid_color: "#ecf0f1".into(),
            text_color: "#2c3e50".into(),
            font_family: "system-ui, -apple-system, sans-serif".into(),
            font_size: 12,
            fallback_start: None,
        }
    }
}

impl SvgGanttRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom timeline layout
    pub fn layout(mut self, layout: GanttLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Configure the name column width
    pub fn label_width(mut self, width: u32) -> Self {
        self.label_width = width;
        self
    }

    /// Origin for schedules without any dates
    pub fn fallback_start(mut self, date: NaiveDate) -> Self {
        self.fallback_start = Some(date);
        self
    }

    fn chart_x(&self) -> f64 {
        f64::from(self.label_width)
    }

    fn chart_y(&self) -> f64 {
        f64::from(self.header_height)
    }

    /// Week labels along the top and weekend shading down the chart
    fn render_timeline(&self, geometry: &GanttGeometry) -> Group {
        let mut group = Group::new().set("class", "timeline");
        let day_width = self.layout.day_width;
        let bottom = self.chart_y() + geometry.height;

        for (i, day) in geometry.days().enumerate() {
            let x = self.chart_x() + i as f64 * day_width;

            if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                let shade = Rectangle::new()
                    .set("x", x)
                    .set("y", self.chart_y())
                    .set("width", day_width)
                    .set("height", geometry.height)
                    .set("fill", self.weekend_color.as_str());
                group = group.add(shade);
            }

            if i % 7 == 0 {
                let tick = Line::new()
                    .set("x1", x)
                    .set("y1", self.chart_y() - 8.0)
                    .set("x2", x)
                    .set("y2", bottom)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 1);
                group = group.add(tick);

                let label = Text::new(day.format("%b %d, %y").to_string())
                    .set("x", x + 4.0)
                    .set("y", self.chart_y() - 14.0)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.font_size - 1)
                    .set("fill", self.text_color.as_str());
                group = group.add(label);
            }
        }

        group
    }

    /// Row separators and indented task names
    fn render_labels(&self, geometry: &GanttGeometry) -> Group {
        let mut group = Group::new().set("class", "labels");
        let right = self.chart_x() + geometry.width;
        let row_height = self.layout.row_height;

        for bar in &geometry.bars {
            let top = self.chart_y() + bar.row as f64 * row_height;
            let separator = Line::new()
                .set("x1", 0)
                .set("y1", top + row_height)
                .set("x2", right)
                .set("y2", top + row_height)
                .set("stroke", self.grid_color.as_str())
                .set("stroke-width", 1);
            group = group.add(separator);

            let x = 8 + self.indent * bar.level as u32;
            let mut text = Text::new(format!("{}  {}", bar.task_id, truncate(&bar.label, 36)))
                .set("x", x)
                .set("y", self.chart_y() + bar.y + 4.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.font_size)
                .set("fill", self.text_color.as_str());
            if bar.kind == BarKind::Summary {
                text = text.set("font-weight", "bold");
            }
            group = group.add(text);
        }

        group
    }

    fn render_bar(&self, bar: &Bar) -> Group {
        let mut group = Group::new()
            .set("class", "task")
            .set("data-task-id", bar.task_id.to_string());
        let x = self.chart_x() + bar.x;
        let cy = self.chart_y() + bar.y;
        let bar_height = (self.layout.row_height * 0.5).floor();

        match bar.kind {
            BarKind::Summary => {
                // open bracket: top rule with a short tick at each end
                let top = cy - bar_height / 2.0;
                let rule = Rectangle::new()
                    .set("x", x)
                    .set("y", top)
                    .set("width", bar.width)
                    .set("height", 4)
                    .set("fill", self.summary_color.as_str());
                group = group.add(rule);
                for tick_x in [x, x + bar.width - 3.0] {
                    let tick = Rectangle::new()
                        .set("x", tick_x)
                        .set("y", top)
                        .set("width", 3)
                        .set("height", bar_height)
                        .set("fill", self.summary_color.as_str());
                    group = group.add(tick);
                }
            }
            BarKind::Task { critical, .. } => {
                let color = if critical {
                    self.critical_color.as_str()
                } else {
                    self.normal_color.as_str()
                };
                let top = cy - bar_height / 2.0;
                let body = Rectangle::new()
                    .set("x", x)
                    .set("y", top)
                    .set("width", bar.width)
                    .set("height", bar_height)
                    .set("rx", 3)
                    .set("ry", 3)
                    .set("fill", color)
                    .set("fill-opacity", 0.55);
                group = group.add(body);

                let done = bar.progress_width();
                if done > 0.0 {
                    let overlay = Rectangle::new()
                        .set("class", "progress")
                        .set("x", x)
                        .set("y", top)
                        .set("width", done)
                        .set("height", bar_height)
                        .set("rx", 3)
                        .set("ry", 3)
                        .set("fill", color);
                    group = group.add(overlay);
                }
            }
        }

        group
    }

    fn render_connectors(&self, geometry: &GanttGeometry) -> Group {
        let mut group = Group::new()
            .set("class", "dependencies")
            .set(
                "transform",
                format!("translate({},{})", self.chart_x(), self.chart_y()),
            );
        for connector in &geometry.connectors {
            let path = Path::new()
                .set("d", connector.svg_path())
                .set("fill", "none")
                .set("stroke", self.connector_color.as_str())
                .set("stroke-width", 1.5)
                .set("marker-end", "url(#arrowhead)");
            group = group.add(path);
        }
        group
    }

    fn arrowhead(&self) -> Definitions {
        let tip = Polygon::new()
            .set("points", "0 0, 8 3, 0 6")
            .set("fill", self.connector_color.as_str());
        let marker = Marker::new()
            .set("id", "arrowhead")
            .set("markerWidth", 8)
            .set("markerHeight", 6)
            .set("refX", 0)
            .set("refY", 3)
            .set("orient", "auto")
            .add(tip);
        Definitions::new().add(marker)
    }
}

impl Renderer for SvgGanttRenderer {
    type Output = String;

    fn render(&self, schedule: &Schedule, collapsed: &CollapseState) -> Result<String, RenderError> {
        if schedule.tasks.is_empty() {
            return Err(RenderError::InvalidData("No tasks to render".into()));
        }

        let rows = project_rows(&schedule.tasks, collapsed);
        let fallback = self
            .fallback_start
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let geometry = self.layout.compute_with_fallback(&rows, fallback);

        let width = self.chart_x() + geometry.width;
        let height = self.chart_y() + geometry.height + self.layout.row_height;

        let mut document = Document::new()
            .set("width", width)
            .set("height", height)
            .set("viewBox", (0.0, 0.0, width, height))
            .set("xmlns", "http://www.w3.org/2000/svg")
            .add(self.arrowhead());

        let background = Rectangle::new()
            .set("width", "100%")
            .set("height", "100%")
            .set("fill", self.background_color.as_str());
        document = document.add(background);

        let title = Text::new(schedule.project_name.as_str())
            .set("x", 8)
            .set("y", 20)
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.font_size + 4)
            .set("font-weight", "bold")
            .set("fill", self.text_color.as_str());
        document = document.add(title);

        document = document.add(self.render_timeline(&geometry));
        document = document.add(self.render_labels(&geometry));
        for bar in &geometry.bars {
            document = document.add(self.render_bar(bar));
        }
        document = document.add(self.render_connectors(&geometry));

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;

        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }
}

/// Truncate to at most `max` characters with an ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
