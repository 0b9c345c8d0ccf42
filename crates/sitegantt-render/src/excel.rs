//! XLSX schedule export
//!
//! Writes a single "Project Schedule" sheet in the layout desktop planning
//! tools import:
//!
//! ```text
//! | Project:        | Tower A     |
//! | Start Date:     | 2025-01-06  |
//! | Finish Date:    | 2025-06-30  |
//! | Total Duration: | 175 days    |
//! |                 |             |
//! | ID  | Task Mode      | Task Name      | Duration | Start | Finish | Predecessors | Resource Names | Cost |
//! | 1   | Auto Scheduled | Preliminaries  | 14 days  | ...   | ...    |              |                | 2000 |
//! | 1.1 | Auto Scheduled |     Welfare    | 2 days   | ...   | ...    |              | Site team      | 800  |
//! ```
//!
//! Every task is exported, including rows hidden by the current collapse
//! state. Summary rows are bold and carry their rolled-up cost.

use crate::export::{ExportProjector, ExportTable, COLUMNS, COLUMN_WIDTHS};
use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Format, FormatBorder, Workbook, Worksheet};
use sitegantt_core::{CollapseState, RenderError, Renderer, Schedule};
use sitegantt_engine::TaskTree;
use tracing::debug;

/// Sheet name used for the schedule
pub const SHEET_NAME: &str = "Project Schedule";

/// Excel schedule exporter
#[derive(Clone, Debug)]
pub struct ExcelExporter {
    /// Currency symbol for the cost column (empty for a plain number)
    pub currency: String,
    /// chrono format string for date cells
    pub date_format: String,
    /// Whether summary rows are bold
    pub bold_summaries: bool,
}

impl Default for ExcelExporter {
    fn default() -> Self {
        Self {
            currency: String::new(),
            date_format: "%Y-%m-%d".into(),
            bold_summaries: true,
        }
    }
}

struct ExcelFormats {
    label: Format,
    header: Format,
    text: Format,
    summary_text: Format,
    cost: Format,
    summary_cost: Format,
}

impl ExcelExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set currency symbol
    pub fn currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Set the date format for start/finish cells
    pub fn date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Render summary rows like any other row
    pub fn plain_summaries(mut self) -> Self {
        self.bold_summaries = false;
        self
    }

    fn create_formats(&self) -> ExcelFormats {
        let cost_format = if self.currency.is_empty() {
            "#,##0.00".to_string()
        } else {
            format!("#,##0.00 \"{}\"", self.currency)
        };

        let text = Format::new().set_border(FormatBorder::Thin);
        let cost = Format::new()
            .set_num_format(&cost_format)
            .set_border(FormatBorder::Thin);
        let (summary_text, summary_cost) = if self.bold_summaries {
            (text.clone().set_bold(), cost.clone().set_bold())
        } else {
            (text.clone(), cost.clone())
        };

        ExcelFormats {
            label: Format::new().set_bold(),
            header: Format::new()
                .set_bold()
                .set_background_color(0x4472C4)
                .set_font_color(0xFFFFFF)
                .set_border(FormatBorder::Thin),
            text,
            summary_text,
            cost,
            summary_cost,
        }
    }

    /// Build the workbook and return the XLSX bytes
    pub fn export(&self, schedule: &Schedule) -> Result<Vec<u8>, RenderError> {
        let table = ExportProjector::new()
            .date_format(self.date_format.clone())
            .project(schedule);
        let tree = TaskTree::build(&schedule.tasks);
        let summaries: Vec<bool> = schedule
            .tasks
            .iter()
            .map(|t| tree.is_summary(&t.task_id))
            .collect();

        let formats = self.create_formats();
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet
            .set_name(SHEET_NAME)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        self.write_sheet(sheet, &table, &summaries, &formats)?;

        debug!(rows = table.rows.len(), "writing schedule workbook");
        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }

    fn write_sheet(
        &self,
        sheet: &mut Worksheet,
        table: &ExportTable,
        summaries: &[bool],
        formats: &ExcelFormats,
    ) -> Result<(), RenderError> {
        let xlsx = |e: rust_xlsxwriter::XlsxError| RenderError::Format(e.to_string());

        for (row, (label, value)) in table.header.lines().into_iter().enumerate() {
            let row = row as u32;
            sheet
                .write_with_format(row, 0, label, &formats.label)
                .map_err(xlsx)?;
            sheet.write(row, 1, value).map_err(xlsx)?;
        }

        // one blank row after the header block
        let header_row = table.header.lines().len() as u32 + 1;
        for (col, title) in COLUMNS.iter().enumerate() {
            sheet
                .write_with_format(header_row, col as u16, *title, &formats.header)
                .map_err(xlsx)?;
        }

        for (i, export_row) in table.rows.iter().enumerate() {
            let row = header_row + 1 + i as u32;
            let is_summary = summaries.get(i).copied().unwrap_or(false);
            let (text, cost) = if is_summary {
                (&formats.summary_text, &formats.summary_cost)
            } else {
                (&formats.text, &formats.cost)
            };

            let cells = export_row.cells();
            for (col, value) in cells.iter().take(COLUMNS.len() - 1).enumerate() {
                sheet
                    .write_with_format(row, col as u16, value.as_str(), text)
                    .map_err(xlsx)?;
            }
            let amount = export_row.cost.to_f64().unwrap_or(0.0);
            sheet
                .write_with_format(row, (COLUMNS.len() - 1) as u16, amount, cost)
                .map_err(xlsx)?;
        }

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(col as u16, *width).ok();
        }
        sheet.set_freeze_panes(header_row + 1, 0).ok();

        Ok(())
    }
}

impl Renderer for ExcelExporter {
    type Output = Vec<u8>;

    /// Collapse state does not affect the export
    fn render(&self, schedule: &Schedule, _collapsed: &CollapseState) -> Result<Vec<u8>, RenderError> {
        self.export(schedule)
    }
}
