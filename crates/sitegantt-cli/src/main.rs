//! sitegantt CLI - Construction schedule engine
//!
//! Command-line interface for expanding, inspecting, shifting, and
//! rendering generated construction schedules.

mod config;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use sitegantt_core::{oracle, DetailLevel, ProjectType, Renderer, Schedule, TaskPath};
use sitegantt_engine::{Boundary, ScheduleSession, TaskRow};
use sitegantt_render::{default_file_name, ExcelExporter, SvgGanttRenderer};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "sitegantt")]
#[command(author, version, about = "Construction schedule synthesis and Gantt layout", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file (defaults to ./sitegantt.toml when present)
    #[arg(short, long, global = true, value_name = "FILE", env = "SITEGANTT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize a generated schedule and expand typical floors
    Expand {
        /// Generated schedule JSON
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of typical floors
        #[arg(long)]
        floors: Option<u32>,

        /// Project type
        #[arg(long, value_enum)]
        project_type: Option<ProjectTypeArg>,

        /// Detail level the schedule was generated at
        #[arg(long, value_enum)]
        detail_level: Option<DetailLevelArg>,

        /// Anchor date when the schedule has no substructure phase
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<NaiveDate>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the outline with rolled-up costs
    Show {
        /// Schedule JSON
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[command(flatten)]
        outline: OutlineArgs,
    },

    /// Generate an SVG Gantt chart
    Gantt {
        /// Schedule JSON
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        outline: OutlineArgs,
    },

    /// Export the schedule to XLSX
    Export {
        /// Schedule JSON
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path (defaults to Schedule_<project>.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Move the whole project to a new start or finish date
    Shift {
        /// Schedule JSON
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// New project start
        #[arg(long, value_name = "YYYY-MM-DD", conflicts_with = "finish", required_unless_present = "finish")]
        start: Option<NaiveDate>,

        /// New project finish
        #[arg(long, value_name = "YYYY-MM-DD")]
        finish: Option<NaiveDate>,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct OutlineArgs {
    /// Collapse a summary task (repeatable)
    #[arg(long, value_name = "ID")]
    collapse: Vec<String>,

    /// Collapse every summary task
    #[arg(long, conflicts_with = "collapse")]
    collapse_all: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProjectTypeArg {
    Building,
    Infrastructure,
}

impl From<ProjectTypeArg> for ProjectType {
    fn from(arg: ProjectTypeArg) -> Self {
        match arg {
            ProjectTypeArg::Building => Self::Building,
            ProjectTypeArg::Infrastructure => Self::Infrastructure,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum DetailLevelArg {
    Master,
    Detail,
}

impl From<DetailLevelArg> for DetailLevel {
    fn from(arg: DetailLevelArg) -> Self {
        match arg {
            DetailLevelArg::Master => Self::Master,
            DetailLevelArg::Detail => Self::Detail,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Expand {
            file,
            floors,
            project_type,
            detail_level,
            start,
            output,
        } => {
            if let Some(floors) = floors {
                config.project.floor_count = floors;
            }
            if let Some(kind) = project_type {
                config.project.project_type = kind.into();
            }
            if let Some(level) = detail_level {
                config.project.detail_level = level.into();
            }
            if start.is_some() {
                config.project.start_date = start;
            }

            let schedule = read_schedule(&file)?;
            let (session, report) = ScheduleSession::from_generated(
                schedule,
                &config.project,
                &config.expansion_config(),
            );
            info!(
                floors = report.floors,
                cloned = report.cloned,
                post_shift_days = report.post_shift_days,
                "expansion finished"
            );
            write_schedule(session.schedule(), output.as_deref())?;
        }
        Commands::Show { file, outline } => {
            let session = open_session(&file, &outline)?;
            print!("{}", format_outline(&session));
        }
        Commands::Gantt {
            file,
            output,
            outline,
        } => {
            let session = open_session(&file, &outline)?;
            let renderer = SvgGanttRenderer::new().layout(config.gantt.clone());
            let svg = renderer
                .render(session.schedule(), session.collapsed())
                .context("Failed to render Gantt chart")?;
            std::fs::write(&output, svg)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Commands::Export { file, output } => {
            let schedule = read_schedule(&file)?;
            let output = output.unwrap_or_else(|| PathBuf::from(default_file_name(&schedule.project_name)));
            let bytes = ExcelExporter::new()
                .export(&schedule)
                .context("Failed to build XLSX export")?;
            std::fs::write(&output, bytes)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Wrote {}", output.display());
        }
        Commands::Shift {
            file,
            start,
            finish,
            output,
        } => {
            let (target, which) = match (start, finish) {
                (Some(date), _) => (date, Boundary::Start),
                (None, Some(date)) => (date, Boundary::End),
                (None, None) => anyhow::bail!("either --start or --finish is required"),
            };
            let mut session = ScheduleSession::new(read_schedule(&file)?);
            let delta = session.shift_project(target, which);
            info!(delta, %which, %target, "project shifted");
            write_schedule(session.schedule(), output.as_deref())?;
        }
    }

    Ok(())
}

fn read_schedule(path: &Path) -> Result<Schedule> {
    oracle::read_response(path).with_context(|| format!("Failed to read schedule {}", path.display()))
}

fn write_schedule(schedule: &Schedule, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(schedule).context("Failed to serialize schedule")?;
    match output {
        Some(path) => {
            std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn open_session(path: &Path, outline: &OutlineArgs) -> Result<ScheduleSession> {
    let mut session = ScheduleSession::new(read_schedule(path)?);
    if outline.collapse_all {
        session.collapse_all();
    } else {
        for id in &outline.collapse {
            session.toggle_collapse(&TaskPath::parse(id));
        }
    }
    Ok(session)
}

fn format_outline(session: &ScheduleSession) -> String {
    let schedule = session.schedule();
    let mut out = String::new();

    if !schedule.project_name.is_empty() {
        out.push_str(&format!("Project: {}\n", schedule.project_name));
    }
    match session.bounds() {
        Some(bounds) => out.push_str(&format!(
            "Dates:   {} to {} ({} days)\n",
            bounds.start,
            bounds.end,
            bounds.duration_days()
        )),
        None => out.push_str("Dates:   none\n"),
    }
    out.push('\n');

    out.push_str(&format!(
        "{:<12} {:<48} {:>8} {:<10} {:<10} {:>14}\n",
        "ID", "Task", "Days", "Start", "Finish", "Cost"
    ));
    let rows = session.rows();
    for row in rows.iter().filter(|r| r.is_visible) {
        out.push_str(&format_row(row));
        out.push('\n');
    }

    let total = session.tree().total_cost();
    out.push_str(&format!("{:>106}\n", format!("Total {}", total.round_dp(2))));
    out
}

fn format_row(row: &TaskRow<'_>) -> String {
    let task = row.task;
    let marker = match (row.is_summary, row.is_collapsed) {
        (true, true) => "+ ",
        (true, false) => "- ",
        (false, _) => "  ",
    };
    let name = format!("{}{}{}", "  ".repeat(row.level), marker, task.activity);
    let date = |d: Option<NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    format!(
        "{:<12} {:<48} {:>8} {:<10} {:<10} {:>14}",
        task.task_id.to_string(),
        name,
        task.duration,
        date(task.start_date),
        date(task.end_date),
        row.rolled_up_cost.round_dp(2).to_string()
    )
}
