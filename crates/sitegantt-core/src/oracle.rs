//! Oracle response ingestion
//!
//! The schedule generator returns `{projectName, summary, scheduleItems}`.
//! Records are parsed one at a time so a single bad item never sinks the
//! whole response. Field readers accept the shapes generators actually emit:
//! IDs as numbers, durations as `"5 days"`, dates with a time suffix,
//! dependencies as a comma-separated string.

use crate::{new_task_uid, IngestError, Schedule, ScheduleTask, TaskPath};
use chrono::{DateTime, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Parse a generated schedule payload.
///
/// Fails only when the payload is not a JSON object. Items without a
/// `taskId`, or that cannot be read at all, are skipped with a warning.
/// An explicit `isTemplate` flag is kept; otherwise the name heuristic
/// decides.
pub fn parse_response(json: &str) -> Result<Schedule, IngestError> {
    let Value::Object(mut root) = serde_json::from_str::<Value>(json)? else {
        return Err(IngestError::NotAnObject);
    };

    let project_name = text_field(&root, "projectName");
    let summary = text_field(&root, "summary");

    let items = match root.remove("scheduleItems") {
        Some(Value::Array(items)) => items,
        Some(Value::Null) | None => {
            warn!("response has no scheduleItems");
            Vec::new()
        }
        Some(_) => {
            warn!("scheduleItems is not an array; ignoring it");
            Vec::new()
        }
    };

    let mut tasks = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let explicit_template = item.get("isTemplate").and_then(Value::as_bool);
        match serde_json::from_value::<ScheduleTask>(item) {
            Ok(mut task) => {
                if task.task_id.is_empty() {
                    warn!(index, "dropping schedule item without taskId");
                    continue;
                }
                if task.id.trim().is_empty() {
                    task.id = new_task_uid();
                }
                task.is_template =
                    explicit_template.unwrap_or_else(|| task.looks_like_template());
                tasks.push(task);
            }
            Err(err) => warn!(index, error = %err, "skipping unreadable schedule item"),
        }
    }

    debug!(tasks = tasks.len(), project = %project_name, "ingested schedule");
    Ok(Schedule::new(project_name, summary, tasks))
}

/// Read and parse a schedule payload from disk
pub fn read_response(path: impl AsRef<Path>) -> Result<Schedule, IngestError> {
    let json = std::fs::read_to_string(path)?;
    parse_response(&json)
}

fn text_field(root: &serde_json::Map<String, Value>, key: &str) -> String {
    root.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Parse `YYYY-MM-DD`, or the date part of a longer timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

fn number_like(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|head| head.trim_end_matches('%').parse::<f64>().ok()),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn plain_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(plain_text)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Null | Value::Object(_) => None,
    }
}

// Field readers used through `#[serde(deserialize_with = ...)]` on ScheduleTask.

pub(crate) fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(plain_text(&Value::deserialize(d)?).unwrap_or_default())
}

pub(crate) fn lenient_optional_string<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<String>, D::Error> {
    Ok(plain_text(&Value::deserialize(d)?).filter(|s| !s.is_empty()))
}

pub(crate) fn lenient_days<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(number_like(&Value::deserialize(d)?).map_or(0, |n| n.round() as i64))
}

pub(crate) fn lenient_progress<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    Ok(number_like(&Value::deserialize(d)?).map_or(0, |n| n.round().clamp(0.0, 100.0) as u8))
}

pub(crate) fn lenient_date<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<NaiveDate>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => parse_date(&s),
        _ => None,
    })
}

pub(crate) fn lenient_bool<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Bool(b) => b,
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes"),
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        _ => false,
    })
}

pub(crate) fn lenient_cost<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Decimal>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => parse_decimal(&n.to_string()),
        Value::String(s) => parse_decimal(&s.replace(',', "")),
        _ => None,
    })
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

pub(crate) fn lenient_dependencies<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Vec<TaskPath>, D::Error> {
    let paths: Vec<TaskPath> = match Value::deserialize(d)? {
        Value::Array(items) => items
            .iter()
            .filter_map(plain_text)
            .map(|s| TaskPath::parse(&s))
            .collect(),
        Value::String(s) => s.split([',', ';']).map(TaskPath::parse).collect(),
        Value::Number(n) => vec![TaskPath::parse(&n.to_string())],
        _ => Vec::new(),
    };
    Ok(paths.into_iter().filter(|p| !p.is_empty()).collect())
}
