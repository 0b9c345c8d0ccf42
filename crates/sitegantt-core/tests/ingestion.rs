//! Reading generated schedules from disk

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sitegantt_core::{oracle, CollapseState, IngestError, TaskPath};
use tempfile::tempdir;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn read_response_sorts_and_flags_templates() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("schedule.json");
    std::fs::write(
        &path,
        r#"{
            "projectName": "Canal Wharf",
            "scheduleItems": [
                {"taskId": "10", "activity": "Handover", "startDate": "2025-09-01"},
                {"taskId": "3.X.1", "activity": "Columns Level X", "duration": 3},
                {"taskId": "2", "activity": "Piling", "startDate": "2025-02-03"},
                {"taskId": "3.X", "activity": "Typical Floor"}
            ]
        }"#,
    )
    .unwrap();

    let schedule = oracle::read_response(&path).unwrap();
    let ids: Vec<String> = schedule.tasks.iter().map(|t| t.task_id.to_string()).collect();
    assert_eq!(ids, vec!["2", "3.X", "3.X.1", "10"]);
    assert!(schedule.tasks[1].is_template);
    assert!(schedule.tasks[2].is_template);
    assert!(!schedule.tasks[0].is_template);
    assert_eq!(schedule.tasks[0].start_date, Some(date(2025, 2, 3)));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = oracle::read_response(dir.path().join("absent.json")).unwrap_err();
    assert!(matches!(err, IngestError::Io(_)));
}

#[test]
fn collapsed_floor_hides_generated_children() {
    let mut collapsed = CollapseState::new();
    assert!(collapsed.toggle(&TaskPath::parse("3.2")));

    assert!(!collapsed.hides(&TaskPath::parse("3.2")));
    assert!(collapsed.hides(&TaskPath::parse("3.2.1")));
    assert!(collapsed.hides(&TaskPath::parse("3.2.1.4")));
    assert!(!collapsed.hides(&TaskPath::parse("3.20.1")));
    assert!(!collapsed.hides(&TaskPath::parse("3.1.1")));

    assert!(!collapsed.toggle(&TaskPath::parse("3.2")));
    assert!(collapsed.is_empty());
}
