//! End-to-end tests for the sitegantt binary

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::tempdir;

const TOWER: &str = r#"{
  "projectName": "Harbour Tower",
  "summary": "Twelve storey residential block",
  "scheduleItems": [
    {"taskId": "1", "activity": "Preliminaries", "duration": "14 days",
     "startDate": "2025-01-06", "endDate": "2025-01-20"},
    {"taskId": "1.1", "activity": "Site setup", "duration": 5,
     "startDate": "2025-01-06", "endDate": "2025-01-11", "totalCost": 1200},
    {"taskId": "2", "activity": "Substructure", "duration": 28,
     "startDate": "2025-01-20", "endDate": "2025-02-17", "dependencies": "1"},
    {"taskId": "3.X.1", "activity": "Columns Level X", "duration": 3,
     "startDate": "2025-03-03", "endDate": "2025-03-06", "totalCost": 2500},
    {"taskId": "3.X.2", "activity": "Slab Typical Floor", "duration": 7,
     "startDate": "2025-03-06", "endDate": "2025-03-13", "dependencies": "3.X.1",
     "totalCost": 9000}
  ]
}"#;

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_sitegantt")
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(binary())
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to run sitegantt")
}

fn fixture(dir: &Path) -> PathBuf {
    let path = dir.join("tower.json");
    std::fs::write(&path, TOWER).unwrap();
    path
}

fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn task_ids(schedule: &serde_json::Value) -> Vec<String> {
    schedule["scheduleItems"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["taskId"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn expand_generates_floors() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());

    let output = run(dir.path(), &["expand", input.to_str().unwrap(), "--floors", "2"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let ids = task_ids(&stdout_json(&output));
    for id in ["3", "3.1", "3.1.1", "3.1.2", "3.2", "3.2.1", "3.2.2"] {
        assert!(ids.contains(&id.to_string()), "missing {id} in {ids:?}");
    }
    assert!(!ids.iter().any(|id| id.contains('X')));
}

#[test]
fn expand_infrastructure_leaves_templates() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());

    let output = run(
        dir.path(),
        &[
            "expand",
            input.to_str().unwrap(),
            "--floors",
            "4",
            "--project-type",
            "infrastructure",
        ],
    );
    assert!(output.status.success());
    let ids = task_ids(&stdout_json(&output));
    assert!(ids.contains(&"3.X.1".to_string()));
    assert!(!ids.contains(&"3.1".to_string()));
}

#[test]
fn expand_reads_floor_count_from_config() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());
    std::fs::write(dir.path().join("sitegantt.toml"), "[project]\nfloor_count = 3\n").unwrap();

    let output = run(dir.path(), &["expand", input.to_str().unwrap()]);
    assert!(output.status.success());
    let ids = task_ids(&stdout_json(&output));
    assert!(ids.contains(&"3.3.2".to_string()));
}

#[test]
fn show_prints_outline_with_collapse() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());

    let output = run(dir.path(), &["show", input.to_str().unwrap(), "--collapse", "1"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Project: Harbour Tower"));
    assert!(stdout.contains("+ Preliminaries"));
    assert!(!stdout.contains("Site setup"));
    assert!(stdout.contains("1200"));
}

#[test]
fn gantt_writes_svg() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());
    let svg_path = dir.path().join("tower.svg");

    let output = run(
        dir.path(),
        &["gantt", input.to_str().unwrap(), "-o", svg_path.to_str().unwrap()],
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Substructure"));
}

#[test]
fn export_writes_default_file_name() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());

    let output = run(dir.path(), &["export", input.to_str().unwrap()]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let bytes = std::fs::read(dir.path().join("Schedule_Harbour_Tower.xlsx")).unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn shift_moves_project_start() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());

    let output = run(
        dir.path(),
        &["shift", input.to_str().unwrap(), "--start", "2025-02-03"],
    );
    assert!(output.status.success());

    let schedule = stdout_json(&output);
    let first = &schedule["scheduleItems"][0];
    assert_eq!(first["taskId"], "1");
    assert_eq!(first["startDate"], "2025-02-03");
    assert_eq!(first["endDate"], "2025-02-17");
}

#[test]
fn shift_requires_a_boundary() {
    let dir = tempdir().unwrap();
    let input = fixture(dir.path());

    let output = run(dir.path(), &["shift", input.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn missing_input_fails() {
    let dir = tempdir().unwrap();

    let output = run(dir.path(), &["show", "nope.json"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("nope.json"), "stderr: {stderr}");
}
