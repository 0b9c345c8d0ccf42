//! End-to-end properties of the schedule pipeline
//!
//! Ordering, rollup, visibility, expansion cardinality and shift rigidity,
//! checked against small hand-built schedules.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sitegantt_core::{oracle, sort_by_task_id, CollapseState, Schedule, ScheduleTask, TaskPath};
use sitegantt_engine::{
    shift_project, visible_rows, Boundary, ExpansionConfig, FloorExpander, ScheduleSession, TaskTree,
};

/// Helper to create a date
fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn ids(tasks: &[ScheduleTask]) -> Vec<String> {
    tasks.iter().map(|t| t.task_id.to_string()).collect()
}

fn find<'a>(tasks: &'a [ScheduleTask], id: &str) -> &'a ScheduleTask {
    tasks
        .iter()
        .find(|t| t.task_id == TaskPath::from(id))
        .unwrap_or_else(|| panic!("missing task {id}"))
}

#[test]
fn display_order_is_numeric_per_segment() {
    let mut tasks = vec![
        ScheduleTask::new("3.10", "Tenth"),
        ScheduleTask::new("3.2", "Second"),
        ScheduleTask::new("3.1.4", "Nested"),
        ScheduleTask::new("10", "Handover"),
        ScheduleTask::new("3", "Structure"),
    ];
    sort_by_task_id(&mut tasks);
    assert_eq!(ids(&tasks), vec!["3", "3.1.4", "3.2", "3.10", "10"]);
}

#[test]
fn rollup_is_leaf_count_times_cost() {
    let c = dec!(37.5);
    let mut tasks = vec![ScheduleTask::new("1", "Root")];
    for branch in 1..=3u64 {
        tasks.push(ScheduleTask::new(TaskPath::from_indices(&[1, branch]), "Branch"));
        for leaf in 1..=branch {
            tasks.push(ScheduleTask::new(TaskPath::from_indices(&[1, branch, leaf]), "Leaf").cost(c));
        }
    }
    let tree = TaskTree::build(&tasks);
    assert_eq!(tree.rolled_up_cost(&"1".into()), c * Decimal::from(6));
    assert_eq!(tree.rolled_up_cost(&"1.3".into()), c * Decimal::from(3));
}

#[test]
fn collapse_then_expand_restores_visible_set() {
    let tasks = vec![
        ScheduleTask::new("1", "A"),
        ScheduleTask::new("1.1", "A1"),
        ScheduleTask::new("1.1.1", "A11"),
        ScheduleTask::new("2", "B"),
        ScheduleTask::new("2.1", "B1"),
    ];
    let mut state: CollapseState = [TaskPath::from("2")].into_iter().collect();
    let visible_ids = |state: &CollapseState| -> Vec<String> {
        visible_rows(&tasks, state)
            .iter()
            .map(|r| r.task.task_id.to_string())
            .collect()
    };
    let before = visible_ids(&state);

    state.toggle(&"1.1".into());
    assert_ne!(visible_ids(&state), before);
    state.toggle(&"1.1".into());

    assert_eq!(visible_ids(&state), before);
}

#[test]
fn expansion_produces_floors_times_templates() {
    let mut tasks = vec![
        ScheduleTask::new("1", "Prelims").dates(date(2025, 1, 1), date(2025, 1, 20)),
        ScheduleTask::new("2.1", "Raft").dates(date(2025, 1, 20), date(2025, 2, 28)),
        ScheduleTask::new("3.X", "Typical Floor").dates(date(2025, 3, 1), date(2025, 3, 30)),
    ];
    let m = 5;
    for i in 1..=m {
        tasks.push(
            ScheduleTask::new(format!("3.X.{i}").as_str(), "Works")
                .dates(date(2025, 3, i), date(2025, 3, i + 2)),
        );
    }

    for n in [1u32, 3, 12] {
        let (expanded, report) = FloorExpander::new(ExpansionConfig::new(n)).expand(&tasks);
        let generated = expanded
            .iter()
            .filter(|t| t.task_id.top_level() == Some(3) && t.task_id.depth() > 0)
            .count();
        assert_eq!(report.cloned, n as usize * m as usize);
        assert_eq!(report.floor_summaries, n as usize);
        assert_eq!(generated, (n as usize) * (m as usize) + n as usize);
        assert!(expanded.iter().all(|t| !t.task_id.has_placeholder()));
    }
}

#[test]
fn shift_is_a_rigid_translation() {
    let tasks = vec![
        ScheduleTask::new("1", "A").dates(date(2025, 1, 1), date(2025, 1, 5)),
        ScheduleTask::new("2", "B").dates(date(2025, 1, 3), date(2025, 3, 1)),
        ScheduleTask::new("3", "C").dates(date(2025, 2, 10), date(2025, 2, 10)),
    ];
    for (target, which, delta) in [
        (date(2025, 4, 1), Boundary::Start, 90),
        (date(2024, 12, 1), Boundary::End, -90),
    ] {
        let shifted = shift_project(&tasks, target, which);
        for (old, new) in tasks.iter().zip(&shifted) {
            let (os, oe) = (old.start_date.unwrap(), old.end_date.unwrap());
            let (ns, ne) = (new.start_date.unwrap(), new.end_date.unwrap());
            assert_eq!((ne - ns).num_days(), (oe - os).num_days());
            assert_eq!((ns - os).num_days(), delta);
        }
    }
}

#[test]
fn small_tree_rolls_up_leaf_costs() {
    let tasks = vec![
        ScheduleTask::new("1", "Prelims").dates(date(2025, 1, 1), date(2025, 1, 5)),
        ScheduleTask::new("1.1", "Mobilise")
            .dates(date(2025, 1, 1), date(2025, 1, 3))
            .cost(100),
        ScheduleTask::new("1.2", "Hoarding")
            .dates(date(2025, 1, 3), date(2025, 1, 5))
            .cost(150),
    ];
    let tree = TaskTree::build(&tasks);
    assert!(tree.is_summary(&"1".into()));
    assert_eq!(
        tree.children(&"1".into()).to_vec(),
        vec![TaskPath::from("1.1"), TaskPath::from("1.2")]
    );
    assert_eq!(tree.rolled_up_cost(&"1".into()), dec!(250));
}

#[test]
fn two_floor_expansion_scenario() {
    let tasks = vec![
        ScheduleTask::new("2.1", "Basement slab").dates(date(2025, 3, 1), date(2025, 3, 30)),
        ScheduleTask::new("3.X.1", "Columns Floor Typical").dates(date(2025, 4, 1), date(2025, 4, 5)),
    ];
    let (expanded, _) = FloorExpander::new(ExpansionConfig::new(2)).expand(&tasks);

    let first = find(&expanded, "3.1.1");
    let second = find(&expanded, "3.2.1");
    assert_eq!(first.start_date, Some(date(2025, 3, 30)));
    assert_eq!(second.start_date, Some(date(2025, 4, 6)));
    assert_eq!(
        (second.start_date.unwrap() - first.start_date.unwrap()).num_days(),
        7
    );
    assert_eq!(second.dependencies, vec![TaskPath::from("3.1.1")]);

    assert!(find(&expanded, "3.1").dependencies.is_empty());
    assert_eq!(find(&expanded, "3.2").dependencies, vec![TaskPath::from("3.1")]);
}

#[test]
fn collapse_all_hides_nested_summaries() {
    let schedule = Schedule::new(
        "Warehouse",
        "",
        vec![
            ScheduleTask::new("1", "Prelims"),
            ScheduleTask::new("1.1", "Setup"),
            ScheduleTask::new("2", "Substructure"),
            ScheduleTask::new("2.1", "Piling"),
            ScheduleTask::new("2.1.1", "Test piles"),
            ScheduleTask::new("2.2", "Capping"),
        ],
    );
    let mut session = ScheduleSession::new(schedule);
    session.collapse_all();

    let collapsed: Vec<String> = session.collapsed().iter().map(ToString::to_string).collect();
    assert_eq!(collapsed, vec!["1", "2", "2.1"]);

    let rows = session.rows();
    let hidden: Vec<String> = rows
        .iter()
        .filter(|r| !r.is_visible)
        .map(|r| r.task.task_id.to_string())
        .collect();
    assert_eq!(hidden, vec!["1.1", "2.1", "2.1.1", "2.2"]);
}

#[test]
fn oracle_payload_through_session() {
    let json = r#"{
        "projectName": "Tower A",
        "summary": "G+2 residential",
        "scheduleItems": [
            {"taskId": "1", "activity": "Preliminaries", "startDate": "2025-01-01", "endDate": "2025-01-15", "duration": 14},
            {"taskId": "2", "activity": "Substructure", "startDate": "2025-01-15", "endDate": "2025-02-15", "duration": 31},
            {"taskId": "3.X.1", "activity": "Columns Level X", "startDate": "2025-03-01", "endDate": "2025-03-04", "duration": 3, "totalCost": 1000},
            {"taskId": "3.X.2", "activity": "Slab Level X", "startDate": "2025-03-04", "endDate": "2025-03-10", "duration": 6, "dependencies": "3.X.1", "totalCost": 4000},
            {"taskId": "4", "activity": "Roofing", "startDate": "2025-02-20", "endDate": "2025-03-10", "duration": 18}
        ]
    }"#;
    let schedule = oracle::parse_response(json).unwrap();
    let settings = sitegantt_core::ProjectSettings {
        floor_count: 2,
        ..Default::default()
    };
    let (session, report) =
        ScheduleSession::from_generated(schedule, &settings, &ExpansionConfig::default());

    assert_eq!(report.cloned, 4);
    assert_eq!(session.schedule().project_name, "Tower A");
    let tree = session.tree();
    assert_eq!(tree.rolled_up_cost(&"3".into()), dec!(10000));
    assert_eq!(tree.rolled_up_cost(&"3.2".into()), dec!(5000));

    // slabs end 2025-02-24 and 2025-03-03, roofing pushed 11 + 7 days
    let roof = find(&session.schedule().tasks, "4");
    assert_eq!(roof.start_date, Some(date(2025, 3, 10)));
    assert_eq!(report.post_shift_days, 18);
}

#[test]
fn oracle_structure_summary_keeps_ids_unique() {
    let json = r#"{
        "projectName": "Tower B",
        "scheduleItems": [
            {"taskId": "2", "activity": "Substructure", "startDate": "2025-01-15", "endDate": "2025-02-15"},
            {"taskId": "3", "activity": "Superstructure (Typical Floors)"},
            {"taskId": "3.X", "activity": "Typical Floor", "startDate": "2025-03-01", "endDate": "2025-03-20"},
            {"taskId": "3.X.1", "activity": "Columns", "startDate": "2025-03-01", "endDate": "2025-03-04"}
        ]
    }"#;
    let schedule = oracle::parse_response(json).unwrap();
    assert!(!schedule.get(&"3".into()).unwrap().is_template);

    let (tasks, report) = FloorExpander::new(ExpansionConfig::new(2)).expand(&schedule.tasks);
    assert_eq!(ids(&tasks), vec!["2", "3", "3.1", "3.1.1", "3.2", "3.2.1"]);
    assert_eq!(report.cloned, 2);
    assert!(!report.implicit_structure_summary);
    assert_eq!(find(&tasks, "3").activity, "Superstructure (Typical Floors)");
}
