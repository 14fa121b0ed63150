use chrono::{Duration, Local};
use timesheet::models::TimingState;
use timesheet::sync::merge::merge_tasks;

mod common;
use common::{old_task, task};

#[test]
fn test_file_wins_text_app_wins_tracking() {
    let mut app = old_task("A", "Old", 3);
    app.id = 42;
    app.total = 2.5;
    app.timing_state = TimingState::Start;
    app.synced = true;

    let file = task("A", "Updated").with_project("").with_client("");

    let now = Local::now();
    let merged = merge_tasks(&[app.clone()], &[file], now);

    assert_eq!(merged.len(), 1);
    let m = &merged[0];
    assert_eq!(m.description, "Updated");
    assert_eq!(m.project.as_deref(), Some(""));
    assert_eq!(m.total, 2.5);
    assert_eq!(m.id, 42);
    assert_eq!(m.timing_state, TimingState::Start);
    assert!(m.synced);
    assert_eq!(m.most_recent_entry, app.most_recent_entry);
    assert_eq!(m.last_modified, now);
}

#[test]
fn test_new_file_task_is_added_complete() {
    let mut file = task("D1", "Done task");
    file.complete = true;

    let now = Local::now();
    let merged = merge_tasks(&[], &[file], now);

    assert_eq!(merged.len(), 1);
    assert!(merged[0].complete);
    assert!(!merged[0].deleted);
    assert_eq!(merged[0].last_modified, now);
    assert_eq!(merged[0].id, now.timestamp_millis());
}

#[test]
fn test_file_tasks_without_exid_are_ignored() {
    let merged = merge_tasks(&[task("A", "Keep")], &[task("", "No id")], Local::now());
    assert_eq!(merged.len(), 1);
    assert_eq!(merged[0].exid, "A");
}

#[test]
fn test_app_only_tasks_pass_through_unchanged() {
    let a = old_task("A", "Alpha", 2);
    let b = old_task("B", "Beta", 5);

    let merged = merge_tasks(&[a.clone(), b.clone()], &[task("A", "Alpha v2")], Local::now());

    assert_eq!(merged[1], b);
    assert_ne!(merged[0].last_modified, a.last_modified);
}

#[test]
fn test_order_is_app_then_new_file_tasks() {
    let app = vec![task("A", "a"), task("B", "b")];
    let file = vec![task("Z", "z"), task("B", "b2"), task("Y", "y")];

    let merged = merge_tasks(&app, &file, Local::now());
    let order: Vec<&str> = merged.iter().map(|t| t.exid.as_str()).collect();
    assert_eq!(order, vec!["A", "B", "Z", "Y"]);
}

#[test]
fn test_new_file_tasks_get_distinct_ids() {
    let mut app = task("A", "a");
    let now = Local::now();
    app.id = now.timestamp_millis() + 10;

    let merged = merge_tasks(&[app.clone()], &[task("X", "x"), task("Y", "y")], now);

    assert_eq!(merged[1].id, app.id + 1);
    assert_eq!(merged[2].id, app.id + 2);
}

#[test]
fn test_completion_comes_from_file() {
    let mut app = task("A", "a");
    app.complete = true;
    app.completed_date = Some((Local::now() - Duration::days(1)).date_naive());

    let merged = merge_tasks(&[app], &[task("A", "a")], Local::now());
    assert!(!merged[0].complete);
    assert!(merged[0].completed_date.is_none());
}
