use chrono::{DateTime, Duration, Local};
use timesheet::core::reducer::{Action, hydrate, reduce, reduce_all};
use timesheet::models::{AppState, PartialState, Settings, TimingState};

mod common;
use common::{entry, task};

fn start(exid: &str) -> Action {
    Action::StartTask { exid: exid.into() }
}

fn stop(exid: &str) -> Action {
    Action::StopTask { exid: exid.into() }
}

fn add(raw: &str) -> Action {
    Action::AddTask {
        raw: raw.into(),
        exid: None,
        client: None,
    }
}

fn state_with(exids: &[&str]) -> AppState {
    AppState {
        tasks: exids.iter().map(|e| task(e, &format!("task {e}"))).collect(),
        ..AppState::default()
    }
}

fn t0() -> DateTime<Local> {
    Local::now() - Duration::hours(4)
}

#[test]
fn test_start_then_stop_records_one_entry() {
    let t0 = t0();
    let state = reduce(state_with(&["A"]), &start("A"), t0);

    assert_eq!(state.current_task.as_deref(), Some("A"));
    assert_eq!(state.task("A").unwrap().timing_state, TimingState::Start);
    assert!(state.entries.is_empty());

    let state = reduce(state, &stop("A"), t0 + Duration::hours(1));

    assert!(state.new_entry.is_none());
    assert!(state.current_task.is_none());
    assert_eq!(state.entries.len(), 1);
    assert_eq!(state.entries[0].task, "A");
    assert_eq!(state.entries[0].start, t0);
    assert_eq!(state.task("A").unwrap().total, 1.0);
    assert_eq!(state.task("A").unwrap().timing_state, TimingState::Stop);
}

#[test]
fn test_starting_another_task_stops_the_running_one() {
    let t0 = t0();
    let t1 = t0 + Duration::minutes(90);

    let state = reduce_all(state_with(&["A", "B"]), &[start("A")], t0);
    let state = reduce(state, &start("B"), t1);

    assert_eq!(state.entries.len(), 1);
    let e = &state.entries[0];
    assert_eq!(e.task, "A");
    assert_eq!(e.start, t0);
    assert_eq!(e.end, Some(t1));

    assert_eq!(state.task("A").unwrap().timing_state, TimingState::Stop);
    assert_eq!(state.task("B").unwrap().timing_state, TimingState::Start);
    assert_eq!(state.current_task.as_deref(), Some("B"));
    assert_eq!(state.new_entry.as_ref().unwrap().start, t1);
    assert_eq!(state.task("A").unwrap().total, 1.5);

    let running = state.tasks.iter().filter(|t| t.is_running()).count();
    assert_eq!(running, 1);
}

#[test]
fn test_start_unknown_task_is_ignored() {
    let t0 = t0();
    let before = reduce(state_with(&["A"]), &start("A"), t0);
    let after = reduce(before.clone(), &start("NOPE"), t0 + Duration::hours(1));

    assert_eq!(after, before);
}

#[test]
fn test_gaps_between_entries() {
    let t0 = t0();
    let actions = [start("A"), stop("A")];
    let state = reduce_all(state_with(&["A", "B"]), &actions, t0);

    let later = t0 + Duration::minutes(45);
    let state = reduce(state, &start("B"), later);
    let state = reduce(state, &stop("B"), later + Duration::hours(1));

    assert_eq!(state.entries.len(), 2);
    assert_eq!(state.entries[0].gap, None);
    assert_eq!(state.entries[1].gap, Some(0.75));
}

#[test]
fn test_totals_and_stats_follow_entries() {
    let t0 = t0();
    let mut state = state_with(&["A", "B"]);
    state.settings = Settings {
        rate: 100.0,
        tax: 25.0,
        ..Settings::default()
    };
    state.entries = vec![
        entry(1, "A", t0, 1.0),
        entry(2, "A", t0 + Duration::hours(1), 0.5),
        entry(3, "B", t0 + Duration::hours(2), 0.25),
    ];

    let state = reduce(
        state,
        &Action::TaskSyncChanged {
            exid: "B".into(),
            synced: true,
        },
        t0,
    );

    assert_eq!(state.task("A").unwrap().total, 1.5);
    assert_eq!(state.task("B").unwrap().total, 0.25);
    assert!(state.task("B").unwrap().synced);
    assert_eq!(
        state.task("A").unwrap().most_recent_entry,
        t0 + Duration::hours(1)
    );

    assert_eq!(state.stats.total_hours, 1.75);
    assert_eq!(state.stats.synced_hours, 0.25);
    assert_eq!(state.stats.unsynced_hours, 1.5);
    assert_eq!(state.stats.earnings, 175.0);
    assert_eq!(state.stats.tax_amount, 43.75);
    assert_eq!(state.stats.net, 131.25);
}

#[test]
fn test_complete_cascades_to_entries() {
    let t0 = t0();
    let mut state = state_with(&["A", "B"]);
    state.entries = vec![entry(1, "A", t0, 1.0), entry(2, "B", t0, 1.0)];

    let state = reduce(
        state,
        &Action::TaskComplete {
            exid: "A".into(),
            complete: true,
        },
        t0,
    );

    let a = state.task("A").unwrap();
    assert!(a.complete);
    assert!(a.synced);
    assert_eq!(a.completed_date, Some(t0.date_naive()));
    assert!(state.entries[0].synced);
    assert!(!state.entries[1].synced);

    let state = reduce(
        state,
        &Action::TaskComplete {
            exid: "A".into(),
            complete: false,
        },
        t0,
    );
    assert!(!state.task("A").unwrap().complete);
    assert!(state.task("A").unwrap().completed_date.is_none());
    assert!(!state.entries[0].synced);
}

#[test]
fn test_add_task_extracts_tokens() {
    let now = Local::now();
    let state = reduce(
        AppState::default(),
        &add("Build login page #T001 +website client:acme"),
        now,
    );

    let t = state.task("T001").expect("task added");
    assert_eq!(t.description, "Build login page");
    assert_eq!(t.project.as_deref(), Some("website"));
    assert_eq!(t.client.as_deref(), Some("acme"));
    assert_eq!(t.id, now.timestamp_millis());
    assert_eq!(state.clients, vec!["acme".to_string()]);
}

#[test]
fn test_add_task_without_exid_uses_its_id() {
    let now = Local::now();
    let state = reduce_all(AppState::default(), &[add("first"), add("second")], now);

    assert_eq!(state.tasks.len(), 2);
    assert_eq!(state.tasks[0].exid, state.tasks[0].id.to_string());
    assert_ne!(state.tasks[0].id, state.tasks[1].id);
}

#[test]
fn test_add_task_overrides_win_over_tokens() {
    let state = reduce(
        AppState::default(),
        &Action::AddTask {
            raw: "Call #FROMTEXT client:text".into(),
            exid: Some("EXPLICIT".into()),
            client: Some("globex".into()),
        },
        Local::now(),
    );

    let t = state.task("EXPLICIT").expect("task added");
    assert_eq!(t.client.as_deref(), Some("globex"));
    assert!(state.task("FROMTEXT").is_none());
}

#[test]
fn test_add_task_with_existing_exid_updates_it() {
    let state = reduce_all(
        AppState::default(),
        &[add("#A first text +p"), add("#A second text")],
        Local::now(),
    );

    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].description, "second text");
    assert_eq!(state.tasks[0].project.as_deref(), Some("p"));
}

#[test]
fn test_delete_and_restore() {
    let now = Local::now();
    let state = reduce(
        state_with(&["A", "B"]),
        &Action::DeleteTask { exid: "A".into() },
        now,
    );

    assert!(state.task("A").is_none());
    assert_eq!(state.deleted_tasks.len(), 1);
    assert!(state.deleted_tasks[0].deleted);

    let state = reduce(state, &Action::RestoreTask { exid: "A".into() }, now);
    assert!(state.deleted_tasks.is_empty());
    let a = state.task("A").expect("restored");
    assert!(!a.deleted);
}

#[test]
fn test_deleting_the_running_task_finalizes_its_entry() {
    let t0 = t0();
    let state = reduce(state_with(&["A"]), &start("A"), t0);
    let state = reduce(
        state,
        &Action::DeleteTask { exid: "A".into() },
        t0 + Duration::hours(2),
    );

    assert!(state.new_entry.is_none());
    assert!(state.current_task.is_none());
    assert_eq!(state.entries.len(), 1);
    assert_eq!(state.entries[0].duration_hours(), Some(2.0));
    assert_eq!(state.deleted_tasks[0].timing_state, TimingState::Stop);
}

#[test]
fn test_deleting_another_task_keeps_timer_running() {
    let t0 = t0();
    let state = reduce(state_with(&["A", "B"]), &start("A"), t0);
    let state = reduce(
        state,
        &Action::DeleteTask { exid: "B".into() },
        t0 + Duration::hours(1),
    );

    assert!(state.entries.is_empty());
    assert_eq!(state.current_task.as_deref(), Some("A"));
    assert!(state.task("A").unwrap().is_running());
}

#[test]
fn test_unknown_exid_leaves_state_unchanged() {
    let now = Local::now();
    let state = reduce(state_with(&["A"]), &stop("A"), now);

    for action in [
        Action::TaskComplete {
            exid: "X".into(),
            complete: true,
        },
        Action::DeleteTask { exid: "X".into() },
        Action::RestoreTask { exid: "X".into() },
        Action::UpdateTask {
            exid: "X".into(),
            description: Some("d".into()),
            project: None,
            client: None,
        },
    ] {
        assert_eq!(reduce(state.clone(), &action, now), state);
    }
}

#[test]
fn test_update_task_clears_with_empty_strings() {
    let mut state = AppState::default();
    state.tasks.push(task("A", "old").with_project("p").with_client("c"));

    let state = reduce(
        state,
        &Action::UpdateTask {
            exid: "A".into(),
            description: Some("  new  ".into()),
            project: Some("".into()),
            client: None,
        },
        Local::now(),
    );

    let a = state.task("A").unwrap();
    assert_eq!(a.description, "new");
    assert!(a.project.is_none());
    assert_eq!(a.client.as_deref(), Some("c"));
}

#[test]
fn test_annotate_and_delete_entry() {
    let t0 = t0();
    let mut state = state_with(&["A"]);
    state.entries = vec![entry(1, "A", t0, 1.0), entry(2, "A", t0 + Duration::hours(1), 1.0)];

    let state = reduce_all(
        state,
        &[
            Action::AnnotateEntry {
                id: 1,
                annotation: "kickoff".into(),
            },
            Action::DeleteEntry { id: 2 },
        ],
        t0,
    );

    assert_eq!(state.entries[0].annotation, "kickoff");
    assert!(state.entries[1].deleted);
    assert_eq!(state.task("A").unwrap().total, 1.0);
}

#[test]
fn test_clients_are_sorted_and_unique() {
    let mut state = AppState {
        clients: vec!["zeta".into()],
        ..AppState::default()
    };
    state.tasks = vec![
        task("A", "a").with_client("beta"),
        task("B", "b").with_client("alpha"),
        task("C", "c").with_client("beta"),
        task("D", "d").with_client(""),
    ];

    let tasks = state.tasks.clone();
    let state = reduce(state, &Action::ReplaceTasks(tasks), Local::now());
    assert_eq!(state.clients, vec!["alpha", "beta", "zeta"]);
}

#[test]
fn test_hydrate_hides_session_deleted_tasks() {
    let mut gone = task("B", "deleted this session");
    gone.deleted = true;

    let state = hydrate(PartialState {
        tasks: Some(vec![task("A", "a"), task("B", "b")]),
        deleted_tasks: Some(vec![gone]),
        ..PartialState::default()
    });

    assert_eq!(state.tasks.len(), 1);
    assert_eq!(state.tasks[0].exid, "A");
    assert_eq!(state.deleted_tasks.len(), 1);
}
