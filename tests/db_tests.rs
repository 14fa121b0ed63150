use chrono::{Duration, Local};
use timesheet::db::migrate::{BACKUP_KEY, DB_VERSION, LEGACY_KEY, user_version};
use timesheet::db::{TimesheetDb, UpdateOptions};
use timesheet::errors::AppError;
use timesheet::store::KeyValueStorage;
use timesheet::utils::date::start_of_today;

mod common;
use common::{entry, old_task, setup_test_home, task};

fn open_db() -> TimesheetDb {
    TimesheetDb::open_in_memory(None).expect("open db")
}

#[test]
fn test_schema_is_created_at_current_version() {
    let db = open_db();
    assert_eq!(user_version(&db.conn).unwrap(), DB_VERSION);

    let applied: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(applied, 3);
}

#[test]
fn test_reopening_does_not_rerun_migrations() {
    let home = setup_test_home("db_reopen");
    let path = home.join("t.sqlite").to_string_lossy().to_string();

    TimesheetDb::open(&path, None).unwrap();
    let db = TimesheetDb::open(&path, None).unwrap();

    let applied: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'migration_applied'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(applied, 3);
}

#[test]
fn test_add_task_assigns_id_and_exid() {
    let db = open_db();
    let stored = db.add_task(&task("", "No exid yet")).unwrap();

    assert!(stored.id > 0);
    assert_eq!(stored.exid, stored.id.to_string());
    assert_eq!(db.get_task(&stored.exid).unwrap().unwrap().description, "No exid yet");
}

#[test]
fn test_add_task_duplicate_exid_is_constraint_error() {
    let db = open_db();
    db.add_task(&task("A", "first")).unwrap();

    let err = db.add_task(&task("A", "second")).unwrap_err();
    assert!(err.is_constraint());
    assert!(matches!(err, AppError::Constraint { store: "tasks", .. }));
}

#[test]
fn test_deleted_task_frees_its_exid() {
    let db = open_db();
    let mut first = db.add_task(&task("A", "first")).unwrap();
    first.deleted = true;
    db.update_task(&first, UpdateOptions::default()).unwrap();

    let second = db.add_task(&task("A", "second")).unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(db.get_task("A").unwrap().unwrap().description, "second");
}

#[test]
fn test_update_unchanged_task_keeps_last_modified() {
    let db = open_db();
    let stored = db.add_task(&old_task("A", "yesterday's work", 1)).unwrap();

    let again = db.update_task(&stored, UpdateOptions::default()).unwrap();
    assert_eq!(
        again.last_modified.timestamp_millis(),
        stored.last_modified.timestamp_millis()
    );

    let reloaded = db.get_task("A").unwrap().unwrap();
    assert_eq!(
        reloaded.last_modified.timestamp_millis(),
        stored.last_modified.timestamp_millis()
    );
}

#[test]
fn test_update_changed_task_sets_last_modified_to_now() {
    let db = open_db();
    let stored = db.add_task(&old_task("A", "old text", 3)).unwrap();

    let mut changed = stored.clone();
    changed.description = "new text".into();
    let updated = db.update_task(&changed, UpdateOptions::default()).unwrap();

    assert_eq!(updated.last_modified.date_naive(), Local::now().date_naive());
    assert_eq!(updated.id, stored.id);
}

#[test]
fn test_update_preserving_timestamp() {
    let db = open_db();
    let stored = db.add_task(&old_task("A", "old text", 3)).unwrap();

    let mut changed = stored.clone();
    changed.total = 1.25;
    let updated = db
        .update_task(&changed, UpdateOptions::preserving_timestamp())
        .unwrap();

    assert_eq!(
        updated.last_modified.timestamp_millis(),
        stored.last_modified.timestamp_millis()
    );
    assert_eq!(db.get_task("A").unwrap().unwrap().total, 1.25);
}

#[test]
fn test_update_missing_task_is_not_found() {
    let db = open_db();
    let err = db
        .update_task(&task("nope", "x"), UpdateOptions::default())
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound { store: "tasks", .. }));
}

#[test]
fn test_upsert_task_falls_back_to_update() {
    let db = open_db();
    let stored = db.add_task(&task("A", "v1")).unwrap();

    let mut next = task("A", "v2");
    next.id = 0;
    let upserted = db.upsert_task(&next, UpdateOptions::default()).unwrap();

    assert_eq!(upserted.id, stored.id);
    assert_eq!(db.get_all_tasks().unwrap().len(), 1);
    assert_eq!(db.get_task("A").unwrap().unwrap().description, "v2");
}

#[test]
fn test_recent_tasks_exclude_today_and_deleted() {
    let db = open_db();
    db.add_task(&task("TODAY", "modified today")).unwrap();
    db.add_task(&old_task("D1", "one day ago", 1)).unwrap();
    db.add_task(&old_task("D3", "three days ago", 3)).unwrap();
    db.add_task(&old_task("D2", "two days ago", 2)).unwrap();
    let mut gone = old_task("GONE", "deleted", 1);
    gone.deleted = true;
    db.add_task(&gone).unwrap();

    let recent = db.get_recent_tasks(10).unwrap();
    let exids: Vec<&str> = recent.iter().map(|t| t.exid.as_str()).collect();
    assert_eq!(exids, vec!["D1", "D2", "D3"]);

    let cutoff = start_of_today();
    assert!(recent.iter().all(|t| t.last_modified < cutoff));

    assert_eq!(db.get_recent_tasks(2).unwrap().len(), 2);
}

#[test]
fn test_today_filter() {
    let db = open_db();
    db.add_task(&task("NEW", "added today")).unwrap();
    db.add_task(&old_task("OLD", "untouched", 2)).unwrap();
    let mut worked = old_task("WORKED", "entry today", 2);
    worked.most_recent_entry = Local::now();
    db.add_task(&worked).unwrap();

    let today = Local::now().date_naive();
    let mut exids: Vec<String> = db
        .tasks_on_day(today)
        .unwrap()
        .into_iter()
        .map(|t| t.exid)
        .collect();
    exids.sort();
    assert_eq!(exids, vec!["NEW", "WORKED"]);

    let now = Local::now();
    db.add_entry(&entry(1, "NEW", now, 0.25)).unwrap();
    db.add_entry(&entry(2, "OLD", now - Duration::days(2), 1.0))
        .unwrap();
    let entries = db.entries_on_day(today).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, 1);
}

#[test]
fn test_entry_upsert_and_unchanged_update() {
    let db = open_db();
    let start = Local::now() - Duration::days(1);
    let mut e = entry(7, "A", start, 1.0);
    e.last_modified = start;
    let stored = db.add_entry(&e).unwrap();

    assert!(db.add_entry(&e).unwrap_err().is_constraint());

    let same = db.upsert_entry(&e, UpdateOptions::default()).unwrap();
    assert_eq!(
        same.last_modified.timestamp_millis(),
        stored.last_modified.timestamp_millis()
    );

    let mut annotated = e.clone();
    annotated.annotation = "notes".into();
    let changed = db.upsert_entry(&annotated, UpdateOptions::default()).unwrap();
    assert_eq!(changed.last_modified.date_naive(), Local::now().date_naive());
    assert_eq!(db.get_entry(7).unwrap().unwrap().annotation, "notes");
}

#[test]
fn test_entry_id_held_by_another_entry_is_reassigned() {
    let db = open_db();
    let now = Local::now();
    let legacy = db
        .add_entry(&entry(42, "OLD", now - Duration::days(3), 2.0))
        .unwrap();

    let fresh = entry(42, "NEW", now, 0.5);
    let stored = db.upsert_entry(&fresh, UpdateOptions::default()).unwrap();
    assert_ne!(stored.id, 42);
    assert_eq!(stored.task, "NEW");

    let kept = db.get_entry(42).unwrap().unwrap();
    assert_eq!(kept.task, "OLD");
    assert_eq!(kept.start.timestamp_millis(), legacy.start.timestamp_millis());

    // Writing the same interval again updates the reassigned row.
    let mut annotated = fresh.clone();
    annotated.annotation = "second write".into();
    let again = db.upsert_entry(&annotated, UpdateOptions::default()).unwrap();
    assert_eq!(again.id, stored.id);
    assert_eq!(db.get_all_entries().unwrap().len(), 2);
    assert_eq!(
        db.get_entry(stored.id).unwrap().unwrap().annotation,
        "second write"
    );
}

#[test]
fn test_get_all_includes_deleted_records() {
    let db = open_db();
    db.add_task(&task("A", "live")).unwrap();
    let mut b = task("B", "gone");
    b.deleted = true;
    db.add_task(&b).unwrap();

    let all = db.get_all_tasks().unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().any(|t| t.deleted));
}

#[test]
fn test_cursor_batches_and_early_drop() {
    let db = open_db();
    for i in 1..=25 {
        db.add_entry(&entry(i, "A", Local::now(), 0.1)).unwrap();
    }

    let ids: Vec<i64> = db
        .entries_cursor(4)
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(ids, (1..=25).collect::<Vec<_>>());

    let first_three: Vec<i64> = db
        .entries_cursor(10)
        .take(3)
        .map(|r| r.unwrap().id)
        .collect();
    assert_eq!(first_three, vec![1, 2, 3]);

    // The connection stays usable after an abandoned cursor.
    db.add_entry(&entry(100, "A", Local::now(), 0.1)).unwrap();
    assert_eq!(db.get_all_entries().unwrap().len(), 26);
}

#[test]
fn test_search_tasks_pages() {
    let db = open_db();
    for i in 0..5 {
        db.add_task(&task(&format!("ACME{i}"), "client work").with_client("acme"))
            .unwrap();
    }
    db.add_task(&task("OTHER", "Something else")).unwrap();

    let (page, total) = db.search_tasks(Some("Acme"), 0, 2).unwrap();
    assert_eq!(total, 5);
    assert_eq!(page.len(), 2);

    let (last, _) = db.search_tasks(Some("acme"), 2, 2).unwrap();
    assert_eq!(last.len(), 1);

    let (by_desc, total) = db.search_tasks(Some("ELSE"), 0, 10).unwrap();
    assert_eq!(total, 1);
    assert_eq!(by_desc[0].exid, "OTHER");

    let (everything, total) = db.search_tasks(None, 0, 0).unwrap();
    assert_eq!(total, 6);
    assert_eq!(everything.len(), 6);
}

#[test]
fn test_permanent_delete_is_logged() {
    let db = open_db();
    db.add_task(&task("A", "x")).unwrap();
    db.add_entry(&entry(1, "A", Local::now(), 1.0)).unwrap();

    assert_eq!(db.permanently_delete_task("A").unwrap(), 1);
    assert_eq!(db.permanently_delete_entry(1).unwrap(), 1);
    assert!(db.get_task("A").unwrap().is_none());
    assert!(db.get_entry(1).unwrap().is_none());

    let logged: i64 = db
        .conn
        .query_row(
            "SELECT COUNT(*) FROM log WHERE operation = 'permanent_delete'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(logged, 2);
}

#[test]
fn test_legacy_archive_is_imported_once() {
    let home = setup_test_home("db_legacy_import");
    let storage = KeyValueStorage::open(home.join("local.json")).unwrap();
    storage
        .set_item(
            LEGACY_KEY,
            r##"{
                "version": 1,
                "archive": {
                    "tasks": [
                        {"exid": "L1", "id": 11, "description": "legacy one", "lastModified": 1700000000000},
                        {"id": 0, "description": "no ids"},
                        {"exid": "L1", "id": 12, "description": "duplicate exid"},
                        "not a task"
                    ],
                    "entries": [
                        {"id": 5, "task": "L1", "start": "2023-11-14T22:13:20Z", "end": 1700003600000},
                        {"id": 6, "task": "L1"}
                    ]
                }
            }"##,
        )
        .unwrap();

    let path = home.join("t.sqlite").to_string_lossy().to_string();
    let db = TimesheetDb::open(&path, Some(&storage)).unwrap();

    let tasks = db.get_all_tasks().unwrap();
    assert_eq!(tasks.len(), 2);
    let l1 = db.get_task("L1").unwrap().unwrap();
    assert_eq!(l1.description, "legacy one");
    assert_eq!(l1.last_modified.timestamp_millis(), 1_700_000_000_000);

    let unnamed = tasks.iter().find(|t| t.exid != "L1").unwrap();
    assert_eq!(unnamed.exid, unnamed.id.to_string());

    let entries = db.get_all_entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start.timestamp_millis(), 1_700_000_000_000);
    drop(db);

    let db = TimesheetDb::open(&path, Some(&storage)).unwrap();
    assert_eq!(db.get_all_tasks().unwrap().len(), 2);
    assert_eq!(db.get_all_entries().unwrap().len(), 1);
}

#[test]
fn test_legacy_import_falls_back_to_backup() {
    let storage = KeyValueStorage::in_memory();
    storage.set_item(LEGACY_KEY, "{ not json").unwrap();
    storage
        .set_item(
            BACKUP_KEY,
            r#"{"archive": {"tasks": [{"exid": "B1", "id": 1, "description": "from backup"}]}}"#,
        )
        .unwrap();

    let db = TimesheetDb::open_in_memory(Some(&storage)).unwrap();
    assert_eq!(db.get_task("B1").unwrap().unwrap().description, "from backup");
}
