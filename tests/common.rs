#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use chrono::{DateTime, Duration, Local};
use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use timesheet::app::App;
use timesheet::config::Config;
use timesheet::db::{SharedDb, TimesheetDb};
use timesheet::models::{Entry, Task};
use timesheet::sync::MemoryFiles;

pub fn ts() -> Command {
    cargo_bin_cmd!("timesheet")
}

/// Create a unique, empty config directory inside the system temp dir
pub fn setup_test_home(name: &str) -> PathBuf {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_timesheet_home", name));
    fs::remove_dir_all(&path).ok();
    fs::create_dir_all(&path).expect("create test home");
    path
}

/// Defaults inside `dir`, with a short sync debounce.
pub fn test_config(dir: &PathBuf) -> Config {
    Config {
        sync_debounce_ms: 20,
        ..Config::defaults_in(dir)
    }
}

/// An app over a fresh home directory and in-memory todo files.
pub fn open_test_app(name: &str) -> (App, Arc<MemoryFiles>) {
    let home = setup_test_home(name);
    let files = Arc::new(MemoryFiles::new());
    let app = App::with_files(test_config(&home), files.clone()).expect("open app");
    (app, files)
}

pub fn memory_db() -> SharedDb {
    TimesheetDb::open_in_memory(None)
        .expect("open in-memory db")
        .into_shared()
}

pub fn task(exid: &str, description: &str) -> Task {
    Task::new(exid, description, Local::now())
}

/// A task last modified `days` days ago.
pub fn old_task(exid: &str, description: &str, days: i64) -> Task {
    let then = Local::now() - Duration::days(days);
    Task::new(exid, description, then)
}

pub fn entry(id: i64, task: &str, start: DateTime<Local>, hours: f64) -> Entry {
    let end = start + Duration::milliseconds((hours * 3_600_000.0) as i64);
    Entry::new(id, task, start, Some(end))
}
