//! todo.txt codec.
//!
//! Line format: `[x YYYY-MM-DD ]#exid description +project client:name`.
//! Absent optional fields are omitted together with their marker. Token
//! names are ASCII word characters; anything else ends the token.

use crate::models::Task;
use crate::utils::date::{format_date, parse_date, today};
use chrono::{Local, NaiveDate};
use regex::Regex;
use std::sync::LazyLock;

static COMPLETED_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^x ([0-9]{4}-[0-9]{2}-[0-9]{2}) ").unwrap());
static EXID_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#((?-u:\w)+)").unwrap());
static PROJECT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+((?-u:\w)+)").unwrap());
static CLIENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"client:((?-u:\w)+)").unwrap());

/// Serialize one task, using today's date for completed tasks without one.
pub fn task_to_line(task: &Task) -> String {
    task_to_line_on(task, today())
}

/// Serialize one task; `fallback_date` stands in for a missing completion date.
pub fn task_to_line_on(task: &Task, fallback_date: NaiveDate) -> String {
    let mut parts: Vec<String> = Vec::new();

    if task.complete {
        let date = task.completed_date.unwrap_or(fallback_date);
        parts.push(format!("x {}", format_date(&date)));
    }
    if task.has_exid() {
        parts.push(format!("#{}", task.exid));
    }
    if !task.description.is_empty() {
        parts.push(task.description.clone());
    }
    if let Some(project) = task.project_name() {
        parts.push(format!("+{project}"));
    }
    if let Some(client) = task.client_name() {
        parts.push(format!("client:{client}"));
    }

    parts.join(" ")
}

/// Take the first match of `pattern` out of `rest`, returning its capture.
fn extract(pattern: &Regex, rest: &mut String) -> Option<String> {
    let captured = pattern.captures(rest.as_str())?.get(1)?.as_str().to_string();
    let remaining = pattern.replace(rest.as_str(), "").into_owned();
    *rest = remaining;
    Some(captured)
}

/// Tokens found in free text: `#exid`, `+project`, `client:name`, and the
/// remaining description.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tokens {
    pub exid: Option<String>,
    pub project: Option<String>,
    pub client: Option<String>,
    pub description: String,
}

/// Take the first `#exid`, `+project` and `client:name` out of `text`.
pub fn split_tokens(text: &str) -> Tokens {
    let mut rest = text.to_string();
    let exid = extract(&EXID_PATTERN, &mut rest);
    let project = extract(&PROJECT_PATTERN, &mut rest);
    let client = extract(&CLIENT_PATTERN, &mut rest);

    Tokens {
        exid,
        project,
        client,
        description: rest.trim().to_string(),
    }
}

/// Parse one line. Blank lines yield `None`.
///
/// Only the descriptive fields are filled in; a task without `#exid` comes
/// back with an empty exid.
pub fn line_to_task(line: &str) -> Option<Task> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return None;
    }

    let mut task = Task::new("", "", Local::now());
    let mut rest = line;

    if let Some(caps) = COMPLETED_PATTERN.captures(line) {
        task.complete = true;
        task.completed_date = caps.get(1).and_then(|m| parse_date(m.as_str()));
        rest = &line[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
    }

    let tokens = split_tokens(rest);
    task.exid = tokens.exid.unwrap_or_default();
    task.project = tokens.project;
    task.client = tokens.client;
    task.description = tokens.description;

    Some(task)
}

fn join_lines<'a>(tasks: impl Iterator<Item = &'a Task>) -> String {
    tasks.map(task_to_line).collect::<Vec<_>>().join("\n")
}

/// Open, non-deleted tasks, one per line, no trailing newline.
pub fn tasks_to_todo_txt(tasks: &[Task]) -> String {
    join_lines(tasks.iter().filter(|t| !t.complete && !t.deleted))
}

/// Completed, non-deleted tasks, one per line, no trailing newline.
pub fn tasks_to_done_txt(tasks: &[Task]) -> String {
    join_lines(tasks.iter().filter(|t| t.complete && !t.deleted))
}

/// Parse a whole file, skipping blank and whitespace-only lines.
pub fn parse_todo_txt(text: &str) -> Vec<Task> {
    text.lines().filter_map(line_to_task).collect()
}
