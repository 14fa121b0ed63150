use chrono::NaiveDate;
use rstest::rstest;
use timesheet::sync::todo_txt::{
    line_to_task, parse_todo_txt, split_tokens, task_to_line, task_to_line_on, tasks_to_done_txt,
    tasks_to_todo_txt,
};
use timesheet::utils::date::{format_date, today};

mod common;
use common::task;

#[test]
fn test_task_to_line_all_fields() {
    let t = task("T001", "Build login page")
        .with_project("website")
        .with_client("acme");

    assert_eq!(task_to_line(&t), "#T001 Build login page +website client:acme");
}

#[test]
fn test_task_to_line_completed_with_date() {
    let mut t = task("T003", "Done task").with_project("proj").with_client("cli");
    t.complete = true;
    t.completed_date = NaiveDate::from_ymd_opt(2026, 2, 8);

    assert_eq!(task_to_line(&t), "x 2026-02-08 #T003 Done task +proj client:cli");
}

#[test]
fn test_task_to_line_completed_defaults_to_today() {
    let mut t = task("T004", "Finished");
    t.complete = true;

    let expected = format!("x {} #T004 Finished", format_date(&today()));
    assert_eq!(task_to_line(&t), expected);

    let fixed = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    assert_eq!(task_to_line_on(&t, fixed), "x 2025-01-02 #T004 Finished");
}

#[rstest]
#[case::only_exid(task("A", ""), "#A")]
#[case::empty_project_omitted(task("B", "Text").with_project(""), "#B Text")]
#[case::empty_client_omitted(task("C", "Text").with_client(""), "#C Text")]
#[case::no_exid(task("", "Just text"), "Just text")]
fn test_task_to_line_omits_absent_fields(#[case] t: timesheet::models::Task, #[case] line: &str) {
    assert_eq!(task_to_line(&t), line);
}

#[test]
fn test_tasks_to_todo_txt_keeps_open_tasks_in_order() {
    let mut b = task("B", "Done");
    b.complete = true;
    let tasks = vec![task("A", "Active"), b, task("C", "Also active")];

    assert_eq!(tasks_to_todo_txt(&tasks), "#A Active\n#C Also active");
}

#[test]
fn test_tasks_to_done_txt_skips_deleted() {
    let mut done = task("D", "Shipped");
    done.complete = true;
    done.completed_date = NaiveDate::from_ymd_opt(2026, 3, 1);
    let mut gone = done.clone();
    gone.exid = "E".into();
    gone.deleted = true;

    let tasks = vec![task("A", "Active"), done, gone];
    assert_eq!(tasks_to_done_txt(&tasks), "x 2026-03-01 #D Shipped");
    assert_eq!(tasks_to_todo_txt(&[]), "");
}

#[rstest]
#[case("#T001 Build login page +website client:acme", "T001", "Build login page", Some("website"), Some("acme"))]
#[case("Build +website login #T001 page", "T001", "Build  login  page", Some("website"), None)]
#[case("client:acme Call back", "", "Call back", None, Some("acme"))]
#[case("   plain text   ", "", "plain text", None, None)]
#[case("#café Menu", "caf", "é Menu", None, None)]
fn test_line_to_task_extracts_tokens(
    #[case] line: &str,
    #[case] exid: &str,
    #[case] description: &str,
    #[case] project: Option<&str>,
    #[case] client: Option<&str>,
) {
    let t = line_to_task(line).expect("parsed");
    assert_eq!(t.exid, exid);
    assert_eq!(t.description, description);
    assert_eq!(t.project.as_deref(), project);
    assert_eq!(t.client.as_deref(), client);
    assert!(!t.complete);
}

#[test]
fn test_line_to_task_completion_marker() {
    let t = line_to_task("x 2026-02-08 #T003 Done task +proj client:cli").expect("parsed");
    assert!(t.complete);
    assert_eq!(t.completed_date, NaiveDate::from_ymd_opt(2026, 2, 8));
    assert_eq!(t.exid, "T003");
    assert_eq!(t.description, "Done task");
}

#[rstest]
#[case::not_at_start("#A x 2026-02-08 text")]
#[case::no_space_after_date("x 2026-02-08#A text")]
#[case::uppercase("X 2026-02-08 #A text")]
fn test_line_to_task_completion_must_lead(#[case] line: &str) {
    let t = line_to_task(line).expect("parsed");
    assert!(!t.complete);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\t")]
fn test_line_to_task_blank_is_none(#[case] line: &str) {
    assert!(line_to_task(line).is_none());
}

#[test]
fn test_only_first_token_of_each_kind_is_extracted() {
    let tokens = split_tokens("#A #B fix +one +two client:x client:y");
    assert_eq!(tokens.exid.as_deref(), Some("A"));
    assert_eq!(tokens.project.as_deref(), Some("one"));
    assert_eq!(tokens.client.as_deref(), Some("x"));
    assert_eq!(tokens.description, "#B fix  +two  client:y");
}

#[test]
fn test_round_trip_preserves_descriptive_fields() {
    let tasks = vec![
        task("T1", "Write report").with_project("q3").with_client("acme"),
        task("T2", "Review").with_client("globex"),
        task("T3", "Plan sprint").with_project("team"),
    ];

    for original in &tasks {
        let parsed = line_to_task(&task_to_line(original)).expect("parsed");
        assert_eq!(parsed.exid, original.exid);
        assert_eq!(parsed.description, original.description);
        assert_eq!(parsed.project, original.project);
        assert_eq!(parsed.client, original.client);
        assert_eq!(parsed.complete, original.complete);
    }
}

#[test]
fn test_parse_todo_txt_skips_blank_lines() {
    let tasks = parse_todo_txt("#A First\n\n  \n#B Second\n");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].exid, "A");
    assert_eq!(tasks[1].description, "Second");
}

#[test]
fn test_parse_todo_txt_handles_crlf() {
    let tasks = parse_todo_txt("#A First\r\n#B Second\r\n");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].description, "First");
}
