use crate::app::App;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::models::{AppState, Entry, Task};
use crate::store::ReadQuery;
use crate::ui::messages::{field, header, info};
use crate::utils::colors::{RESET, color_for_synced, color_for_timing, colorize_optional};
use crate::utils::date::{format_date, today};
use crate::utils::format_hours;
use crate::utils::table::{Column, Table};
use crate::utils::time::{format_clock, hours_between};
use chrono::Local;

pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    if let Commands::List {
        history,
        archive,
        search,
        page,
        entries,
    } = cmd
    {
        if *history {
            let tasks = {
                let db = app.db.lock().await;
                db.get_recent_tasks(app.cfg.recent_limit)?
            };
            print_history(&tasks);
        } else if *archive {
            let query = ReadQuery::default()
                .with_search(search.as_deref().unwrap_or_default())
                .with_page(page.saturating_sub(1), app.cfg.page_size);
            let state = app.load(&query).await?;
            print_archive(&state, *page, app.total_pages());
        } else {
            let state = app.load(&ReadQuery::default()).await?;
            print_today(&state, *entries);
        }
    }
    Ok(())
}

fn text_or_dash(value: Option<&str>) -> String {
    colorize_optional(value.unwrap_or_default())
}

fn task_table(tasks: &[Task]) -> Table {
    let mut table = Table::new(vec![
        Column::new("EXID", 14),
        Column::new("DESCRIPTION", 34),
        Column::new("PROJECT", 12),
        Column::new("CLIENT", 12),
        Column::new("TOTAL", 8).right(),
        Column::new("DONE", 4),
        Column::new("STATE", 6),
    ]);

    for task in tasks {
        let state = format!(
            "{}{}{}{}",
            color_for_timing(task.is_running()),
            if task.is_running() { "●" } else { "○" },
            color_for_synced(task.synced),
            if task.synced { " synced" } else { " open" },
        );
        table.add_row(vec![
            format!("#{}", task.exid),
            task.description.clone(),
            text_or_dash(task.project_name()),
            text_or_dash(task.client_name()),
            format_hours(task.total),
            if task.complete { "x" } else { "" }.to_string(),
            format!("{state}{RESET}"),
        ]);
    }
    table
}

fn entry_table(entries: &[Entry], state: &AppState) -> Table {
    let mut table = Table::new(vec![
        Column::new("ID", 14),
        Column::new("TASK", 14),
        Column::new("START", 6),
        Column::new("END", 6),
        Column::new("HOURS", 8).right(),
        Column::new("GAP", 8).right(),
        Column::new("ANNOTATION", 30),
    ]);

    for entry in entries.iter().filter(|e| !e.deleted) {
        table.add_row(vec![
            entry.id.to_string(),
            format!("#{}", entry.task),
            format_clock(&entry.start),
            entry.end.as_ref().map(format_clock).unwrap_or_default(),
            entry.duration_hours().map(format_hours).unwrap_or_default(),
            entry.gap.map(format_hours).unwrap_or_default(),
            entry.annotation.clone(),
        ]);
    }

    if let Some(open) = &state.new_entry {
        table.add_row(vec![
            "(running)".to_string(),
            format!("#{}", open.task),
            format_clock(&open.start),
            String::new(),
            format_hours(hours_between(&open.start, &Local::now())),
            String::new(),
            open.annotation.clone(),
        ]);
    }
    table
}

fn print_today(state: &AppState, with_entries: bool) {
    header(format!("Today {}", format_date(&today())));

    if state.tasks.is_empty() {
        info("No tasks for today. Add one with `timesheet add`.");
    } else {
        let mut tasks = state.tasks.clone();
        tasks.sort_by(|a, b| b.most_recent_entry.cmp(&a.most_recent_entry));
        print!("{}", task_table(&tasks).render());
    }

    if with_entries {
        let table = entry_table(&state.entries, state);
        if table.is_empty() {
            info("No time entries today.");
        } else {
            println!();
            print!("{}", table.render());
        }
    }

    println!();
    let stats = &state.stats;
    field("Total", format_hours(stats.total_hours));
    field("Synced", format_hours(stats.synced_hours));
    field("Unsynced", format_hours(stats.unsynced_hours));
    if state.settings.rate > 0.0 {
        field("Earnings", format!("{:.2}", stats.earnings));
        field("Tax", format!("{:.2}", stats.tax_amount));
        field("Net", format!("{:.2}", stats.net));
    }
    if let Some(current) = &state.current_task {
        field("Timing", format!("#{current}"));
    }
}

fn print_history(tasks: &[Task]) {
    if tasks.is_empty() {
        info("No previous tasks.");
        return;
    }

    let mut table = Table::new(vec![
        Column::new("LAST MODIFIED", 17),
        Column::new("EXID", 14),
        Column::new("DESCRIPTION", 34),
        Column::new("CLIENT", 12),
    ]);
    for task in tasks {
        table.add_row(vec![
            task.last_modified.format("%Y-%m-%d %H:%M").to_string(),
            format!("#{}", task.exid),
            task.description.clone(),
            text_or_dash(task.client_name()),
        ]);
    }

    header("Previous tasks");
    print!("{}", table.render());
}

fn print_archive(state: &AppState, page: usize, total_pages: usize) {
    header("Archive");

    if state.archive.tasks.is_empty() {
        info("No matching tasks.");
    } else {
        print!("{}", task_table(&state.archive.tasks).render());
        println!();
        field("Entries", state.archive.entries.len());
    }
    field("Page", format!("{} of {}", page.max(1), total_pages.max(1)));
}
