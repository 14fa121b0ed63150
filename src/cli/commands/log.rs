use crate::app::App;
use crate::cli::parser::Commands;
use crate::db::log::load_log;
use crate::errors::AppResult;
use crate::ui::messages::{header, info};
use crate::utils::table::{Column, Table};

pub async fn handle(cmd: &Commands, app: &App) -> AppResult<()> {
    if let Commands::Log { print: true, limit } = cmd {
        let rows = {
            let db = app.db.lock().await;
            load_log(&db.conn, *limit)?
        };

        if rows.is_empty() {
            info("The internal log is empty.");
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("DATE", 26),
            Column::new("OPERATION", 20),
            Column::new("TARGET", 22),
            Column::new("MESSAGE", 40),
        ]);
        for (date, operation, target, message) in rows {
            table.add_row(vec![date, operation, target, message]);
        }

        header("Internal log");
        print!("{}", table.render());
    }

    Ok(())
}
