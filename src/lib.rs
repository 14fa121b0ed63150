//! timesheet library root.
//! Exposes the CLI parser, the high-level run() function, and the core
//! modules: database, multi-adapter store, todo.txt sync and reducer.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod store;
pub mod sync;
pub mod ui;
pub mod utils;

use app::App;
use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::Path;

/// Central command dispatcher
pub async fn dispatch(cli: &Cli, cfg: Config, dir: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init => return commands::init::handle(&cfg, dir).await,
        Commands::Config { .. } => return commands::config::handle(&cli.command, &cfg, dir),
        _ => {}
    }

    let app = App::open(cfg)?;
    match &cli.command {
        Commands::Db { .. } => commands::db::handle(&cli.command, &app).await,
        Commands::Log { .. } => commands::log::handle(&cli.command, &app).await,
        Commands::List { .. } => commands::list::handle(&cli.command, &app).await,
        Commands::Settings { .. } => commands::settings::handle(&cli.command, &app).await,
        Commands::Annotate { .. } | Commands::DelEntry { .. } => {
            commands::entry::handle(&cli.command, &app).await
        }
        Commands::Link { .. } | Commands::Unlink { .. } | Commands::Sync => {
            commands::link::handle(&cli.command, &app).await
        }
        Commands::Purge { .. } => commands::purge::handle(&cli.command, &app).await,
        _ => commands::task::handle(&cli.command, &app).await,
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let dir = Config::config_dir(cli.home.as_deref());
    let mut cfg = Config::load(&dir)?;

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(dispatch(&cli, cfg, &dir))
}
