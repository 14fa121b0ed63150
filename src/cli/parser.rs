use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Command-line interface definition for timesheet
/// Track tasks and time entries, synced with todo.txt files
#[derive(Parser)]
#[command(
    name = "timesheet",
    version = env!("CARGO_PKG_VERSION"),
    about = "A personal timesheet: track tasks and time entries, synced with todo.txt files",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Override the configuration directory (default: ~/.timesheet)
    #[arg(global = true, long = "home", value_name = "DIR")]
    pub home: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Linked todo.txt files
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LinkKind {
    Todo,
    Done,
}

impl LinkKind {
    pub fn link_id(self) -> &'static str {
        match self {
            LinkKind::Todo => crate::sync::TODO_LINK,
            LinkKind::Done => crate::sync::DONE_LINK,
        }
    }

    pub fn default_file(self) -> &'static str {
        match self {
            LinkKind::Todo => "todo.txt",
            LinkKind::Done => "done.txt",
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the configuration, local storage and database
    Init,

    /// Show the configuration file
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,
    },

    /// Inspect or maintain the database
    Db {
        #[arg(long = "info", help = "Show database information")]
        info: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,

        #[arg(long, default_value_t = 50, help = "Maximum number of rows")]
        limit: usize,
    },

    /// Add a task: free text with optional #exid, +project and client:name tokens
    Add {
        #[arg(required = true, num_args = 1.., help = "Task text")]
        text: Vec<String>,

        #[arg(long, help = "External id (overrides a #token in the text)")]
        exid: Option<String>,

        #[arg(long, help = "Client (overrides a client: token in the text)")]
        client: Option<String>,
    },

    /// Edit a task's description, project or client
    Edit {
        exid: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, help = "Project (empty string clears it)")]
        project: Option<String>,

        #[arg(long, help = "Client (empty string clears it)")]
        client: Option<String>,
    },

    /// Start timing a task (stops the task currently timing)
    Start { exid: String },

    /// Stop timing (defaults to the task currently timing)
    Stop { exid: Option<String> },

    /// Mark a task complete (also marks it and its entries synced)
    Done {
        exid: String,

        #[arg(long, help = "Mark the task open again")]
        undo: bool,
    },

    /// Mark a task and its entries as synced
    Synced {
        exid: String,

        #[arg(long, help = "Mark as not synced")]
        undo: bool,
    },

    /// Delete a task (soft delete, see `restore`)
    Del { exid: String },

    /// Restore a deleted task
    Restore { exid: String },

    /// Set the annotation of a time entry
    Annotate {
        id: i64,

        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Delete a time entry (soft delete)
    DelEntry { id: i64 },

    /// List today's tasks and entries, previous tasks or the archive
    List {
        #[arg(long = "history", help = "Show previous tasks (not modified today)")]
        history: bool,

        #[arg(long = "archive", help = "Browse the archive page by page")]
        archive: bool,

        #[arg(long, requires = "archive", help = "Filter by description, client or exid")]
        search: Option<String>,

        #[arg(long, requires = "archive", default_value_t = 1, help = "Archive page (1-based)")]
        page: usize,

        #[arg(long = "entries", help = "Also list today's time entries")]
        entries: bool,
    },

    /// Show or change rate, tax, focus interval and color
    Settings {
        #[arg(long)]
        rate: Option<f64>,

        #[arg(long, help = "Tax in percent")]
        tax: Option<f64>,

        #[arg(long = "focus", help = "Focus interval in hours")]
        focus_interval: Option<f64>,

        #[arg(long)]
        color: Option<String>,
    },

    /// Link a todo.txt or done.txt file
    Link {
        #[arg(value_enum)]
        kind: LinkKind,

        #[arg(long, help = "File name inside the todo directory")]
        file: Option<String>,
    },

    /// Remove a file link
    Unlink {
        #[arg(value_enum)]
        kind: LinkKind,
    },

    /// Merge the linked files into the tasks and write them back
    Sync,

    /// Permanently delete a task and its entries
    Purge {
        exid: String,

        #[arg(long, short = 'y', help = "Do not ask for confirmation")]
        yes: bool,
    },
}
