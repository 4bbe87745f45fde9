//! # tm - terminal task manager
//!
//! A small personal task manager with a command-line interface and an
//! interactive terminal user interface (TUI).
//!
//! ## Key Features
//!
//! - **Tasks with a title, optional description and a done flag**, kept in the
//!   order they were added
//! - **Filtered views**: all, pending and completed tasks, plus a statistics summary
//! - **Two interfaces**: CLI subcommands for quick capture and scripting, and a TUI
//!   with a sidebar menu, an add/edit form and delete confirmation
//! - **Local file storage**: a single pretty-printed JSON file with timestamped backups
//!
//! ## Quick Start
//!
//! ```bash
//! # Launch the TUI
//! tm
//!
//! # Add a task via CLI
//! tm add "Buy milk" --desc "semi-skimmed"
//!
//! # List what is still open
//! tm list --filter pending
//!
//! # Mark it done
//! tm toggle 1705314600000
//! ```
//!
//! Data is stored in `~/.tm/tasks.json` unless `--db` (or `TM_DB`) points elsewhere.
//! Logs go to `tm.log` next to the task file; set `RUST_LOG` to change the level.

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use tracing_subscriber::EnvFilter;

pub mod cli;
pub mod cmd;
pub mod config;
pub mod display;
pub mod error;
pub mod session;
pub mod storage;
pub mod store;
pub mod task;
pub mod validate;
pub mod view;
pub mod tui {
    pub mod app;
    pub mod colors;
    pub mod enums;
    pub mod input;
    pub mod run;
    pub mod task_form;
    pub mod utils;
}

use cli::Cli;
use cmd::*;
use config::Config;

/// Send tracing output to the log file. The terminal belongs to the UI.
fn init_logging(config: &Config) {
    let file = match OpenOptions::new().create(true).append(true).open(&config.log_path) {
        Ok(file) => file,
        Err(e) => {
            eprintln!("Failed to open log file {}: {}", config.log_path.display(), e);
            return;
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

fn main() {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        cmd_completions(*shell);
        return;
    }

    let config = Config::from_env(cli.db, cli.log_file);
    if let Err(e) = config.ensure_data_dir() {
        eprintln!("Failed to create data directory {}: {}", config.data_dir.display(), e);
        std::process::exit(1);
    }
    init_logging(&config);
    tracing::debug!(db = %config.db_path.display(), "starting");

    let db_path = config.db_path.as_path();
    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => cmd_ui(db_path),
        Commands::Add { title, desc } => cmd_add(db_path, title, desc),
        Commands::List { filter } => cmd_list(db_path, filter),
        Commands::Edit { id, title, desc } => cmd_edit(db_path, id, title, desc),
        Commands::Toggle { id } => cmd_toggle(db_path, id),
        Commands::Delete { id } => cmd_delete(db_path, id),
        Commands::Stats => cmd_stats(db_path),
        Commands::Backup => cmd_backup(db_path),
        Commands::Completions { shell } => cmd_completions(shell),
    }
}
