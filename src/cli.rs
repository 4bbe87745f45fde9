use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// File-backed task manager with a terminal UI.
/// Storage defaults to ~/.tm/tasks.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "tm", version, about = "Personal task manager")]
pub struct Cli {
    /// Path to the JSON task file.
    #[arg(long, global = true, env = "TM_DB")]
    pub db: Option<PathBuf>,

    /// Where to write the log. Defaults to tm.log next to the task file.
    #[arg(long, global = true, env = "TM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to run. Without one the interactive UI starts.
    #[command(subcommand)]
    pub command: Option<Commands>,
}
