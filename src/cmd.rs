//! Command implementations for the CLI interface.
//!
//! Each handler opens a session on the task file, runs one operation and
//! reports the outcome on stdout. Failures are printed to stderr and end the
//! process with status 1.

use std::path::Path;

use clap::Subcommand;
use clap_complete::{generate, Shell};
use thiserror::Error;
use tracing::warn;

use crate::display::{format_created, print_stats, print_table, status_mark};
use crate::error::Error as SessionError;
use crate::session::Session;
use crate::storage::{JsonFileSlot, TaskSlot};
use crate::store::Change;
use crate::task::{TaskId, TaskInput, TaskPatch};
use crate::tui::run::run_tui;
use crate::view::{ListFilter, Stats};

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (the default).
    Ui,

    /// Add a new task.
    Add {
        /// Short title for the task.
        title: String,
        /// Optional longer description.
        #[arg(long)]
        desc: Option<String>,
    },

    /// List tasks.
    List {
        /// Which tasks to show.
        #[arg(long, value_enum, default_value_t = ListFilter::All)]
        filter: ListFilter,
    },

    /// Change the title or description of a task.
    Edit {
        /// Task ID.
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        desc: Option<String>,
    },

    /// Mark a task done, or open again if it was done.
    Toggle {
        /// Task ID.
        id: TaskId,
    },

    /// Delete a task.
    Delete {
        /// Task ID.
        id: TaskId,
    },

    /// Show task counts and completion percentage.
    Stats,

    /// Copy the task file into the backup directory.
    Backup,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Why a command could not be carried out.
#[derive(Debug, Error)]
pub enum CmdError {
    #[error("nothing to change: pass --title and/or --desc")]
    NothingToChange,

    #[error("task {0} not found")]
    NotFound(TaskId),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Open a session on the task file.
///
/// Unparseable contents only warn, since the session keeps a copy before
/// replacing them. A file that cannot be read at all ends the process.
pub fn open_session(db_path: &Path) -> Session<JsonFileSlot> {
    let session = Session::open(JsonFileSlot::new(db_path));
    if let Some(e) = session.load_error() {
        if session.is_read_only() {
            eprintln!("Failed to read tasks: {e}");
            std::process::exit(1);
        }
        eprintln!("Warning: {e}. Starting with an empty task list.");
    }
    session
}

fn require_task<S: TaskSlot>(session: &Session<S>, id: TaskId) {
    if session.store().get(id).is_none() {
        eprintln!("Task {id} not found.");
        std::process::exit(1);
    }
}

/// Apply `--title`/`--desc` to an existing task.
pub fn edit_task<S: TaskSlot>(
    session: &mut Session<S>,
    id: TaskId,
    title: Option<String>,
    desc: Option<String>,
) -> Result<Change, CmdError> {
    if title.is_none() && desc.is_none() {
        return Err(CmdError::NothingToChange);
    }
    if session.store().get(id).is_none() {
        return Err(CmdError::NotFound(id));
    }
    let mut patch = TaskPatch::new(id);
    patch.title = title;
    patch.description = desc;
    Ok(session.update(patch)?)
}

/// Launch the terminal user interface.
pub fn cmd_ui(db_path: &Path) {
    if let Err(e) = run_tui(db_path) {
        eprintln!("UI error: {e}");
        std::process::exit(1);
    }
}

/// Add a new task to the task file.
pub fn cmd_add(db_path: &Path, title: String, desc: Option<String>) {
    let mut session = open_session(db_path);
    let input = TaskInput::new(title).with_description(desc.unwrap_or_default());
    match session.add(input) {
        Ok(id) => println!("Added {id}"),
        Err(e) => {
            eprintln!("Failed to add task: {e}");
            std::process::exit(1);
        }
    }
}

/// Print the tasks matching a filter.
pub fn cmd_list(db_path: &Path, filter: ListFilter) {
    let session = open_session(db_path);
    let tasks = filter.apply(session.tasks());
    print_table(&tasks);
}

/// Update title and/or description of a task.
pub fn cmd_edit(db_path: &Path, id: TaskId, title: Option<String>, desc: Option<String>) {
    let mut session = open_session(db_path);
    match edit_task(&mut session, id, title, desc) {
        Ok(Change::Changed) => println!("Updated {id}"),
        Ok(Change::Unchanged) => println!("No changes to {id}"),
        Err(e) => {
            eprintln!("Failed to update task: {e}");
            std::process::exit(1);
        }
    }
}

/// Flip the completed flag of a task.
pub fn cmd_toggle(db_path: &Path, id: TaskId) {
    let mut session = open_session(db_path);
    require_task(&session, id);
    if let Err(e) = session.toggle_completed(id) {
        eprintln!("Failed to save: {e}");
        std::process::exit(1);
    }
    if let Some(task) = session.store().get(id) {
        println!("{} {} {}", status_mark(task), task.id, task.title);
    }
}

/// Delete a task.
pub fn cmd_delete(db_path: &Path, id: TaskId) {
    let mut session = open_session(db_path);
    require_task(&session, id);
    if let Some(task) = session.store().get(id) {
        println!("Deleting {} - {} (created {})", task.id, task.title, format_created(task.created_at));
    }
    if let Err(e) = session.remove(id) {
        eprintln!("Failed to save: {e}");
        std::process::exit(1);
    }
    println!("Deleted.");
}

/// Print the summary numbers.
pub fn cmd_stats(db_path: &Path) {
    let session = open_session(db_path);
    print_stats(&Stats::from_tasks(session.tasks()));
}

/// Copy the task file to a timestamped backup.
pub fn cmd_backup(db_path: &Path) {
    match JsonFileSlot::new(db_path).backup() {
        Ok(Some(backup_path)) => println!("Backup created: {}", backup_path.display()),
        Ok(None) => {
            warn!(path = %db_path.display(), "backup requested for missing task file");
            eprintln!("Nothing to back up: {} does not exist.", db_path.display());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to create backup: {e}");
            std::process::exit(1);
        }
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
