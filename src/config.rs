//! Where the task file and the log file live.

use std::path::PathBuf;

use crate::storage::SLOT_NAME;

/// Directory under `$HOME` used when no database path is given.
pub const DEFAULT_DIR_NAME: &str = ".tm";
pub const LOG_FILE_NAME: &str = "tm.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve paths from the command line (or its env fallbacks) and `$HOME`.
    pub fn resolve(db: Option<PathBuf>, log_file: Option<PathBuf>, home: Option<String>) -> Self {
        let db_path = db.unwrap_or_else(|| {
            let home = home.unwrap_or_else(|| ".".to_string());
            PathBuf::from(home)
                .join(DEFAULT_DIR_NAME)
                .join(format!("{SLOT_NAME}.json"))
        });
        let data_dir = match db_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let log_path = log_file.unwrap_or_else(|| data_dir.join(LOG_FILE_NAME));
        Config {
            data_dir,
            db_path,
            log_path,
        }
    }

    /// Resolve against the current process environment.
    pub fn from_env(db: Option<PathBuf>, log_file: Option<PathBuf>) -> Self {
        Self::resolve(db, log_file, std::env::var("HOME").ok())
    }

    /// Create the data directory if it does not exist yet.
    pub fn ensure_data_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_home_directory() {
        let config = Config::resolve(None, None, Some("/home/ana".into()));
        assert_eq!(config.data_dir, PathBuf::from("/home/ana/.tm"));
        assert_eq!(config.db_path, PathBuf::from("/home/ana/.tm/tasks.json"));
        assert_eq!(config.log_path, PathBuf::from("/home/ana/.tm/tm.log"));
    }

    #[test]
    fn falls_back_to_current_dir_without_home() {
        let config = Config::resolve(None, None, None);
        assert_eq!(config.db_path, PathBuf::from("./.tm/tasks.json"));
    }

    #[test]
    fn explicit_db_sets_the_data_dir() {
        let config = Config::resolve(Some("/tmp/work/todo.json".into()), None, Some("/home/ana".into()));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/work"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/work/tm.log"));
    }

    #[test]
    fn bare_file_name_lives_in_current_dir() {
        let config = Config::resolve(Some("todo.json".into()), Some("/var/log/tm.log".into()), None);
        assert_eq!(config.data_dir, PathBuf::from("."));
        assert_eq!(config.log_path, PathBuf::from("/var/log/tm.log"));
    }

    #[test]
    fn ensure_data_dir_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested").join("tasks.json");
        let config = Config::resolve(Some(db), None, None);
        config.ensure_data_dir().unwrap();
        assert!(config.data_dir.is_dir());
    }
}
