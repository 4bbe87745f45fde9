//! Persistence slot for the task collection.
//!
//! The slot holds the whole collection as a JSON array. `TaskSlot` is the seam
//! the session writes through, so the backing storage can be swapped without
//! touching store logic.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::error::StorageError;
use crate::task::Task;

/// Name of the single slot the collection is stored under.
pub const SLOT_NAME: &str = "tasks";

/// A place the full task collection can be read from and written to.
pub trait TaskSlot {
    /// Read the saved collection. `Ok(None)` means nothing has been saved yet.
    fn read(&self) -> Result<Option<Vec<Task>>, StorageError>;

    /// Replace the saved collection.
    fn write(&self, tasks: &[Task]) -> Result<(), StorageError>;

    /// Keep a copy of the current contents aside, returning where it went.
    fn backup(&self) -> Result<Option<PathBuf>, StorageError> {
        Ok(None)
    }
}

/// Slot backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSlot {
    path: PathBuf,
}

impl JsonFileSlot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSlot { path: path.into() }
    }

    /// Slot file named after [`SLOT_NAME`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(format!("{SLOT_NAME}.json")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskSlot for JsonFileSlot {
    fn read(&self) -> Result<Option<Vec<Task>>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&self.path).map_err(|e| StorageError::io(&self.path, e))?;
        let tasks = decode(&raw)?;
        debug!(path = %self.path.display(), count = tasks.len(), "read task slot");
        Ok(Some(tasks))
    }

    /// Atomic-ish write via temp + rename.
    fn write(&self, tasks: &[Task]) -> Result<(), StorageError> {
        let data = encode(tasks)?;
        let tmp = self.path.with_extension("json.tmp");
        let mut f = File::create(&tmp).map_err(|e| StorageError::io(&tmp, e))?;
        f.write_all(data.as_bytes())
            .and_then(|_| f.flush())
            .map_err(|e| StorageError::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| StorageError::io(&self.path, e))?;
        debug!(path = %self.path.display(), count = tasks.len(), "wrote task slot");
        Ok(())
    }

    /// Copy the slot file to `backup/<timestamp>_<file name>` next to it.
    fn backup(&self) -> Result<Option<PathBuf>, StorageError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let parent_dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let backup_dir = parent_dir.join("backup");
        fs::create_dir_all(&backup_dir).map_err(|e| StorageError::io(&backup_dir, e))?;

        let timestamp = Local::now().format("%Y-%m-%d_%H-%M-%S");
        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("tasks.json");
        let mut backup_path = backup_dir.join(format!("{timestamp}_{file_name}"));
        let mut n = 1;
        while backup_path.exists() {
            backup_path = backup_dir.join(format!("{timestamp}_{n}_{file_name}"));
            n += 1;
        }

        fs::copy(&self.path, &backup_path).map_err(|e| StorageError::io(&backup_path, e))?;
        Ok(Some(backup_path))
    }
}

/// Serialize the collection the way it is stored in the slot.
pub fn encode(tasks: &[Task]) -> Result<String, StorageError> {
    serde_json::to_string_pretty(tasks).map_err(StorageError::Encode)
}

/// Parse a stored collection.
pub fn decode(raw: &str) -> Result<Vec<Task>, StorageError> {
    serde_json::from_str(raw).map_err(StorageError::Corrupt)
}

/// Slot kept in memory, used to drive sessions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySlot {
    pub data: std::cell::RefCell<Option<String>>,
    pub writes: std::cell::Cell<usize>,
    pub backups: std::cell::RefCell<Vec<String>>,
}

#[cfg(test)]
impl MemorySlot {
    pub fn with_raw(raw: &str) -> Self {
        let slot = MemorySlot::default();
        *slot.data.borrow_mut() = Some(raw.to_string());
        slot
    }

    pub fn saved(&self) -> Option<Vec<Task>> {
        self.data.borrow().as_deref().map(|raw| decode(raw).unwrap())
    }
}

#[cfg(test)]
impl TaskSlot for MemorySlot {
    fn read(&self) -> Result<Option<Vec<Task>>, StorageError> {
        self.data.borrow().as_deref().map(decode).transpose()
    }

    fn write(&self, tasks: &[Task]) -> Result<(), StorageError> {
        *self.data.borrow_mut() = Some(encode(tasks)?);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    fn backup(&self) -> Result<Option<PathBuf>, StorageError> {
        let Some(raw) = self.data.borrow().clone() else {
            return Ok(None);
        };
        let mut backups = self.backups.borrow_mut();
        backups.push(raw);
        Ok(Some(PathBuf::from(format!("memory-backup-{}", backups.len()))))
    }
}
