//! The state object handed to the presentation layer.
//!
//! A `Session` owns the task store, the view state and the persistence slot.
//! It is the only mutation path: every user intent goes through one of its
//! methods, which validates, updates the store, persists when the store
//! reports a change and then applies the view transition rules.

use tracing::{error, info, warn};

use crate::error::{Error, StorageError};
use crate::storage::TaskSlot;
use crate::store::{Change, TaskStore};
use crate::task::{Task, TaskId, TaskInput, TaskPatch};
use crate::view::{derive_screen, MenuItem, Screen, ViewState};

/// Result of submitting the task form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    Added(TaskId),
    Updated(TaskId),
}

/// What the session knows about the slot contents it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotState {
    /// Loaded, or nothing saved yet. Writes go straight through.
    Loaded,
    /// Unparseable contents. They are copied aside before the first write replaces them.
    NeedsBackup,
    /// Could not be read at all. Nothing is written while the contents are unknown.
    Unreadable,
}

pub struct Session<S: TaskSlot> {
    store: TaskStore,
    view: ViewState,
    slot: S,
    slot_state: SlotState,
    load_error: Option<StorageError>,
}

impl<S: TaskSlot> Session<S> {
    /// Load the slot and start a session on its contents.
    ///
    /// A missing slot gives an empty collection. Unparseable contents also give
    /// an empty collection; they are backed up before the first write. A slot
    /// that cannot be read leaves the session read-only. Both cases are
    /// reported through [`Session::load_error`]. Nothing is written here.
    pub fn open(slot: S) -> Self {
        let (store, slot_state, load_error) = match slot.read() {
            Ok(Some(tasks)) => {
                info!(count = tasks.len(), "loaded tasks");
                (TaskStore::from_tasks(tasks), SlotState::Loaded, None)
            }
            Ok(None) => {
                info!("no saved tasks, starting empty");
                (TaskStore::new(), SlotState::Loaded, None)
            }
            Err(e @ StorageError::Corrupt(_)) => {
                error!(error = %e, "saved tasks are unreadable, starting fresh");
                (TaskStore::new(), SlotState::NeedsBackup, Some(e))
            }
            Err(e) => {
                error!(error = %e, "could not read saved tasks, changes will not be saved");
                (TaskStore::new(), SlotState::Unreadable, Some(e))
            }
        };
        Session {
            store,
            view: ViewState::new(),
            slot,
            slot_state,
            load_error,
        }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// Problem met while loading the slot, if any.
    pub fn load_error(&self) -> Option<&StorageError> {
        self.load_error.as_ref()
    }

    /// Content for the current view.
    pub fn screen(&self) -> Screen<'_> {
        derive_screen(&self.view, self.store.tasks())
    }

    /// Whether changes can be saved at all.
    pub fn is_read_only(&self) -> bool {
        self.slot_state == SlotState::Unreadable
    }

    fn ensure_writable(&self) -> Result<(), StorageError> {
        if self.is_read_only() {
            return Err(StorageError::NotLoaded);
        }
        Ok(())
    }

    fn persist(&mut self, change: Change) -> Result<(), StorageError> {
        if !change.is_changed() {
            return Ok(());
        }
        self.ensure_writable()?;
        if self.slot_state == SlotState::NeedsBackup {
            match self.slot.backup()? {
                Some(path) => warn!(path = %path.display(), "kept a copy of the unreadable tasks"),
                None => warn!("no copy of the unreadable tasks was needed"),
            }
            self.slot_state = SlotState::Loaded;
        }
        self.slot.write(self.store.tasks())
    }

    pub fn add(&mut self, input: TaskInput) -> Result<TaskId, Error> {
        self.ensure_writable()?;
        let id = self.store.add(input)?;
        info!(id, "task added");
        self.persist(Change::Changed)?;
        Ok(id)
    }

    pub fn update(&mut self, patch: TaskPatch) -> Result<Change, Error> {
        self.ensure_writable()?;
        let id = patch.id;
        let change = self.store.update(patch)?;
        if change.is_changed() {
            info!(id, "task updated");
        }
        self.persist(change)?;
        Ok(change)
    }

    pub fn remove(&mut self, id: TaskId) -> Result<Change, Error> {
        self.ensure_writable()?;
        let change = self.store.remove(id);
        if change.is_changed() {
            info!(id, "task removed");
            if self.view.editing() == Some(id) {
                self.view.finish_edit();
            }
        }
        self.persist(change)?;
        Ok(change)
    }

    pub fn toggle_completed(&mut self, id: TaskId) -> Result<Change, Error> {
        self.ensure_writable()?;
        let change = self.store.toggle_completed(id);
        if let Some(task) = self.store.get(id) {
            info!(id, completed = task.completed, "task toggled");
        }
        self.persist(change)?;
        Ok(change)
    }

    /// Submit the form: update the edited task, or add a new one.
    ///
    /// After a successful edit the view returns to the last list filter. An add
    /// leaves the view where it is. On a validation error nothing changes.
    pub fn submit(&mut self, input: TaskInput) -> Result<Submitted, Error> {
        match self.view.editing() {
            Some(id) => {
                let result = self.update(TaskPatch::from_input(id, input));
                match result {
                    Ok(_) => {
                        self.view.finish_edit();
                        Ok(Submitted::Updated(id))
                    }
                    Err(Error::Storage(StorageError::NotLoaded)) => Err(StorageError::NotLoaded.into()),
                    // The change is in memory even if the write failed, so leave the form.
                    Err(Error::Storage(e)) => {
                        self.view.finish_edit();
                        Err(Error::Storage(e))
                    }
                    Err(e) => Err(e),
                }
            }
            None => self.add(input).map(Submitted::Added),
        }
    }

    pub fn select_view(&mut self, item: MenuItem) {
        self.view.select(item);
    }

    /// Open the form on a task. Returns false when no task has that id.
    pub fn begin_edit(&mut self, id: TaskId) -> bool {
        if self.store.get(id).is_none() {
            return false;
        }
        self.view.begin_edit(id);
        true
    }

    /// Leave the form without changing anything.
    pub fn cancel_edit(&mut self) {
        self.view.finish_edit();
    }
}
