//! The task store: the ordered collection of tasks and its update rules.
//!
//! The store never touches storage itself. Every mutation returns a [`Change`]
//! telling the owner whether the collection now differs from what was last
//! written, so the owner decides when and where to persist.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::ValidationError;
use crate::task::{now_millis, Task, TaskId, TaskInput, TaskPatch};
use crate::validate::validate;

/// Outcome of a store mutation.
#[must_use = "a changed collection should be written to the persistence slot"]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Changed,
    Unchanged,
}

impl Change {
    pub fn is_changed(self) -> bool {
        self == Change::Changed
    }
}

/// In-memory, insertion-ordered collection of tasks with unique ids.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from previously saved tasks. Later duplicates of an id are dropped.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.id) {
                kept.push(task);
            } else {
                warn!(id = task.id, "dropping task with duplicate id");
            }
        }
        TaskStore { tasks: kept }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Get a task by ID.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    /// Millisecond timestamp of `now`, moved past the largest existing id if needed.
    /// When the largest id is `u64::MAX` the smallest free id is used instead.
    fn next_id(&self, now: DateTime<Utc>) -> TaskId {
        let stamp = u64::try_from(now.timestamp_millis()).unwrap_or(0);
        match self.tasks.iter().map(|t| t.id).max() {
            Some(max) if max >= stamp => max
                .checked_add(1)
                .unwrap_or_else(|| self.smallest_free_id()),
            _ => stamp,
        }
    }

    fn smallest_free_id(&self) -> TaskId {
        let mut ids: Vec<TaskId> = self.tasks.iter().map(|t| t.id).collect();
        ids.sort_unstable();
        let mut candidate = 0;
        for id in ids {
            if id != candidate {
                break;
            }
            candidate += 1;
        }
        candidate
    }

    /// Validate and append a new task, returning its id.
    pub fn add(&mut self, input: TaskInput) -> Result<TaskId, ValidationError> {
        self.add_at(input, now_millis())
    }

    pub(crate) fn add_at(
        &mut self,
        input: TaskInput,
        now: DateTime<Utc>,
    ) -> Result<TaskId, ValidationError> {
        validate(&input)?;
        let id = self.next_id(now);
        self.tasks.push(Task {
            id,
            title: input.title,
            description: input.description,
            completed: false,
            created_at: now,
        });
        Ok(id)
    }

    /// Merge the patch onto the matching task and validate the result.
    ///
    /// An unknown id is a no-op rather than an insert.
    pub fn update(&mut self, patch: TaskPatch) -> Result<Change, ValidationError> {
        let Some(task) = self.get_mut(patch.id) else {
            debug!(id = patch.id, "update for unknown task ignored");
            return Ok(Change::Unchanged);
        };
        let merged = task.merged(&patch);
        validate(&TaskInput::from(&merged))?;
        if *task == merged {
            return Ok(Change::Unchanged);
        }
        *task = merged;
        Ok(Change::Changed)
    }

    /// Delete the matching task, if any.
    pub fn remove(&mut self, id: TaskId) -> Change {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        if self.tasks.len() == before {
            Change::Unchanged
        } else {
            Change::Changed
        }
    }

    /// Flip the completed flag of the matching task, if any.
    pub fn toggle_completed(&mut self, id: TaskId) -> Change {
        match self.get_mut(id) {
            Some(task) => {
                task.completed = !task.completed;
                Change::Changed
            }
            None => Change::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn store_with(titles: &[&str]) -> TaskStore {
        let mut store = TaskStore::new();
        for (i, title) in titles.iter().enumerate() {
            store.add_at(TaskInput::new(*title), at(1_000 + i as i64)).unwrap();
        }
        store
    }

    #[test]
    fn add_appends_one_open_task_with_fresh_id() {
        let mut store = store_with(&["first", "second"]);
        let existing: Vec<TaskId> = store.tasks().iter().map(|t| t.id).collect();

        let id = store.add(TaskInput::new("third").with_description("notes")).unwrap();

        assert_eq!(store.len(), 3);
        assert!(!existing.contains(&id));
        let task = store.tasks().last().unwrap();
        assert_eq!(task.id, id);
        assert_eq!(task.title, "third");
        assert_eq!(task.description, "notes");
        assert!(!task.completed);
    }

    #[test]
    fn ids_stay_unique_within_the_same_millisecond() {
        let mut store = TaskStore::new();
        let a = store.add_at(TaskInput::new("a"), at(5_000)).unwrap();
        let b = store.add_at(TaskInput::new("b"), at(5_000)).unwrap();
        let c = store.add_at(TaskInput::new("c"), at(4_000)).unwrap();
        assert_eq!(a, 5_000);
        assert_eq!(b, 5_001);
        assert_eq!(c, 5_002);
    }

    #[test]
    fn add_after_the_largest_possible_id_reuses_a_free_one() {
        let mut seed = TaskStore::new();
        seed.add_at(TaskInput::new("zero"), at(0)).unwrap();
        let mut tasks = seed.tasks().to_vec();
        let mut last = tasks[0].clone();
        last.id = u64::MAX;
        tasks.push(last);
        let mut store = TaskStore::from_tasks(tasks);

        let id = store.add(TaskInput::new("next")).unwrap();

        assert_eq!(id, 1);
        assert_eq!(store.len(), 3);
        let unique: HashSet<TaskId> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(unique.len(), 3);
    }

    #[test]
    fn add_rejects_invalid_input_without_touching_the_store() {
        let mut store = store_with(&["keep"]);
        let before = store.clone();

        assert_eq!(store.add(TaskInput::new("")), Err(ValidationError::TitleRequired));
        assert_eq!(
            store.add(TaskInput::new("a".repeat(101))),
            Err(ValidationError::TitleTooLong)
        );
        assert_eq!(
            store.add(TaskInput::new("ok").with_description("d".repeat(501))),
            Err(ValidationError::DescriptionTooLong)
        );
        assert_eq!(store, before);
    }

    #[test]
    fn update_replaces_fields_and_keeps_identity() {
        let mut store = store_with(&["one", "two"]);
        let id = store.tasks()[0].id;
        let created = store.tasks()[0].created_at;
        let other = store.tasks()[1].clone();

        let change = store
            .update(TaskPatch::new(id).title("uno").description("first"))
            .unwrap();

        assert_eq!(change, Change::Changed);
        let task = store.get(id).unwrap();
        assert_eq!(task.title, "uno");
        assert_eq!(task.description, "first");
        assert_eq!(task.created_at, created);
        assert_eq!(store.tasks()[1], other);
    }

    #[test]
    fn update_validates_the_merged_task() {
        let mut store = store_with(&["one"]);
        let id = store.tasks()[0].id;
        let before = store.clone();

        assert_eq!(
            store.update(TaskPatch::new(id).title("   ")),
            Err(ValidationError::TitleRequired)
        );
        assert_eq!(
            store.update(TaskPatch::new(id).title("a".repeat(101))),
            Err(ValidationError::TitleTooLong)
        );
        assert_eq!(
            store.update(TaskPatch::new(id).description("d".repeat(501))),
            Err(ValidationError::DescriptionTooLong)
        );
        assert_eq!(store, before);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut store = store_with(&["one"]);
        let before = store.clone();
        let change = store.update(TaskPatch::new(42).title("ghost")).unwrap();
        assert_eq!(change, Change::Unchanged);
        assert_eq!(store, before);
    }

    #[test]
    fn update_with_identical_values_reports_unchanged() {
        let mut store = store_with(&["same"]);
        let id = store.tasks()[0].id;
        let change = store.update(TaskPatch::new(id).title("same")).unwrap();
        assert_eq!(change, Change::Unchanged);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = store_with(&["one", "two"]);
        let id = store.tasks()[0].id;

        assert_eq!(store.remove(id), Change::Changed);
        let after_first = store.clone();
        assert_eq!(store.remove(id), Change::Unchanged);
        assert_eq!(store, after_first);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn toggle_twice_restores_the_flag() {
        let mut store = store_with(&["one"]);
        let id = store.tasks()[0].id;

        assert_eq!(store.toggle_completed(id), Change::Changed);
        assert!(store.get(id).unwrap().completed);
        assert_eq!(store.toggle_completed(id), Change::Changed);
        assert!(!store.get(id).unwrap().completed);
        assert_eq!(store.toggle_completed(12345), Change::Unchanged);
    }

    #[test]
    fn buy_milk_lifecycle() {
        let mut store = TaskStore::new();
        let id = store.add(TaskInput::new("Buy milk")).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.get(id).unwrap().completed);

        let _ = store.toggle_completed(id);
        assert!(store.get(id).unwrap().completed);
        let _ = store.toggle_completed(id);
        assert!(!store.get(id).unwrap().completed);

        let _ = store.remove(id);
        assert!(store.is_empty());
    }

    #[test]
    fn title_of_101_chars_is_rejected_on_empty_store() {
        let mut store = TaskStore::new();
        assert_eq!(
            store.add(TaskInput::new("a".repeat(101))),
            Err(ValidationError::TitleTooLong)
        );
        assert!(store.is_empty());
    }

    #[test]
    fn from_tasks_drops_duplicate_ids() {
        let store = store_with(&["a", "b"]);
        let mut tasks = store.tasks().to_vec();
        let mut dup = tasks[0].clone();
        dup.title = "impostor".into();
        tasks.push(dup);

        let loaded = TaskStore::from_tasks(tasks);
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.tasks()[0].title, "a");
    }
}
