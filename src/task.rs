//! Task data structure and the input shapes used to create and change tasks.
//!
//! `Task` is the only persisted entity. Its JSON form uses the keys `id`,
//! `title`, `description`, `completed` and `createdAt`, with the creation time
//! written as an ISO-8601 string at millisecond precision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a task, unique within a store.
pub type TaskId = u64;

/// A titled, optionally described, completable unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Copy of this task with the supplied patch fields applied.
    /// `id` and `created_at` are always kept.
    pub fn merged(&self, patch: &TaskPatch) -> Task {
        Task {
            id: self.id,
            title: patch.title.clone().unwrap_or_else(|| self.title.clone()),
            description: patch
                .description
                .clone()
                .unwrap_or_else(|| self.description.clone()),
            completed: patch.completed.unwrap_or(self.completed),
            created_at: self.created_at,
        }
    }

    /// Whether the task carries a non-empty description.
    pub fn has_description(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// User-supplied fields for a new task, as submitted by the form or the CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
}

impl TaskInput {
    pub fn new(title: impl Into<String>) -> Self {
        TaskInput {
            title: title.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

impl From<&Task> for TaskInput {
    fn from(task: &Task) -> Self {
        TaskInput {
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }
}

/// Changes to an existing task. Fields left as `None` keep their value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPatch {
    pub id: TaskId,
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn new(id: TaskId) -> Self {
        TaskPatch {
            id,
            title: None,
            description: None,
            completed: None,
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn completed(mut self, completed: bool) -> Self {
        self.completed = Some(completed);
        self
    }

    /// Patch replacing title and description with the form's values.
    pub fn from_input(id: TaskId, input: TaskInput) -> Self {
        TaskPatch::new(id).title(input.title).description(input.description)
    }
}

/// Current time truncated to whole milliseconds, the precision kept on disk.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
