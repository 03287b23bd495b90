//! Task model, create input and partial-update mask.
//!
//! # Invariants
//! - `title` is never blank once persisted.
//! - Timestamps are Unix epoch milliseconds.
//! - `TaskPatch` fields left as `None` are never written.

use crate::model::area::AreaId;
use crate::model::fields::{normalize_title, Priority, Status, ValidationError};
use crate::model::note::Note;
use serde::{Deserialize, Serialize};

pub type TaskId = i64;

/// Persisted task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub archived: bool,
    /// Owning area, if any.
    pub area_id: Option<AreaId>,
    pub created_at: i64,
    pub updated_at: i64,
    pub due_at: Option<i64>,
    /// Filled by single-task reads only.
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Create input for a task.
///
/// `due_at = None` makes the repository default the due date to seven days
/// after creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub archived: bool,
    pub area_id: Option<AreaId>,
    pub due_at: Option<i64>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Explicit field mask for task updates.
///
/// Nullable columns use `Option<Option<T>>`: `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
    pub archived: Option<bool>,
    pub area_id: Option<Option<AreaId>>,
    pub due_at: Option<Option<i64>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.archived.is_none()
            && self.area_id.is_none()
            && self.due_at.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.title.as_deref() {
            Some(title) => normalize_title(title).map(|_| ()),
            None => Ok(()),
        }
    }
}

/// Row of the task list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListItem {
    pub task: Task,
    /// Titles of linked notes.
    pub note_titles: Vec<String>,
    /// Whole days elapsed since `created_at`.
    pub age_days: i64,
}

#[cfg(test)]
mod tests {
    use super::{NewTask, TaskPatch};
    use crate::model::fields::{Status, ValidationError};

    #[test]
    fn default_patch_is_empty() {
        assert!(TaskPatch::default().is_empty());
        let patch = TaskPatch {
            due_at: Some(None),
            ..TaskPatch::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_with_blank_title_is_invalid() {
        let patch = TaskPatch {
            title: Some("  ".to_string()),
            status: Some(Status::Done),
            ..TaskPatch::default()
        };
        assert_eq!(patch.validate(), Err(ValidationError::BlankTitle));
    }

    #[test]
    fn new_task_defaults() {
        let task = NewTask::new("write report");
        assert_eq!(task.status, Status::Todo);
        assert!(!task.archived);
        assert!(task.due_at.is_none());
    }
}
