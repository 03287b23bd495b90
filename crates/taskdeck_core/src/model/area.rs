//! Area (project/category) model.

use crate::model::fields::{normalize_title, Status, ValidationError};
use crate::model::note::Note;
use crate::model::task::Task;
use serde::{Deserialize, Serialize};

pub type AreaId = i64;

/// Persisted area. `tasks` and `notes` are snapshots filled on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub id: AreaId,
    pub title: String,
    pub status: Status,
    pub archived: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub due_at: Option<i64>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Create input for an area. `due_at = None` defaults to seven days out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewArea {
    pub title: String,
    pub status: Status,
    pub archived: bool,
    pub due_at: Option<i64>,
}

impl NewArea {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Explicit field mask for area updates. `Some(None)` clears `due_at`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AreaPatch {
    pub title: Option<String>,
    pub status: Option<Status>,
    pub archived: Option<bool>,
    pub due_at: Option<Option<i64>>,
}

impl AreaPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.status.is_none()
            && self.archived.is_none()
            && self.due_at.is_none()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.title.as_deref() {
            Some(title) => normalize_title(title).map(|_| ()),
            None => Ok(()),
        }
    }
}

/// Row of the area list view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaListItem {
    /// Area with `notes` populated; `tasks` stays empty in list views.
    pub area: Area,
    pub task_count: i64,
    pub age_days: i64,
}
