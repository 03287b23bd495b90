//! Note model and the note-to-parent link variant.
//!
//! # Invariants
//! - A note belongs to exactly one parent: one task or one area.
//! - `ParentCategory` codes are fixed storage values (`1` task, `2` area).

use crate::model::area::AreaId;
use crate::model::fields::ValidationError;
use crate::model::task::TaskId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NoteId = i64;

/// Discriminator stored in `bridge_notes.parent_cat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParentCategory {
    Task,
    Area,
}

impl ParentCategory {
    pub fn code(self) -> i64 {
        match self {
            Self::Task => 1,
            Self::Area => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Area => "area",
        }
    }
}

/// Raised for a parent category code outside `{1, 2}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidNoteType(pub i64);

impl Display for InvalidNoteType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid note type: {}", self.0)
    }
}

impl Error for InvalidNoteType {}

impl TryFrom<i64> for ParentCategory {
    type Error = InvalidNoteType;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(Self::Task),
            2 => Ok(Self::Area),
            other => Err(InvalidNoteType(other)),
        }
    }
}

/// The one task or area a note is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum NoteParent {
    Task(TaskId),
    Area(AreaId),
}

impl NoteParent {
    pub fn category(self) -> ParentCategory {
        match self {
            Self::Task(_) => ParentCategory::Task,
            Self::Area(_) => ParentCategory::Area,
        }
    }

    pub fn id(self) -> i64 {
        match self {
            Self::Task(id) | Self::Area(id) => id,
        }
    }

    /// Splits into the `(parent_cat, parent_task_id, parent_area_id)`
    /// column triple stored in `bridge_notes`.
    pub fn to_columns(self) -> (i64, Option<TaskId>, Option<AreaId>) {
        match self {
            Self::Task(id) => (ParentCategory::Task.code(), Some(id), None),
            Self::Area(id) => (ParentCategory::Area.code(), None, Some(id)),
        }
    }

    /// Rebuilds the variant from bridge columns.
    ///
    /// Returns `None` unless exactly the column matching `parent_cat` is set.
    pub fn from_columns(
        parent_cat: i64,
        parent_task_id: Option<TaskId>,
        parent_area_id: Option<AreaId>,
    ) -> Option<Self> {
        match (parent_cat, parent_task_id, parent_area_id) {
            (1, Some(task_id), None) => Some(Self::Task(task_id)),
            (2, None, Some(area_id)) => Some(Self::Area(area_id)),
            _ => None,
        }
    }
}

impl Display for NoteParent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} #{}", self.category().label(), self.id())
    }
}

/// Persisted note with its resolved parent link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    /// Markdown file location on disk.
    pub path: String,
    pub parent: NoteParent,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Create input for a note. The parent is passed separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote {
    pub title: String,
    pub path: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::BlankTitle);
        }
        if self.path.trim().is_empty() {
            return Err(ValidationError::BlankPath);
        }
        Ok(())
    }
}

/// Denormalized list row: note columns plus the parent's title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteTableRow {
    pub note_id: NoteId,
    pub title: String,
    pub path: String,
    pub parent: NoteParent,
    pub link_title: String,
}
