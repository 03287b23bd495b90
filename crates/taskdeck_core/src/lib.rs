//! Core domain logic for taskdeck.
//! This crate is the single source of truth for schema, linking and
//! persistence invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod queries;
pub mod repo;
pub mod service;

pub use config::{default_config_path, AppConfig, ConfigError};
pub use logging::{init_logging, LogSettings};
pub use model::area::{Area, AreaId, AreaListItem, AreaPatch, NewArea};
pub use model::fields::{Priority, Status, ValidationError};
pub use model::note::{
    InvalidNoteType, NewNote, Note, NoteId, NoteParent, NoteTableRow, ParentCategory,
};
pub use model::task::{NewTask, Task, TaskId, TaskListItem, TaskPatch};
pub use queries::Queries;
pub use repo::area_repo::{AreaRepository, SqliteAreaRepository};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{Entity, RepoError, RepoResult};
pub use service::note_service::{NoteService, NoteServiceError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
