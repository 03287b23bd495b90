//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per entity.
//! - Own transactions, validation and not-found policy above `queries`.
//!
//! # Invariants
//! - Repository writes validate input before any SQL runs.
//! - Multi-statement writes commit all-or-nothing.
//! - Repository APIs return semantic errors (`NotFound`, `EmptyUpdate`, ...)
//!   in addition to DB transport errors.

use crate::db::{is_setup, DbError};
use crate::model::fields::ValidationError;
use crate::model::note::InvalidNoteType;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod area_repo;
pub mod bridge;
pub mod note_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Entity kind named in repository errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Task,
    Area,
    Note,
}

impl Display for Entity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Task => "task",
            Self::Area => "area",
            Self::Note => "note",
        })
    }
}

/// Repository error shared by task, area and note persistence.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Validation(ValidationError),
    /// Schema has not been created on this database yet.
    Uninitialized,
    NotFound { entity: Entity, id: i64 },
    /// Zero or negative id passed to a write path.
    InvalidId(i64),
    /// Partial update with no fields set.
    EmptyUpdate,
    /// Bulk operation called with no ids.
    EmptyIdList,
    /// Bulk delete matched fewer rows than requested; nothing was deleted.
    MissingIds {
        entity: Entity,
        requested: usize,
        found: usize,
    },
    InvalidNoteType(i64),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::Uninitialized => write!(f, "database is not set up; run `taskdeck init`"),
            Self::NotFound { entity, id } => write!(f, "{entity} not found: {id}"),
            Self::InvalidId(id) => write!(f, "invalid id: {id}"),
            Self::EmptyUpdate => write!(f, "no fields to update"),
            Self::EmptyIdList => write!(f, "no ids given"),
            Self::MissingIds {
                entity,
                requested,
                found,
            } => write!(
                f,
                "only {found} of {requested} {entity} ids exist; nothing was deleted"
            ),
            Self::InvalidNoteType(code) => write!(f, "invalid note type: {code}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<InvalidNoteType> for RepoError {
    fn from(value: InvalidNoteType) -> Self {
        Self::InvalidNoteType(value.0)
    }
}

pub(crate) fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    if !is_setup(conn)? {
        return Err(RepoError::Uninitialized);
    }
    Ok(())
}

pub(crate) fn ensure_valid_id(id: i64) -> RepoResult<()> {
    if id <= 0 {
        return Err(RepoError::InvalidId(id));
    }
    Ok(())
}

/// Validates a bulk id list and collapses duplicates, keeping first-seen order.
pub(crate) fn normalize_id_list(ids: &[i64]) -> RepoResult<Vec<i64>> {
    if ids.is_empty() {
        return Err(RepoError::EmptyIdList);
    }
    let mut unique = Vec::with_capacity(ids.len());
    for &id in ids {
        ensure_valid_id(id)?;
        if !unique.contains(&id) {
            unique.push(id);
        }
    }
    Ok(unique)
}
