//! Note repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist notes together with their single parent link.
//! - Provide category-filtered note tables joined with parent titles.
//!
//! # Invariants
//! - A note row and its bridge row are written in one transaction; no note
//!   is ever committed without a parent link.
//! - `get_note` reports a missing note as `Ok(None)`, not as an error.
//! - Category filters only accept `ParentCategory`; raw codes go through
//!   `ParentCategory::try_from` and fail with `InvalidNoteType`.

use crate::clock::now_ms;
use crate::model::note::{NewNote, Note, NoteId, NoteParent, NoteTableRow, ParentCategory};
use crate::queries::Queries;
use crate::repo::bridge::{link_note, parent_of};
use crate::repo::{
    ensure_connection_ready, ensure_valid_id, normalize_id_list, Entity, RepoError, RepoResult,
};
use log::{info, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Repository interface for notes and their parent links.
pub trait NoteRepository {
    /// Creates one note linked to `parent` and returns its id.
    fn create_note(&self, note: &NewNote, parent: NoteParent) -> RepoResult<NoteId>;
    /// Gets one note by id; `None` when it does not exist.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes of one category with their parent's title.
    fn list_notes(&self, category: ParentCategory) -> RepoResult<Vec<NoteTableRow>>;
    /// Lists the notes attached to one task or area.
    fn list_notes_for(&self, parent: NoteParent) -> RepoResult<Vec<Note>>;
    /// Deletes notes (and their links) by id, all or nothing.
    fn delete_notes(&self, ids: &[NoteId]) -> RepoResult<usize>;
}

/// SQLite-backed note repository.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Creates repository from a connection whose schema is set up.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Lists notes for a raw stored category code.
    pub fn list_notes_by_code(&self, code: i64) -> RepoResult<Vec<NoteTableRow>> {
        let category = ParentCategory::try_from(code)?;
        self.list_notes(category)
    }

    /// Returns the parent link of an existing note.
    pub fn parent_of(&self, id: NoteId) -> RepoResult<Option<NoteParent>> {
        parent_of(self.conn, id)
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn create_note(&self, note: &NewNote, parent: NoteParent) -> RepoResult<NoteId> {
        note.validate()?;
        ensure_valid_id(parent.id())?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let note_id = Queries::new(&tx).insert_note(note.title.trim(), note.path.trim(), now_ms())?;
        if let Err(err) = link_note(&tx, note_id, parent) {
            warn!(
                "event=note_create module=repo status=rollback parent_cat={} parent_id={} error={}",
                parent.category().code(),
                parent.id(),
                err
            );
            return Err(err);
        }
        tx.commit()?;

        info!(
            "event=note_create module=repo status=ok note_id={} parent_cat={} parent_id={}",
            note_id,
            parent.category().code(),
            parent.id()
        );
        Ok(note_id)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        Queries::new(self.conn).select_note(id)
    }

    fn list_notes(&self, category: ParentCategory) -> RepoResult<Vec<NoteTableRow>> {
        Queries::new(self.conn).select_note_table(category)
    }

    fn list_notes_for(&self, parent: NoteParent) -> RepoResult<Vec<Note>> {
        Queries::new(self.conn).select_notes_for_parent(parent)
    }

    fn delete_notes(&self, ids: &[NoteId]) -> RepoResult<usize> {
        let ids = normalize_id_list(ids)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let deleted = Queries::new(&tx).delete_notes_in(&ids)?;
        if deleted != ids.len() {
            return Err(RepoError::MissingIds {
                entity: Entity::Note,
                requested: ids.len(),
                found: deleted,
            });
        }
        tx.commit()?;

        info!(
            "event=note_delete_many module=repo status=ok notes_deleted={}",
            deleted
        );
        Ok(deleted)
    }
}
