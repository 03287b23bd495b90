//! Note-to-parent linking through `bridge_notes`.
//!
//! # Responsibility
//! - Insert the single bridge row that attaches a note to a task or area.
//! - Resolve a note's parent and remove notes linked to deleted parents.
//!
//! # Invariants
//! - Each bridge row carries exactly the parent column matching its
//!   `parent_cat`; the table CHECK and `NoteParent::from_columns` both
//!   enforce it.
//! - Callers run these helpers inside their own transaction; nothing here
//!   commits.

use crate::model::note::{NoteId, NoteParent, ParentCategory};
use crate::queries::Queries;
use crate::repo::{Entity, RepoError, RepoResult};
use log::debug;
use rusqlite::Connection;

/// Attaches `note_id` to `parent`, failing with `NotFound` when the parent
/// row does not exist.
pub fn link_note(conn: &Connection, note_id: NoteId, parent: NoteParent) -> RepoResult<i64> {
    let queries = Queries::new(conn);
    if !queries.parent_exists(parent)? {
        return Err(RepoError::NotFound {
            entity: parent_entity(parent.category()),
            id: parent.id(),
        });
    }
    let link_id = queries.insert_bridge(note_id, parent)?;
    debug!(
        "event=bridge_link module=repo status=ok note_id={} parent_cat={} parent_id={}",
        note_id,
        parent.category().code(),
        parent.id()
    );
    Ok(link_id)
}

/// Returns the parent a note is linked to, or `None` when it has no link.
pub fn parent_of(conn: &Connection, note_id: NoteId) -> RepoResult<Option<NoteParent>> {
    Queries::new(conn).select_bridge_parent(note_id)
}

/// Deletes the notes linked to any of `parent_ids`. Their bridge rows are
/// removed by cascade.
pub fn delete_linked_notes(
    conn: &Connection,
    category: ParentCategory,
    parent_ids: &[i64],
) -> RepoResult<usize> {
    let deleted = Queries::new(conn).delete_notes_for_parents(category, parent_ids)?;
    debug!(
        "event=bridge_cascade module=repo status=ok parent_cat={} parents={} notes_deleted={}",
        category.code(),
        parent_ids.len(),
        deleted
    );
    Ok(deleted)
}

/// Counts bridge rows pointing at a missing note or missing parent.
pub fn count_orphan_links(conn: &Connection) -> RepoResult<i64> {
    Queries::new(conn).count_orphan_bridge_rows()
}

fn parent_entity(category: ParentCategory) -> Entity {
    match category {
        ParentCategory::Task => Entity::Task,
        ParentCategory::Area => Entity::Area,
    }
}
