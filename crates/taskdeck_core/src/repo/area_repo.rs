//! Area repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `areas` table.
//! - Attach task and note snapshots on read.
//!
//! # Invariants
//! - Same write policy as tasks: validated input, explicit patch mask,
//!   all-or-nothing cascading deletes.
//! - Deleting an area deletes its linked notes; its tasks are kept and
//!   detached (`tasks.area_id` becomes NULL).

use crate::clock::{default_due_ms, now_ms};
use crate::model::area::{Area, AreaId, AreaListItem, AreaPatch, NewArea};
use crate::model::fields::normalize_title;
use crate::model::note::{NoteParent, ParentCategory};
use crate::queries::{bool_to_int, InsertArea, Queries, UpdateTable};
use crate::repo::bridge::delete_linked_notes;
use crate::repo::task_repo::optional_integer;
use crate::repo::{
    ensure_connection_ready, ensure_valid_id, normalize_id_list, Entity, RepoError, RepoResult,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Repository interface for area CRUD operations.
pub trait AreaRepository {
    fn create_area(&self, area: &NewArea) -> RepoResult<AreaId>;
    /// Loads one area with its tasks and notes.
    fn get_area(&self, id: AreaId) -> RepoResult<Area>;
    /// Lists all areas; each area's notes are loaded per row.
    fn list_areas(&self) -> RepoResult<Vec<AreaListItem>>;
    fn update_area(&self, id: AreaId, patch: &AreaPatch) -> RepoResult<usize>;
    fn delete_area(&self, id: AreaId) -> RepoResult<()>;
    fn delete_areas(&self, ids: &[AreaId]) -> RepoResult<usize>;
}

/// SQLite-backed area repository.
pub struct SqliteAreaRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteAreaRepository<'conn> {
    /// Creates repository from a connection whose schema is set up.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl AreaRepository for SqliteAreaRepository<'_> {
    fn create_area(&self, area: &NewArea) -> RepoResult<AreaId> {
        let title = normalize_title(&area.title)?;
        let created_at = now_ms();
        let id = Queries::new(self.conn).insert_area(InsertArea {
            title: title.as_str(),
            status: area.status,
            archived: area.archived,
            created_at,
            due_at: Some(area.due_at.unwrap_or_else(|| default_due_ms(created_at))),
        })?;
        info!("event=area_create module=repo status=ok area_id={}", id);
        Ok(id)
    }

    fn get_area(&self, id: AreaId) -> RepoResult<Area> {
        let queries = Queries::new(self.conn);
        let mut area = queries.select_area(id)?.ok_or(RepoError::NotFound {
            entity: Entity::Area,
            id,
        })?;
        area.tasks = queries.select_tasks_for_area(id)?;
        area.notes = queries.select_notes_for_parent(NoteParent::Area(id))?;
        Ok(area)
    }

    fn list_areas(&self) -> RepoResult<Vec<AreaListItem>> {
        let queries = Queries::new(self.conn);
        let records = queries.select_area_list()?;
        let mut items = Vec::with_capacity(records.len());
        for record in records {
            let mut area = record.area;
            area.notes = queries.select_notes_for_parent(NoteParent::Area(area.id))?;
            items.push(AreaListItem {
                area,
                task_count: record.task_count,
                age_days: record.age_days,
            });
        }
        Ok(items)
    }

    fn update_area(&self, id: AreaId, patch: &AreaPatch) -> RepoResult<usize> {
        ensure_valid_id(id)?;
        if patch.is_empty() {
            return Err(RepoError::EmptyUpdate);
        }
        patch.validate()?;

        let mut columns: Vec<(&'static str, Value)> = Vec::new();
        if let Some(title) = patch.title.as_deref() {
            columns.push(("title", Value::Text(normalize_title(title)?)));
        }
        if let Some(status) = patch.status {
            columns.push(("status", Value::Text(status.as_str().to_string())));
        }
        if let Some(archived) = patch.archived {
            columns.push(("archived", Value::Integer(bool_to_int(archived))));
        }
        if let Some(due_at) = patch.due_at {
            columns.push(("due_at", optional_integer(due_at)));
        }
        columns.push(("updated_at", Value::Integer(now_ms())));

        let changed = Queries::new(self.conn).update_columns(UpdateTable::Areas, id, &columns)?;
        info!(
            "event=area_update module=repo status=ok area_id={} fields={} changed={}",
            id,
            columns.len() - 1,
            changed
        );
        Ok(changed)
    }

    fn delete_area(&self, id: AreaId) -> RepoResult<()> {
        ensure_valid_id(id)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let notes_deleted = delete_linked_notes(&tx, ParentCategory::Area, &[id])?;
        let changed = Queries::new(&tx).delete_area(id)?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: Entity::Area,
                id,
            });
        }
        tx.commit()?;

        info!(
            "event=area_delete module=repo status=ok area_id={} notes_deleted={}",
            id, notes_deleted
        );
        Ok(())
    }

    fn delete_areas(&self, ids: &[AreaId]) -> RepoResult<usize> {
        let ids = normalize_id_list(ids)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let notes_deleted = delete_linked_notes(&tx, ParentCategory::Area, &ids)?;
        let deleted = Queries::new(&tx).delete_areas_in(&ids)?;
        if deleted != ids.len() {
            return Err(RepoError::MissingIds {
                entity: Entity::Area,
                requested: ids.len(),
                found: deleted,
            });
        }
        tx.commit()?;

        info!(
            "event=area_delete_many module=repo status=ok areas_deleted={} notes_deleted={}",
            deleted, notes_deleted
        );
        Ok(deleted)
    }
}
