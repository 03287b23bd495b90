//! Task repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `tasks` table.
//! - Own the delete cascade to task-linked notes.
//!
//! # Invariants
//! - Write paths validate input before SQL mutations.
//! - `delete_task`/`delete_tasks` remove linked notes and the task rows in
//!   one transaction, or change nothing.
//! - `update_task` writes only the fields present in `TaskPatch`.

use crate::clock::{default_due_ms, now_ms};
use crate::model::fields::normalize_title;
use crate::model::note::{NoteParent, ParentCategory};
use crate::model::task::{NewTask, Task, TaskId, TaskListItem, TaskPatch};
use crate::queries::{bool_to_int, InsertTask, Queries, UpdateTable};
use crate::repo::bridge::delete_linked_notes;
use crate::repo::{
    ensure_connection_ready, ensure_valid_id, normalize_id_list, Entity, RepoError, RepoResult,
};
use log::info;
use rusqlite::types::Value;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Repository interface for task CRUD operations.
pub trait TaskRepository {
    /// Inserts one task and returns its generated id.
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskId>;
    /// Loads one task with its linked notes.
    fn get_task(&self, id: TaskId) -> RepoResult<Task>;
    /// Lists all tasks with linked note titles and age in days.
    fn list_tasks(&self) -> RepoResult<Vec<TaskListItem>>;
    /// Applies a partial update and returns the number of rows changed.
    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<usize>;
    /// Deletes one task and every note linked to it.
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    /// Deletes several tasks and their notes atomically.
    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Creates repository from a connection whose schema is set up.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &NewTask) -> RepoResult<TaskId> {
        let title = normalize_title(&task.title)?;
        let created_at = now_ms();
        let id = Queries::new(self.conn).insert_task(InsertTask {
            title: title.as_str(),
            description: task.description.as_str(),
            priority: task.priority,
            status: task.status,
            archived: task.archived,
            area_id: task.area_id,
            created_at,
            due_at: Some(task.due_at.unwrap_or_else(|| default_due_ms(created_at))),
        })?;
        info!("event=task_create module=repo status=ok task_id={}", id);
        Ok(id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Task> {
        let queries = Queries::new(self.conn);
        let mut task = queries.select_task(id)?.ok_or(RepoError::NotFound {
            entity: Entity::Task,
            id,
        })?;
        task.notes = queries.select_notes_for_parent(NoteParent::Task(id))?;
        Ok(task)
    }

    fn list_tasks(&self) -> RepoResult<Vec<TaskListItem>> {
        Queries::new(self.conn).select_task_list()
    }

    fn update_task(&self, id: TaskId, patch: &TaskPatch) -> RepoResult<usize> {
        ensure_valid_id(id)?;
        if patch.is_empty() {
            return Err(RepoError::EmptyUpdate);
        }
        patch.validate()?;

        let mut columns: Vec<(&'static str, Value)> = Vec::new();
        if let Some(title) = patch.title.as_deref() {
            columns.push(("title", Value::Text(normalize_title(title)?)));
        }
        if let Some(description) = patch.description.as_ref() {
            columns.push(("description", Value::Text(description.clone())));
        }
        if let Some(priority) = patch.priority {
            columns.push(("priority", Value::Text(priority.as_str().to_string())));
        }
        if let Some(status) = patch.status {
            columns.push(("status", Value::Text(status.as_str().to_string())));
        }
        if let Some(archived) = patch.archived {
            columns.push(("archived", Value::Integer(bool_to_int(archived))));
        }
        if let Some(area_id) = patch.area_id {
            columns.push(("area_id", optional_integer(area_id)));
        }
        if let Some(due_at) = patch.due_at {
            columns.push(("due_at", optional_integer(due_at)));
        }
        columns.push(("updated_at", Value::Integer(now_ms())));

        let changed = Queries::new(self.conn).update_columns(UpdateTable::Tasks, id, &columns)?;
        info!(
            "event=task_update module=repo status=ok task_id={} fields={} changed={}",
            id,
            columns.len() - 1,
            changed
        );
        Ok(changed)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        ensure_valid_id(id)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let notes_deleted = delete_linked_notes(&tx, ParentCategory::Task, &[id])?;
        let changed = Queries::new(&tx).delete_task(id)?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: Entity::Task,
                id,
            });
        }
        tx.commit()?;

        info!(
            "event=task_delete module=repo status=ok task_id={} notes_deleted={}",
            id, notes_deleted
        );
        Ok(())
    }

    fn delete_tasks(&self, ids: &[TaskId]) -> RepoResult<usize> {
        let ids = normalize_id_list(ids)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let notes_deleted = delete_linked_notes(&tx, ParentCategory::Task, &ids)?;
        let deleted = Queries::new(&tx).delete_tasks_in(&ids)?;
        if deleted != ids.len() {
            return Err(RepoError::MissingIds {
                entity: Entity::Task,
                requested: ids.len(),
                found: deleted,
            });
        }
        tx.commit()?;

        info!(
            "event=task_delete_many module=repo status=ok tasks_deleted={} notes_deleted={}",
            deleted, notes_deleted
        );
        Ok(deleted)
    }
}

pub(crate) fn optional_integer(value: Option<i64>) -> Value {
    match value {
        Some(value) => Value::Integer(value),
        None => Value::Null,
    }
}
