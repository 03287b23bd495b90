//! Strongly typed facade over the hand-written SQL statements.
//!
//! # Responsibility
//! - One method per statement: typed parameters in, model records out.
//! - Decode rows and reject persisted values the model cannot represent.
//!
//! # Invariants
//! - `Queries` never opens or commits transactions. Callers pass either a
//!   plain connection or a `Transaction` (which derefs to one).
//! - Bridge rows are always decoded through `NoteParent::from_columns`.

mod sql;

use crate::model::area::{Area, AreaId};
use crate::model::fields::{Priority, Status};
use crate::model::note::{Note, NoteId, NoteParent, NoteTableRow, ParentCategory};
use crate::model::task::{Task, TaskId, TaskListItem};
use crate::repo::{RepoError, RepoResult};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use std::str::FromStr;

// Separator for aggregated note titles; titles may contain commas.
const TITLE_SEPARATOR: char = '\u{1f}';

/// Parameters for `Queries::insert_task`.
#[derive(Debug, Clone, Copy)]
pub struct InsertTask<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub priority: Priority,
    pub status: Status,
    pub archived: bool,
    pub area_id: Option<AreaId>,
    pub created_at: i64,
    pub due_at: Option<i64>,
}

/// Parameters for `Queries::insert_area`.
#[derive(Debug, Clone, Copy)]
pub struct InsertArea<'a> {
    pub title: &'a str,
    pub status: Status,
    pub archived: bool,
    pub created_at: i64,
    pub due_at: Option<i64>,
}

/// Area list row before its notes are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AreaListRecord {
    pub area: Area,
    pub task_count: i64,
    pub age_days: i64,
}

/// Tables accepting partial updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateTable {
    Tasks,
    Areas,
}

impl UpdateTable {
    fn name(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Areas => "areas",
        }
    }
}

/// Query facade bound to one connection or transaction.
pub struct Queries<'conn> {
    conn: &'conn Connection,
}

impl<'conn> Queries<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn insert_task(&self, task: InsertTask<'_>) -> RepoResult<TaskId> {
        let id = self.conn.query_row(
            sql::INSERT_TASK,
            params![
                task.title,
                task.description,
                task.priority.as_str(),
                task.status.as_str(),
                bool_to_int(task.archived),
                task.area_id,
                task.created_at,
                task.created_at,
                task.due_at,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn select_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks t WHERE t.id = ?1;",
            sql::TASK_COLUMNS
        ))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(row)?)),
            None => Ok(None),
        }
    }

    /// Every task with its linked note titles and age, ordered by id.
    pub fn select_task_list(&self) -> RepoResult<Vec<TaskListItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {columns},
                COALESCE(GROUP_CONCAT(n.title, char(31)), '') AS note_titles,
                {age} AS age_days
             FROM tasks t
             LEFT JOIN bridge_notes b
               ON b.parent_cat = 1 AND b.parent_task_id = t.id
             LEFT JOIN notes n ON n.id = b.note_id
             GROUP BY t.id
             ORDER BY t.id ASC;",
            columns = sql::TASK_COLUMNS,
            age = sql::TASK_AGE_DAYS,
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let joined: String = row.get("note_titles")?;
            items.push(TaskListItem {
                task: parse_task_row(row)?,
                note_titles: split_titles(&joined),
                age_days: row.get("age_days")?,
            });
        }
        Ok(items)
    }

    pub fn select_tasks_for_area(&self, area_id: AreaId) -> RepoResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM tasks t WHERE t.area_id = ?1 ORDER BY t.id ASC;",
            sql::TASK_COLUMNS
        ))?;
        let mut rows = stmt.query([area_id])?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }

    pub fn delete_task(&self, id: TaskId) -> RepoResult<usize> {
        Ok(self.conn.execute(sql::DELETE_TASK, [id])?)
    }

    pub fn delete_tasks_in(&self, ids: &[TaskId]) -> RepoResult<usize> {
        let statement = format!("DELETE FROM tasks WHERE id IN ({});", placeholders(ids.len()));
        Ok(self.conn.execute(&statement, params_from_iter(ids))?)
    }

    pub fn insert_area(&self, area: InsertArea<'_>) -> RepoResult<AreaId> {
        let id = self.conn.query_row(
            sql::INSERT_AREA,
            params![
                area.title,
                area.status.as_str(),
                bool_to_int(area.archived),
                area.created_at,
                area.created_at,
                area.due_at,
            ],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn select_area(&self, id: AreaId) -> RepoResult<Option<Area>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM areas a WHERE a.id = ?1;",
            sql::AREA_COLUMNS
        ))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_area_row(row)?)),
            None => Ok(None),
        }
    }

    /// Every area with its task count and age, ordered by id.
    pub fn select_area_list(&self) -> RepoResult<Vec<AreaListRecord>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {columns},
                (SELECT COUNT(*) FROM tasks t WHERE t.area_id = a.id) AS task_count,
                {age} AS age_days
             FROM areas a
             ORDER BY a.id ASC;",
            columns = sql::AREA_COLUMNS,
            age = sql::AREA_AGE_DAYS,
        ))?;
        let mut rows = stmt.query([])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(AreaListRecord {
                area: parse_area_row(row)?,
                task_count: row.get("task_count")?,
                age_days: row.get("age_days")?,
            });
        }
        Ok(items)
    }

    pub fn delete_area(&self, id: AreaId) -> RepoResult<usize> {
        Ok(self.conn.execute(sql::DELETE_AREA, [id])?)
    }

    pub fn delete_areas_in(&self, ids: &[AreaId]) -> RepoResult<usize> {
        let statement = format!("DELETE FROM areas WHERE id IN ({});", placeholders(ids.len()));
        Ok(self.conn.execute(&statement, params_from_iter(ids))?)
    }

    pub fn insert_note(&self, title: &str, path: &str, created_at: i64) -> RepoResult<NoteId> {
        let id = self.conn.query_row(
            sql::INSERT_NOTE,
            params![title, path, created_at],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn select_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}
             FROM notes n
             LEFT JOIN bridge_notes b ON b.note_id = n.id
             WHERE n.id = ?1;",
            sql::NOTE_COLUMNS
        ))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_note_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn select_notes_for_parent(&self, parent: NoteParent) -> RepoResult<Vec<Note>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {}
             FROM notes n
             INNER JOIN bridge_notes b ON b.note_id = n.id
             WHERE b.parent_cat = ?1 AND b.{} = ?2
             ORDER BY n.id ASC;",
            sql::NOTE_COLUMNS,
            parent_column(parent.category()),
        ))?;
        let mut rows = stmt.query(params![parent.category().code(), parent.id()])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }
        Ok(notes)
    }

    /// Notes of one category joined with their parent's title.
    pub fn select_note_table(&self, category: ParentCategory) -> RepoResult<Vec<NoteTableRow>> {
        let (parent_table, alias) = match category {
            ParentCategory::Task => ("tasks", "t"),
            ParentCategory::Area => ("areas", "a"),
        };
        let mut stmt = self.conn.prepare(&format!(
            "SELECT
                {columns},
                {alias}.title AS link_title
             FROM notes n
             INNER JOIN bridge_notes b ON b.note_id = n.id
             INNER JOIN {parent_table} {alias} ON {alias}.id = b.{parent_column}
             WHERE b.parent_cat = ?1
             ORDER BY n.id ASC;",
            columns = sql::NOTE_COLUMNS,
            parent_column = parent_column(category),
        ))?;
        let mut rows = stmt.query([category.code()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let note = parse_note_row(row)?;
            items.push(NoteTableRow {
                note_id: note.id,
                title: note.title,
                path: note.path,
                parent: note.parent,
                link_title: row.get("link_title")?,
            });
        }
        Ok(items)
    }

    pub fn delete_notes_in(&self, ids: &[NoteId]) -> RepoResult<usize> {
        let statement = format!("DELETE FROM notes WHERE id IN ({});", placeholders(ids.len()));
        Ok(self.conn.execute(&statement, params_from_iter(ids))?)
    }

    /// Deletes every note linked to any of `parent_ids` in `category`.
    ///
    /// Bridge rows go with their notes through `ON DELETE CASCADE`.
    pub fn delete_notes_for_parents(
        &self,
        category: ParentCategory,
        parent_ids: &[i64],
    ) -> RepoResult<usize> {
        let statement = format!(
            "DELETE FROM notes
             WHERE id IN (
                SELECT note_id
                FROM bridge_notes
                WHERE parent_cat = ? AND {} IN ({})
             );",
            parent_column(category),
            placeholders(parent_ids.len()),
        );
        let mut bind_values = Vec::with_capacity(parent_ids.len() + 1);
        bind_values.push(Value::Integer(category.code()));
        bind_values.extend(parent_ids.iter().copied().map(Value::Integer));
        Ok(self.conn.execute(&statement, params_from_iter(bind_values))?)
    }

    pub fn insert_bridge(&self, note_id: NoteId, parent: NoteParent) -> RepoResult<i64> {
        let (parent_cat, parent_task_id, parent_area_id) = parent.to_columns();
        let id = self.conn.query_row(
            sql::INSERT_BRIDGE,
            params![note_id, parent_cat, parent_task_id, parent_area_id],
            |row| row.get(0),
        )?;
        Ok(id)
    }

    pub fn parent_exists(&self, parent: NoteParent) -> RepoResult<bool> {
        let statement = match parent.category() {
            ParentCategory::Task => sql::TASK_EXISTS,
            ParentCategory::Area => sql::AREA_EXISTS,
        };
        let exists: i64 = self.conn.query_row(statement, [parent.id()], |row| row.get(0))?;
        Ok(exists == 1)
    }

    pub fn select_bridge_parent(&self, note_id: NoteId) -> RepoResult<Option<NoteParent>> {
        let columns = self
            .conn
            .query_row(sql::SELECT_BRIDGE_PARENT, [note_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, Option<i64>>(1)?,
                    row.get::<_, Option<i64>>(2)?,
                ))
            })
            .optional()?;
        match columns {
            Some((parent_cat, task_id, area_id)) => {
                decode_parent(note_id, Some(parent_cat), task_id, area_id).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Bridge rows whose note or authoritative parent no longer exists.
    pub fn count_orphan_bridge_rows(&self) -> RepoResult<i64> {
        Ok(self
            .conn
            .query_row(sql::COUNT_ORPHAN_BRIDGE_ROWS, [], |row| row.get(0))?)
    }

    /// Runs `UPDATE <table> SET <col> = ?, ... WHERE id = ?`.
    ///
    /// Column names are compile-time constants supplied by repositories.
    pub fn update_columns(
        &self,
        table: UpdateTable,
        id: i64,
        columns: &[(&'static str, Value)],
    ) -> RepoResult<usize> {
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(index, (column, _))| format!("{column} = ?{}", index + 1))
            .collect::<Vec<_>>()
            .join(", ");
        let statement = format!(
            "UPDATE {} SET {assignments} WHERE id = ?{};",
            table.name(),
            columns.len() + 1
        );
        let mut bind_values: Vec<Value> = columns.iter().map(|(_, value)| value.clone()).collect();
        bind_values.push(Value::Integer(id));
        Ok(self.conn.execute(&statement, params_from_iter(bind_values))?)
    }
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        priority: parse_label::<Priority>(row, "priority", "tasks.priority")?,
        status: parse_label::<Status>(row, "status", "tasks.status")?,
        archived: parse_flag(row, "archived", "tasks.archived")?,
        area_id: row.get("area_id")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        due_at: row.get("due_at")?,
        notes: Vec::new(),
    })
}

fn parse_area_row(row: &Row<'_>) -> RepoResult<Area> {
    Ok(Area {
        id: row.get("id")?,
        title: row.get("title")?,
        status: parse_label::<Status>(row, "status", "areas.status")?,
        archived: parse_flag(row, "archived", "areas.archived")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        due_at: row.get("due_at")?,
        tasks: Vec::new(),
        notes: Vec::new(),
    })
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id: NoteId = row.get("id")?;
    let parent = decode_parent(
        id,
        row.get("parent_cat")?,
        row.get("parent_task_id")?,
        row.get("parent_area_id")?,
    )?;
    Ok(Note {
        id,
        title: row.get("title")?,
        path: row.get("path")?,
        parent,
        created_at: row.get("created_at")?,
    })
}

fn decode_parent(
    note_id: NoteId,
    parent_cat: Option<i64>,
    parent_task_id: Option<i64>,
    parent_area_id: Option<i64>,
) -> RepoResult<NoteParent> {
    let Some(parent_cat) = parent_cat else {
        return Err(RepoError::InvalidData(format!(
            "note {note_id} has no bridge_notes row"
        )));
    };
    NoteParent::from_columns(parent_cat, parent_task_id, parent_area_id).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "inconsistent bridge_notes row for note {note_id}: parent_cat={parent_cat} \
             parent_task_id={parent_task_id:?} parent_area_id={parent_area_id:?}"
        ))
    })
}

fn parse_label<T: FromStr>(row: &Row<'_>, column: &str, location: &str) -> RepoResult<T> {
    let value: String = row.get(column)?;
    value
        .parse::<T>()
        .map_err(|_| RepoError::InvalidData(format!("invalid value `{value}` in {location}")))
}

fn parse_flag(row: &Row<'_>, column: &str, location: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(column)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid flag `{other}` in {location}"
        ))),
    }
}

fn parent_column(category: ParentCategory) -> &'static str {
    match category {
        ParentCategory::Task => "parent_task_id",
        ParentCategory::Area => "parent_area_id",
    }
}

fn split_titles(joined: &str) -> Vec<String> {
    let mut titles: Vec<String> = joined
        .split(TITLE_SEPARATOR)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .collect();
    titles.sort();
    titles
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
