//! Hand-written SQL statements behind `Queries`.
//!
//! Select statements alias every column so row mappers read by name.

pub(crate) const TASK_COLUMNS: &str = "t.id AS id,
    t.title AS title,
    t.description AS description,
    t.priority AS priority,
    t.status AS status,
    t.archived AS archived,
    t.area_id AS area_id,
    t.created_at AS created_at,
    t.updated_at AS updated_at,
    t.due_at AS due_at";

pub(crate) const AREA_COLUMNS: &str = "a.id AS id,
    a.title AS title,
    a.status AS status,
    a.archived AS archived,
    a.created_at AS created_at,
    a.updated_at AS updated_at,
    a.due_at AS due_at";

pub(crate) const NOTE_COLUMNS: &str = "n.id AS id,
    n.title AS title,
    n.path AS path,
    n.created_at AS created_at,
    b.parent_cat AS parent_cat,
    b.parent_task_id AS parent_task_id,
    b.parent_area_id AS parent_area_id";

// Whole days between now and `created_at`, both in epoch ms.
pub(crate) const TASK_AGE_DAYS: &str =
    "(CAST(strftime('%s', 'now') AS INTEGER) * 1000 - t.created_at) / 86400000";
pub(crate) const AREA_AGE_DAYS: &str =
    "(CAST(strftime('%s', 'now') AS INTEGER) * 1000 - a.created_at) / 86400000";

pub(crate) const INSERT_TASK: &str = "INSERT INTO tasks (
    title,
    description,
    priority,
    status,
    archived,
    area_id,
    created_at,
    updated_at,
    due_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
RETURNING id;";

pub(crate) const INSERT_AREA: &str = "INSERT INTO areas (
    title,
    status,
    archived,
    created_at,
    updated_at,
    due_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
RETURNING id;";

pub(crate) const INSERT_NOTE: &str = "INSERT INTO notes (title, path, created_at)
VALUES (?1, ?2, ?3)
RETURNING id;";

pub(crate) const INSERT_BRIDGE: &str = "INSERT INTO bridge_notes (
    note_id,
    parent_cat,
    parent_task_id,
    parent_area_id
) VALUES (?1, ?2, ?3, ?4)
RETURNING id;";

pub(crate) const SELECT_BRIDGE_PARENT: &str = "SELECT parent_cat, parent_task_id, parent_area_id
FROM bridge_notes
WHERE note_id = ?1;";

pub(crate) const COUNT_ORPHAN_BRIDGE_ROWS: &str = "SELECT COUNT(*)
FROM bridge_notes b
LEFT JOIN notes n ON n.id = b.note_id
LEFT JOIN tasks t ON t.id = b.parent_task_id
LEFT JOIN areas a ON a.id = b.parent_area_id
WHERE n.id IS NULL
   OR (b.parent_cat = 1 AND t.id IS NULL)
   OR (b.parent_cat = 2 AND a.id IS NULL);";

pub(crate) const TASK_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1);";
pub(crate) const AREA_EXISTS: &str = "SELECT EXISTS(SELECT 1 FROM areas WHERE id = ?1);";

pub(crate) const DELETE_TASK: &str = "DELETE FROM tasks WHERE id = ?1;";
pub(crate) const DELETE_AREA: &str = "DELETE FROM areas WHERE id = ?1;";
