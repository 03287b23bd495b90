//! Plain-text table and detail views.

use std::fmt::Write;
use taskdeck_core::clock::format_ms;
use taskdeck_core::{Area, AreaListItem, Note, NoteTableRow, Task, TaskListItem};

const MAX_TITLE_CHARS: usize = 40;

pub fn task_table(items: &[TaskListItem]) -> String {
    if items.is_empty() {
        return "No tasks.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<40}  {:<8}  {:<8}  {:<16}  {:>4}  NOTES",
        "ID", "TITLE", "PRIORITY", "STATUS", "DUE", "AGE"
    );
    for item in items {
        let task = &item.task;
        let _ = writeln!(
            out,
            "{:>5}  {:<40}  {:<8}  {:<8}  {:<16}  {:>4}  {}",
            task.id,
            clip(&task.title),
            task.priority,
            task.status,
            optional_date(task.due_at),
            format!("{}d", item.age_days),
            item.note_titles.join(", ")
        );
    }
    out
}

pub fn task_detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Task {}: {}", task.id, task.title);
    let _ = writeln!(out, "  priority: {}", task.priority);
    let _ = writeln!(out, "  status:   {}", task.status);
    if task.archived {
        let _ = writeln!(out, "  archived: yes");
    }
    if let Some(area_id) = task.area_id {
        let _ = writeln!(out, "  area:     {area_id}");
    }
    let _ = writeln!(out, "  created:  {}", format_ms(task.created_at));
    let _ = writeln!(out, "  due:      {}", optional_date(task.due_at));
    if !task.description.is_empty() {
        let _ = writeln!(out, "\n{}", task.description);
    }
    write_notes(&mut out, &task.notes);
    out
}

pub fn area_table(items: &[AreaListItem]) -> String {
    if items.is_empty() {
        return "No areas.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<40}  {:<8}  {:<16}  {:>5}  {:>5}  {:>4}",
        "ID", "TITLE", "STATUS", "DUE", "TASKS", "NOTES", "AGE"
    );
    for item in items {
        let area = &item.area;
        let _ = writeln!(
            out,
            "{:>5}  {:<40}  {:<8}  {:<16}  {:>5}  {:>5}  {:>4}",
            area.id,
            clip(&area.title),
            area.status,
            optional_date(area.due_at),
            item.task_count,
            area.notes.len(),
            format!("{}d", item.age_days)
        );
    }
    out
}

pub fn area_detail(area: &Area) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Area {}: {}", area.id, area.title);
    let _ = writeln!(out, "  status:   {}", area.status);
    if area.archived {
        let _ = writeln!(out, "  archived: yes");
    }
    let _ = writeln!(out, "  created:  {}", format_ms(area.created_at));
    let _ = writeln!(out, "  due:      {}", optional_date(area.due_at));
    if !area.tasks.is_empty() {
        let _ = writeln!(out, "Tasks:");
        for task in &area.tasks {
            let _ = writeln!(
                out,
                "  [{}] {} ({}, {})",
                task.id, task.title, task.status, task.priority
            );
        }
    }
    write_notes(&mut out, &area.notes);
    out
}

pub fn note_table(rows: &[NoteTableRow]) -> String {
    if rows.is_empty() {
        return "No notes.\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>5}  {:<40}  {:<40}  PATH",
        "ID", "TITLE", "LINKED TO"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:>5}  {:<40}  {:<40}  {}",
            row.note_id,
            clip(&row.title),
            clip(&row.link_title),
            row.path
        );
    }
    out
}

pub fn note_detail(note: &Note) -> String {
    format!(
        "Note {}: {}\n  parent:  {}\n  path:    {}\n  created: {}\n",
        note.id,
        note.title,
        note.parent,
        note.path,
        format_ms(note.created_at)
    )
}

fn write_notes(out: &mut String, notes: &[Note]) {
    if notes.is_empty() {
        return;
    }
    let _ = writeln!(out, "Notes:");
    for note in notes {
        let _ = writeln!(out, "  [{}] {} -> {}", note.id, note.title, note.path);
    }
}

fn optional_date(value: Option<i64>) -> String {
    value.map(format_ms).unwrap_or_else(|| "-".to_string())
}

fn clip(value: &str) -> String {
    if value.chars().count() <= MAX_TITLE_CHARS {
        return value.to_string();
    }
    let mut clipped: String = value.chars().take(MAX_TITLE_CHARS - 3).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::{clip, note_table, task_table};
    use taskdeck_core::{NoteParent, NoteTableRow, Priority, Status, Task, TaskListItem};

    fn task(id: i64, title: &str) -> Task {
        Task {
            id,
            title: title.to_string(),
            description: String::new(),
            priority: Priority::High,
            status: Status::Doing,
            archived: false,
            area_id: None,
            created_at: 0,
            updated_at: 0,
            due_at: None,
            notes: Vec::new(),
        }
    }

    #[test]
    fn empty_lists_render_placeholder() {
        assert_eq!(task_table(&[]), "No tasks.\n");
        assert_eq!(note_table(&[]), "No notes.\n");
    }

    #[test]
    fn task_rows_include_labels_and_note_titles() {
        let table = task_table(&[TaskListItem {
            task: task(7, "Ship release"),
            note_titles: vec!["changelog".to_string(), "checklist".to_string()],
            age_days: 2,
        }]);
        let row = table.lines().nth(1).unwrap();
        assert!(row.contains("Ship release"));
        assert!(row.contains("high"));
        assert!(row.contains("doing"));
        assert!(row.contains("2d"));
        assert!(row.ends_with("changelog, checklist"));
    }

    #[test]
    fn note_rows_show_parent_title() {
        let table = note_table(&[NoteTableRow {
            note_id: 3,
            title: "Note 1".to_string(),
            path: "/path/to/note1".to_string(),
            parent: NoteParent::Task(1),
            link_title: "Test Task".to_string(),
        }]);
        assert!(table.contains("Test Task"));
        assert!(table.trim_end().ends_with("/path/to/note1"));
    }

    #[test]
    fn long_titles_are_clipped() {
        let clipped = clip(&"x".repeat(60));
        assert_eq!(clipped.chars().count(), 40);
        assert!(clipped.ends_with("..."));
    }
}
