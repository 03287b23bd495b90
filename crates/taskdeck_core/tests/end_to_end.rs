use taskdeck_core::db::{open_db, setup_db};
use taskdeck_core::repo::bridge::count_orphan_links;
use taskdeck_core::{
    AreaRepository, NewArea, NewNote, NewTask, NoteParent, NoteRepository, ParentCategory,
    Priority, SqliteAreaRepository, SqliteNoteRepository, SqliteTaskRepository, Status,
    TaskRepository,
};

#[test]
fn area_task_note_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let conn = open_db(dir.path().join("taskdeck.sqlite3")).unwrap();
    setup_db(&conn).unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();

    let area_id = areas
        .create_area(&NewArea {
            status: "todo".parse().unwrap(),
            ..NewArea::new("Test Area")
        })
        .unwrap();
    let task_id = tasks
        .create_task(&NewTask {
            priority: "High".parse().unwrap(),
            status: "Open".parse().unwrap(),
            ..NewTask::new("Test Task")
        })
        .unwrap();
    let note_id = notes
        .create_note(&NewNote::new("Note 1", "/path/to/note1"), NoteParent::Task(task_id))
        .unwrap();

    let area = areas.get_area(area_id).unwrap();
    assert_eq!(area.title, "Test Area");
    assert_eq!(area.status, Status::Todo);

    let task = tasks.get_task(task_id).unwrap();
    assert_eq!(task.priority, Priority::High);
    assert_eq!(task.status, Status::Todo);
    assert_eq!(task.notes.len(), 1);

    let rows = notes.list_notes(ParentCategory::Task).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].note_id, note_id);
    assert_eq!(rows[0].title, "Note 1");
    assert_eq!(rows[0].path, "/path/to/note1");
    assert_eq!(rows[0].link_title, "Test Task");

    let listed = tasks.list_tasks().unwrap();
    assert_eq!(listed[0].note_titles, vec!["Note 1"]);

    tasks.delete_task(task_id).unwrap();

    assert!(notes.get_note(note_id).unwrap().is_none());
    assert!(notes.list_notes(ParentCategory::Task).unwrap().is_empty());
    assert_eq!(count_orphan_links(&conn).unwrap(), 0);
    assert_eq!(areas.list_areas().unwrap().len(), 1);
}
