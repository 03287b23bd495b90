use rusqlite::Connection;
use taskdeck_core::db::{open_db_in_memory, setup_db};
use taskdeck_core::repo::bridge::count_orphan_links;
use taskdeck_core::{
    AreaRepository, Entity, NewArea, NewNote, NewTask, NoteParent, NoteRepository, NoteService,
    NoteServiceError, ParentCategory, RepoError, SqliteAreaRepository, SqliteNoteRepository,
    SqliteTaskRepository, TaskRepository, ValidationError,
};

fn setup() -> Connection {
    let conn = open_db_in_memory().unwrap();
    setup_db(&conn).unwrap();
    conn
}

#[test]
fn create_note_links_exactly_one_parent() {
    let conn = setup();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("host")).unwrap();

    let note_id = notes
        .create_note(&NewNote::new(" Minutes ", " /n/minutes.md "), NoteParent::Task(task_id))
        .unwrap();
    let note = notes.get_note(note_id).unwrap().unwrap();

    assert_eq!(note.title, "Minutes");
    assert_eq!(note.path, "/n/minutes.md");
    assert_eq!(note.parent, NoteParent::Task(task_id));
    assert_eq!(
        notes.parent_of(note_id).unwrap(),
        Some(NoteParent::Task(task_id))
    );
    assert_eq!(tasks.get_task(task_id).unwrap().notes, vec![note]);
}

#[test]
fn create_note_for_missing_parent_leaves_no_orphan() {
    let conn = setup();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();

    let err = notes
        .create_note(&NewNote::new("lost", "/n/lost.md"), NoteParent::Area(12))
        .unwrap_err();

    assert!(matches!(
        err,
        RepoError::NotFound {
            entity: Entity::Area,
            id: 12
        }
    ));
    assert_eq!(count_rows(&conn, "notes"), 0);
    assert_eq!(count_rows(&conn, "bridge_notes"), 0);
}

#[test]
fn create_note_validates_input() {
    let conn = setup();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("host")).unwrap();

    assert!(matches!(
        notes.create_note(&NewNote::new("", "/n/x.md"), NoteParent::Task(task_id)),
        Err(RepoError::Validation(ValidationError::BlankTitle))
    ));
    assert!(matches!(
        notes.create_note(&NewNote::new("x", "  "), NoteParent::Task(task_id)),
        Err(RepoError::Validation(ValidationError::BlankPath))
    ));
    assert!(matches!(
        notes.create_note(&NewNote::new("x", "/n/x.md"), NoteParent::Task(0)),
        Err(RepoError::InvalidId(0))
    ));
}

#[test]
fn get_missing_note_is_none() {
    let conn = setup();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    assert!(notes.get_note(3).unwrap().is_none());
}

#[test]
fn note_without_bridge_row_is_reported_as_invalid_data() {
    let conn = setup();
    conn.execute(
        "INSERT INTO notes (title, path, created_at) VALUES ('stray', '/n/stray.md', 0);",
        [],
    )
    .unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();

    assert!(matches!(notes.get_note(1), Err(RepoError::InvalidData(_))));
}

#[test]
fn list_notes_by_category_carries_parent_title() {
    let conn = setup();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("Fix roof")).unwrap();
    let area_id = areas.create_area(&NewArea::new("House")).unwrap();
    notes
        .create_note(&NewNote::new("quotes", "/n/quotes.md"), NoteParent::Task(task_id))
        .unwrap();
    notes
        .create_note(&NewNote::new("floor plan", "/n/plan.md"), NoteParent::Area(area_id))
        .unwrap();

    let task_rows = notes.list_notes(ParentCategory::Task).unwrap();
    let area_rows = notes.list_notes_by_code(2).unwrap();

    assert_eq!(task_rows.len(), 1);
    assert_eq!(task_rows[0].title, "quotes");
    assert_eq!(task_rows[0].link_title, "Fix roof");
    assert_eq!(task_rows[0].parent, NoteParent::Task(task_id));
    assert_eq!(area_rows.len(), 1);
    assert_eq!(area_rows[0].link_title, "House");
    assert_eq!(area_rows[0].path, "/n/plan.md");
}

#[test]
fn unknown_category_code_is_rejected() {
    let conn = setup();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();

    assert!(matches!(
        notes.list_notes_by_code(3),
        Err(RepoError::InvalidNoteType(3))
    ));
    assert!(matches!(
        notes.list_notes_by_code(0),
        Err(RepoError::InvalidNoteType(0))
    ));
}

#[test]
fn delete_notes_removes_bridge_rows_and_is_atomic() {
    let conn = setup();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("host")).unwrap();
    let a = notes
        .create_note(&NewNote::new("a", "/n/a.md"), NoteParent::Task(task_id))
        .unwrap();
    let b = notes
        .create_note(&NewNote::new("b", "/n/b.md"), NoteParent::Task(task_id))
        .unwrap();

    assert!(matches!(
        notes.delete_notes(&[a, 1000]),
        Err(RepoError::MissingIds {
            entity: Entity::Note,
            requested: 2,
            found: 1
        })
    ));
    assert_eq!(count_rows(&conn, "notes"), 2);

    assert_eq!(notes.delete_notes(&[a]).unwrap(), 1);
    assert_eq!(count_rows(&conn, "bridge_notes"), 1);
    assert_eq!(
        notes
            .list_notes_for(NoteParent::Task(task_id))
            .unwrap()
            .into_iter()
            .map(|note| note.id)
            .collect::<Vec<_>>(),
        vec![b]
    );
    assert!(matches!(notes.delete_notes(&[]), Err(RepoError::EmptyIdList)));
}

#[test]
fn parent_deletes_never_leave_orphan_links() {
    let conn = setup();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();
    let notes = SqliteNoteRepository::try_new(&conn).unwrap();
    let task_ids: Vec<_> = (0..3)
        .map(|i| tasks.create_task(&NewTask::new(format!("task {i}"))).unwrap())
        .collect();
    let area_id = areas.create_area(&NewArea::new("area")).unwrap();
    for (i, task_id) in task_ids.iter().enumerate() {
        notes
            .create_note(
                &NewNote::new(format!("note {i}"), format!("/n/{i}.md")),
                NoteParent::Task(*task_id),
            )
            .unwrap();
    }
    notes
        .create_note(&NewNote::new("area note", "/n/area.md"), NoteParent::Area(area_id))
        .unwrap();

    tasks.delete_task(task_ids[0]).unwrap();
    tasks.delete_tasks(&task_ids[1..]).unwrap();
    areas.delete_area(area_id).unwrap();

    assert_eq!(count_orphan_links(&conn).unwrap(), 0);
    assert_eq!(count_rows(&conn, "notes"), 0);
    assert_eq!(count_rows(&conn, "bridge_notes"), 0);
}

#[test]
fn note_service_creates_file_and_linked_note() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let notes_dir = dir.path().join("notes");
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("host")).unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap(), &notes_dir);

    let first = service
        .create_note_file("Weekly Review", NoteParent::Task(task_id))
        .unwrap();
    let second = service
        .create_note_file("weekly review", NoteParent::Task(task_id))
        .unwrap();

    assert_eq!(first.path, notes_dir.join("weekly-review.md").to_string_lossy());
    assert_eq!(second.path, notes_dir.join("weekly-review-1.md").to_string_lossy());
    assert_eq!(
        std::fs::read_to_string(&first.path).unwrap(),
        "# Weekly Review\n"
    );
    assert_eq!(
        service.note_path(first.id).unwrap(),
        Some(notes_dir.join("weekly-review.md"))
    );

    assert_eq!(service.delete_notes(&[first.id], true).unwrap(), 1);
    assert!(!notes_dir.join("weekly-review.md").exists());
    assert!(notes_dir.join("weekly-review-1.md").exists());
}

#[test]
fn note_service_removes_file_when_parent_is_missing() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap(), dir.path());

    let err = service
        .create_note_file("orphan", NoteParent::Task(8))
        .unwrap_err();

    assert!(matches!(
        err,
        NoteServiceError::Repo(RepoError::NotFound {
            entity: Entity::Task,
            id: 8
        })
    ));
    assert!(!dir.path().join("orphan.md").exists());
    assert_eq!(count_rows(&conn, "notes"), 0);
}

#[test]
fn note_service_attaches_existing_path() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let areas = SqliteAreaRepository::try_new(&conn).unwrap();
    let area_id = areas.create_area(&NewArea::new("Reading")).unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap(), dir.path());

    let id = service
        .attach_existing("Book list", "/home/me/books.md", NoteParent::Area(area_id))
        .unwrap();

    let note = service.get_note(id).unwrap().unwrap();
    assert_eq!(note.path, "/home/me/books.md");
    assert_eq!(note.parent, NoteParent::Area(area_id));
}

#[test]
fn note_service_attach_resolves_relative_paths() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("host")).unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap(), dir.path());

    let id = service
        .attach_existing("Relative", "notes/relative.md", NoteParent::Task(task_id))
        .unwrap();

    let stored = service.note_path(id).unwrap().unwrap();
    assert!(stored.is_absolute());
    assert_eq!(
        stored,
        std::env::current_dir().unwrap().join("notes/relative.md")
    );
}

#[test]
fn note_service_delete_keeps_going_when_a_file_cannot_be_removed() {
    let conn = setup();
    let dir = tempfile::tempdir().unwrap();
    let tasks = SqliteTaskRepository::try_new(&conn).unwrap();
    let task_id = tasks.create_task(&NewTask::new("host")).unwrap();
    let service = NoteService::new(SqliteNoteRepository::try_new(&conn).unwrap(), dir.path());
    let stuck = dir.path().join("stuck");
    std::fs::create_dir(&stuck).unwrap();
    let good = dir.path().join("good.md");
    std::fs::write(&good, "# Good\n").unwrap();
    let stuck_id = service
        .attach_existing("stuck", &stuck, NoteParent::Task(task_id))
        .unwrap();
    let good_id = service
        .attach_existing("good", &good, NoteParent::Task(task_id))
        .unwrap();

    let deleted = service.delete_notes(&[stuck_id, good_id], true).unwrap();

    assert_eq!(deleted, 2);
    assert!(service.get_note(stuck_id).unwrap().is_none());
    assert!(service.get_note(good_id).unwrap().is_none());
    assert!(stuck.is_dir());
    assert!(!good.exists());
    assert_eq!(count_rows(&conn, "bridge_notes"), 0);
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}
