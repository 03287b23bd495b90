//! `taskdeck` command-line entry point.
//!
//! # Responsibility
//! - Parse arguments, load configuration and start logging.
//! - Open the database and dispatch to core repositories.
//! - Render results as plain tables or JSON.

mod editor;
mod render;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{debug, info};
use rusqlite::Connection;
use std::path::PathBuf;
use std::process::ExitCode;
use taskdeck_core::clock::parse_date_ms;
use taskdeck_core::db::{is_setup, open_db, reset_db, setup_db};
use taskdeck_core::{
    init_logging, AppConfig, AreaId, AreaPatch, AreaRepository, NewArea, NewTask, NoteId,
    NoteParent, NoteRepository, NoteService, ParentCategory, Priority, SqliteAreaRepository,
    SqliteNoteRepository, SqliteTaskRepository, Status, TaskId, TaskPatch, TaskRepository,
};

#[derive(Debug, Parser)]
#[command(name = "taskdeck", version)]
#[command(about = "Tasks, areas and linked markdown notes in one SQLite file")]
struct Cli {
    /// YAML config file (defaults to the per-user config path).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database schema.
    Init(InitArgs),
    /// Manage tasks.
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Manage areas.
    Area {
        #[command(subcommand)]
        command: AreaCommand,
    },
    /// Manage notes linked to tasks or areas.
    Note {
        #[command(subcommand)]
        command: NoteCommand,
    },
}

#[derive(Debug, Args)]
struct InitArgs {
    /// Drop every table and recreate an empty schema.
    #[arg(long)]
    reset: bool,
}

#[derive(Debug, Subcommand)]
enum TaskCommand {
    /// Create a task.
    Add(TaskAddArgs),
    /// List all tasks.
    List(ListArgs),
    /// Show one task with its notes.
    Show(ShowArgs),
    /// Change selected fields of a task.
    Update(TaskUpdateArgs),
    /// Delete tasks and their notes.
    Delete(DeleteArgs),
}

#[derive(Debug, Subcommand)]
enum AreaCommand {
    /// Create an area.
    Add(AreaAddArgs),
    /// List all areas.
    List(ListArgs),
    /// Show one area with its tasks and notes.
    Show(ShowArgs),
    /// Change selected fields of an area.
    Update(AreaUpdateArgs),
    /// Delete areas and their notes; their tasks are kept.
    Delete(DeleteArgs),
}

#[derive(Debug, Subcommand)]
enum NoteCommand {
    /// Create a note file, or link an existing file with `--path`.
    Add(NoteAddArgs),
    /// List notes of one parent kind with their parent titles.
    List(NoteListArgs),
    /// Show one note.
    Show(ShowArgs),
    /// Open a note in the configured editor.
    Open(OpenArgs),
    /// Delete notes.
    Delete(NoteDeleteArgs),
}

#[derive(Debug, Args)]
struct TaskAddArgs {
    title: String,
    #[arg(long, default_value = "")]
    description: String,
    /// low|medium|high|urgent
    #[arg(long, default_value = "medium")]
    priority: Priority,
    /// todo|planning|doing|done
    #[arg(long, default_value = "todo")]
    status: Status,
    /// Due date `YYYY-MM-DD` or `YYYY-MM-DD HH:MM` (UTC). Defaults to one week out.
    #[arg(long, value_parser = parse_due)]
    due: Option<i64>,
    /// Owning area id.
    #[arg(long)]
    area: Option<AreaId>,
}

#[derive(Debug, Args)]
struct TaskUpdateArgs {
    id: TaskId,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    priority: Option<Priority>,
    #[arg(long)]
    status: Option<Status>,
    #[arg(long)]
    archived: Option<bool>,
    #[arg(long, value_parser = parse_due, conflicts_with = "no_due")]
    due: Option<i64>,
    /// Clear the due date.
    #[arg(long)]
    no_due: bool,
    #[arg(long, conflicts_with = "no_area")]
    area: Option<AreaId>,
    /// Detach the task from its area.
    #[arg(long)]
    no_area: bool,
}

#[derive(Debug, Args)]
struct AreaAddArgs {
    title: String,
    /// todo|planning|doing|done
    #[arg(long, default_value = "todo")]
    status: Status,
    #[arg(long, value_parser = parse_due)]
    due: Option<i64>,
}

#[derive(Debug, Args)]
struct AreaUpdateArgs {
    id: AreaId,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    status: Option<Status>,
    #[arg(long)]
    archived: Option<bool>,
    #[arg(long, value_parser = parse_due, conflicts_with = "no_due")]
    due: Option<i64>,
    #[arg(long)]
    no_due: bool,
}

#[derive(Debug, Args)]
struct NoteAddArgs {
    title: String,
    /// Parent task id.
    #[arg(long, conflicts_with = "area", required_unless_present = "area")]
    task: Option<TaskId>,
    /// Parent area id.
    #[arg(long)]
    area: Option<AreaId>,
    /// Link this existing file instead of creating one.
    #[arg(long)]
    path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NoteKind {
    Task,
    Area,
}

impl From<NoteKind> for ParentCategory {
    fn from(kind: NoteKind) -> Self {
        match kind {
            NoteKind::Task => Self::Task,
            NoteKind::Area => Self::Area,
        }
    }
}

#[derive(Debug, Args)]
struct NoteListArgs {
    /// Parent kind to list.
    #[arg(long, value_enum, default_value = "task")]
    kind: NoteKind,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct NoteDeleteArgs {
    #[arg(required = true)]
    ids: Vec<NoteId>,
    /// Also delete the markdown files.
    #[arg(long)]
    remove_files: bool,
}

#[derive(Debug, Args)]
struct ListArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct ShowArgs {
    id: i64,
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct OpenArgs {
    id: NoteId,
}

#[derive(Debug, Args)]
struct DeleteArgs {
    #[arg(required = true)]
    ids: Vec<i64>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config =
        AppConfig::load_or_default(cli.config.as_deref()).context("failed to load config")?;
    if let Err(err) = init_logging(&config) {
        eprintln!("warning: file logging disabled: {err}");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open `{}`", config.db_path.display()))?;
    debug!("event=cli_dispatch module=cli status=start");

    match cli.command {
        Command::Init(args) => run_init(&conn, &config, args),
        Command::Task { command } => run_task(&conn, command),
        Command::Area { command } => run_area(&conn, command),
        Command::Note { command } => run_note(&conn, &config, command),
    }
}

fn run_init(conn: &Connection, config: &AppConfig, args: InitArgs) -> Result<()> {
    if args.reset {
        reset_db(conn).context("failed to reset database")?;
        info!("event=db_reset module=cli status=ok");
        println!("Reset database at {}", config.db_path.display());
        return Ok(());
    }
    if is_setup(conn)? {
        println!("Database already set up at {}", config.db_path.display());
        return Ok(());
    }
    setup_db(conn).context("failed to create schema")?;
    println!("Created database at {}", config.db_path.display());
    Ok(())
}

fn run_task(conn: &Connection, command: TaskCommand) -> Result<()> {
    let repo = SqliteTaskRepository::try_new(conn)?;
    match command {
        TaskCommand::Add(args) => {
            let id = repo.create_task(&NewTask {
                title: args.title,
                description: args.description,
                priority: args.priority,
                status: args.status,
                archived: false,
                area_id: args.area,
                due_at: args.due,
            })?;
            println!("Created task {id}");
        }
        TaskCommand::List(args) => {
            let items = repo.list_tasks()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print!("{}", render::task_table(&items));
            }
        }
        TaskCommand::Show(args) => {
            let task = repo.get_task(args.id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&task)?);
            } else {
                print!("{}", render::task_detail(&task));
            }
        }
        TaskCommand::Update(args) => {
            let patch = TaskPatch {
                title: args.title,
                description: args.description,
                priority: args.priority,
                status: args.status,
                archived: args.archived,
                area_id: clearable(args.area, args.no_area),
                due_at: clearable(args.due, args.no_due),
            };
            let changed = repo.update_task(args.id, &patch)?;
            if changed == 0 {
                bail!("task not found: {}", args.id);
            }
            println!("Updated task {}", args.id);
        }
        TaskCommand::Delete(args) => {
            let deleted = match args.ids.as_slice() {
                [id] => repo.delete_task(*id).map(|()| 1)?,
                ids => repo.delete_tasks(ids)?,
            };
            println!("Deleted {deleted} task(s)");
        }
    }
    Ok(())
}

fn run_area(conn: &Connection, command: AreaCommand) -> Result<()> {
    let repo = SqliteAreaRepository::try_new(conn)?;
    match command {
        AreaCommand::Add(args) => {
            let id = repo.create_area(&NewArea {
                title: args.title,
                status: args.status,
                archived: false,
                due_at: args.due,
            })?;
            println!("Created area {id}");
        }
        AreaCommand::List(args) => {
            let items = repo.list_areas()?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                print!("{}", render::area_table(&items));
            }
        }
        AreaCommand::Show(args) => {
            let area = repo.get_area(args.id)?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&area)?);
            } else {
                print!("{}", render::area_detail(&area));
            }
        }
        AreaCommand::Update(args) => {
            let patch = AreaPatch {
                title: args.title,
                status: args.status,
                archived: args.archived,
                due_at: clearable(args.due, args.no_due),
            };
            let changed = repo.update_area(args.id, &patch)?;
            if changed == 0 {
                bail!("area not found: {}", args.id);
            }
            println!("Updated area {}", args.id);
        }
        AreaCommand::Delete(args) => {
            let deleted = match args.ids.as_slice() {
                [id] => repo.delete_area(*id).map(|()| 1)?,
                ids => repo.delete_areas(ids)?,
            };
            println!("Deleted {deleted} area(s)");
        }
    }
    Ok(())
}

fn run_note(conn: &Connection, config: &AppConfig, command: NoteCommand) -> Result<()> {
    let repo = SqliteNoteRepository::try_new(conn)?;
    match command {
        NoteCommand::Add(args) => {
            let parent = note_parent(args.task, args.area)?;
            let service = NoteService::new(repo, &config.notes_dir);
            match args.path {
                Some(path) => {
                    let id = service.attach_existing(&args.title, &path, parent)?;
                    println!("Linked note {id} to {parent}");
                }
                None => {
                    let note = service.create_note_file(&args.title, parent)?;
                    println!("Created note {} at {}", note.id, note.path);
                }
            }
        }
        NoteCommand::List(args) => {
            let rows = repo.list_notes(args.kind.into())?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                print!("{}", render::note_table(&rows));
            }
        }
        NoteCommand::Show(args) => {
            let note = repo
                .get_note(args.id)?
                .ok_or_else(|| anyhow!("note not found: {}", args.id))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                print!("{}", render::note_detail(&note));
            }
        }
        NoteCommand::Open(args) => {
            let service = NoteService::new(repo, &config.notes_dir);
            let path = service
                .note_path(args.id)?
                .ok_or_else(|| anyhow!("note not found: {}", args.id))?;
            editor::open_in_editor(&config.resolved_editor(), &path)?;
        }
        NoteCommand::Delete(args) => {
            let service = NoteService::new(repo, &config.notes_dir);
            let deleted = service.delete_notes(&args.ids, args.remove_files)?;
            println!("Deleted {deleted} note(s)");
        }
    }
    Ok(())
}

fn note_parent(task: Option<TaskId>, area: Option<AreaId>) -> Result<NoteParent> {
    match (task, area) {
        (Some(task_id), None) => Ok(NoteParent::Task(task_id)),
        (None, Some(area_id)) => Ok(NoteParent::Area(area_id)),
        _ => bail!("pass exactly one of --task or --area"),
    }
}

/// Maps `--x VALUE` / `--no-x` to a nullable-column patch entry.
fn clearable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
    if clear {
        Some(None)
    } else {
        value.map(Some)
    }
}

fn parse_due(value: &str) -> Result<i64, String> {
    parse_date_ms(value)
        .ok_or_else(|| format!("`{value}` is not a date; use YYYY-MM-DD or YYYY-MM-DD HH:MM"))
}

#[cfg(test)]
mod tests {
    use super::{clearable, note_parent, parse_due, Cli};
    use clap::{CommandFactory, Parser};
    use taskdeck_core::NoteParent;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn clearable_prefers_clear_flag() {
        assert_eq!(clearable(Some(3), false), Some(Some(3)));
        assert_eq!(clearable(Some(3), true), Some(None));
        assert_eq!(clearable::<i64>(None, false), None);
    }

    #[test]
    fn note_parent_requires_exactly_one_side() {
        assert_eq!(note_parent(Some(1), None).unwrap(), NoteParent::Task(1));
        assert_eq!(note_parent(None, Some(2)).unwrap(), NoteParent::Area(2));
        assert!(note_parent(None, None).is_err());
        assert!(note_parent(Some(1), Some(2)).is_err());
    }

    #[test]
    fn due_dates_parse_or_explain() {
        assert!(parse_due("2024-05-01").is_ok());
        assert!(parse_due("tomorrow").unwrap_err().contains("YYYY-MM-DD"));
    }

    #[test]
    fn task_add_accepts_status_alias_and_priority_case() {
        let cli = Cli::try_parse_from([
            "taskdeck", "task", "add", "Write", "--priority", "High", "--status", "open",
        ])
        .unwrap();
        let super::Command::Task {
            command: super::TaskCommand::Add(args),
        } = cli.command
        else {
            panic!("expected task add");
        };
        assert_eq!(args.priority, taskdeck_core::Priority::High);
        assert_eq!(args.status, taskdeck_core::Status::Todo);
        assert!(args.due.is_none());
    }

    #[test]
    fn note_add_rejects_both_parents() {
        let result = Cli::try_parse_from([
            "taskdeck", "note", "add", "x", "--task", "1", "--area", "2",
        ]);
        assert!(result.is_err());
    }
}
