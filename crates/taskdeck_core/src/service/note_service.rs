//! Note use-case service.
//!
//! # Responsibility
//! - Create the markdown file behind a new note under the notes directory.
//! - Persist the note and its parent link through `NoteRepository`.
//! - Resolve note file paths for the editor launcher.
//!
//! # Invariants
//! - A new note file never overwrites an existing file.
//! - If the database write fails, the freshly created file is removed again.
//! - Note deletes report success once the database commit happened; file
//!   removal failures after that point are logged only.

use crate::model::fields::normalize_title;
use crate::model::note::{NewNote, Note, NoteId, NoteParent};
use crate::repo::{RepoError, RepoResult};
use crate::repo::note_repo::NoteRepository;
use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

static NON_SLUG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid slug regex"));

const NOTE_EXTENSION: &str = "md";
const MAX_SLUG_CHARS: usize = 64;
const MAX_PATH_ATTEMPTS: usize = 1000;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Note file could not be created or removed.
    Io { path: PathBuf, source: std::io::Error },
    /// Persistence-layer failure.
    Repo(RepoError),
    /// Internal consistency mismatch between write and read-back.
    InconsistentState(&'static str),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "note file `{}`: {source}", path.display())
            }
            Self::Repo(err) => write!(f, "{err}"),
            Self::InconsistentState(details) => write!(f, "inconsistent note state: {details}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Repo(err) => Some(err),
            Self::InconsistentState(_) => None,
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Note service facade over repository implementations.
pub struct NoteService<R: NoteRepository> {
    repo: R,
    notes_dir: PathBuf,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service writing note files below `notes_dir`.
    pub fn new(repo: R, notes_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            notes_dir: notes_dir.into(),
        }
    }

    /// Creates `<notes_dir>/<slug>.md` and a note linked to `parent`.
    pub fn create_note_file(
        &self,
        title: &str,
        parent: NoteParent,
    ) -> Result<Note, NoteServiceError> {
        let title = normalize_title(title).map_err(RepoError::from)?;
        std::fs::create_dir_all(&self.notes_dir).map_err(|source| NoteServiceError::Io {
            path: self.notes_dir.clone(),
            source,
        })?;
        let path = create_unique_note_file(&self.notes_dir, &title)?;

        let new_note = NewNote::new(title, path.to_string_lossy());
        let note_id = match self.repo.create_note(&new_note, parent) {
            Ok(note_id) => note_id,
            Err(err) => {
                if let Err(remove_err) = std::fs::remove_file(&path) {
                    warn!(
                        "event=note_file_cleanup module=service status=error error={}",
                        remove_err
                    );
                }
                return Err(err.into());
            }
        };

        self.repo
            .get_note(note_id)?
            .ok_or(NoteServiceError::InconsistentState(
                "created note not found in read-back",
            ))
    }

    /// Links an existing file as a note without touching the file system.
    ///
    /// Relative paths are resolved against the current directory before
    /// they are stored.
    pub fn attach_existing(
        &self,
        title: &str,
        path: impl AsRef<Path>,
        parent: NoteParent,
    ) -> Result<NoteId, NoteServiceError> {
        let path = path.as_ref();
        let resolved = std::path::absolute(path).map_err(|source| NoteServiceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let new_note = NewNote::new(title, resolved.to_string_lossy());
        Ok(self.repo.create_note(&new_note, parent)?)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        self.repo.get_note(id)
    }

    /// File path of a note, for handing to an editor.
    pub fn note_path(&self, id: NoteId) -> RepoResult<Option<PathBuf>> {
        Ok(self.repo.get_note(id)?.map(|note| PathBuf::from(note.path)))
    }

    /// Deletes notes; with `remove_files`, also deletes their markdown files.
    ///
    /// The database delete is authoritative. Once it has committed, every
    /// file is attempted; files that cannot be removed are logged and left
    /// behind. Files already missing on disk are ignored.
    pub fn delete_notes(&self, ids: &[NoteId], remove_files: bool) -> RepoResult<usize> {
        let mut paths = Vec::new();
        if remove_files {
            for id in ids {
                if let Some(note) = self.repo.get_note(*id)? {
                    paths.push(PathBuf::from(note.path));
                }
            }
        }

        let deleted = self.repo.delete_notes(ids)?;
        let mut failed = 0usize;
        for path in &paths {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    failed += 1;
                    warn!(
                        "event=note_file_remove module=service status=error error={}",
                        err
                    );
                }
            }
        }
        if failed > 0 {
            warn!(
                "event=note_delete module=service status=partial notes_deleted={} files_left={}",
                deleted, failed
            );
        }
        Ok(deleted)
    }
}

/// Lowercase ASCII slug of a title; `note` when nothing usable remains.
pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    let slug = NON_SLUG_RE.replace_all(&lowered, "-");
    let slug: String = slug.trim_matches('-').chars().take(MAX_SLUG_CHARS).collect();
    let slug = slug.trim_end_matches('-');
    if slug.is_empty() {
        "note".to_string()
    } else {
        slug.to_string()
    }
}

fn create_unique_note_file(dir: &Path, title: &str) -> Result<PathBuf, NoteServiceError> {
    let slug = slugify(title);
    for attempt in 0..MAX_PATH_ATTEMPTS {
        let file_name = if attempt == 0 {
            format!("{slug}.{NOTE_EXTENSION}")
        } else {
            format!("{slug}-{attempt}.{NOTE_EXTENSION}")
        };
        let path = dir.join(file_name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => {
                write_heading(&path, file, title)?;
                return Ok(path);
            }
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(NoteServiceError::Io { path, source }),
        }
    }
    Err(NoteServiceError::Io {
        path: dir.join(format!("{slug}.{NOTE_EXTENSION}")),
        source: std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "no free note file name",
        ),
    })
}

/// Writes the markdown heading into a freshly created note file. On failure
/// the file is removed so the slug stays free.
fn write_heading(path: &Path, mut file: impl Write, title: &str) -> Result<(), NoteServiceError> {
    if let Err(source) = writeln!(file, "# {title}") {
        drop(file);
        if let Err(remove_err) = std::fs::remove_file(path) {
            warn!(
                "event=note_file_cleanup module=service status=error error={}",
                remove_err
            );
        }
        return Err(NoteServiceError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{create_unique_note_file, slugify, write_heading, NoteServiceError};
    use std::io::Write;

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no space left"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn slugify_collapses_symbols_and_whitespace() {
        assert_eq!(slugify("Meeting Notes: Q3 / Plan!"), "meeting-notes-q3-plan");
        assert_eq!(slugify("  ***  "), "note");
    }

    #[test]
    fn colliding_titles_get_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let first = create_unique_note_file(dir.path(), "Daily").unwrap();
        let second = create_unique_note_file(dir.path(), "daily").unwrap();
        assert_eq!(first.file_name().unwrap(), "daily.md");
        assert_eq!(second.file_name().unwrap(), "daily-1.md");
        let content = std::fs::read_to_string(first).unwrap();
        assert_eq!(content, "# Daily\n");
    }

    #[test]
    fn failed_heading_write_removes_the_new_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft.md");
        std::fs::File::create(&path).unwrap();

        let err = write_heading(&path, FullDisk, "Draft").unwrap_err();

        assert!(matches!(err, NoteServiceError::Io { .. }));
        assert!(!path.exists());
        let next = create_unique_note_file(dir.path(), "Draft").unwrap();
        assert_eq!(next.file_name().unwrap(), "draft.md");
    }
}
