//! Domain model for tasks, areas and notes.
//!
//! # Responsibility
//! - Define canonical records, create inputs and partial-update masks.
//! - Own enum parsing and field validation shared by all repositories.
//!
//! # Invariants
//! - Every entity is identified by its SQLite row id.
//! - A note has exactly one parent, expressed as `NoteParent`.

pub mod area;
pub mod fields;
pub mod note;
pub mod task;
