//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls with file-system side effects.
//! - Keep CLI layers decoupled from storage details.

pub mod note_service;
