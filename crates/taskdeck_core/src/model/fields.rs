//! Enumerated field values and validation errors.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Validation failure for user-provided field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after trim.
    BlankTitle,
    /// Note path is empty after trim.
    BlankPath,
    /// Priority label is not one of `low|medium|high|urgent`.
    InvalidPriority(String),
    /// Status label is not one of `todo|planning|doing|done`.
    InvalidStatus(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankTitle => write!(f, "title must not be blank"),
            Self::BlankPath => write!(f, "note path must not be blank"),
            Self::InvalidPriority(value) => write!(
                f,
                "invalid priority `{value}`; expected low|medium|high|urgent"
            ),
            Self::InvalidStatus(value) => write!(
                f,
                "invalid status `{value}`; expected todo|planning|doing|done"
            ),
        }
    }
}

impl Error for ValidationError {}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Storage label, also used for display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "urgent" => Ok(Self::Urgent),
            _ => Err(ValidationError::InvalidPriority(value.to_string())),
        }
    }
}

impl Display for Priority {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Workflow label shared by tasks and areas.
///
/// Labels are mutually exclusive but no transition order is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Todo,
    Planning,
    Doing,
    Done,
}

impl Status {
    /// Storage label, also used for display.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::Planning => "planning",
            Self::Doing => "doing",
            Self::Done => "done",
        }
    }
}

impl FromStr for Status {
    type Err = ValidationError;

    /// Case-insensitive; `open` and `pending` are accepted as `todo`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "todo" | "open" | "pending" => Ok(Self::Todo),
            "planning" => Ok(Self::Planning),
            "doing" => Ok(Self::Doing),
            "done" => Ok(Self::Done),
            _ => Err(ValidationError::InvalidStatus(value.to_string())),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Trims a title and rejects blank values.
pub fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    Ok(trimmed.to_string())
}
