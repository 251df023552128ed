//! Domain types for the todo list.
//!
//! A task is the sole entity in the system: a title, an optional free-form
//! description, a completion flag, and store-assigned identity and timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Creates a new random `TaskId`.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a `TaskId` from a UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Returns the inner UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single task.
///
/// Identity and both timestamps belong to the store; everything outside the
/// store only ever holds transient copies for rendering.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier, assigned at creation and never changed.
    pub id: TaskId,
    /// Title of the task. Never blank in a persisted record.
    pub title: String,
    /// Optional free-form description.
    pub description: Option<String>,
    /// Whether the task is completed.
    pub completed: bool,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was last written.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new task with store-assigned identity and timestamps.
    ///
    /// Callers are expected to have validated the draft first; this is the
    /// constructor the store uses after validation passed.
    #[must_use]
    pub const fn new(
        id: TaskId,
        title: String,
        description: Option<String>,
        completed: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            completed,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field set accepted from form or JSON submissions.
///
/// Absent fields mean "use the default" at creation time (`completed` defaults
/// to `false`) and "leave unchanged" at update time.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct TaskDraft {
    /// Title of the task. Required at creation.
    pub title: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Completion flag.
    pub completed: Option<bool>,
}

/// A single field-level validation message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Name of the offending field.
    pub field: String,
    /// Human-readable message, rendered inline in the form.
    pub message: String,
}

impl FieldError {
    /// Creates a new field error.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.field, self.message)
    }
}

/// Validates a title against the single domain constraint: not blank.
///
/// # Errors
///
/// Returns the field-level messages when the title is absent or blank after
/// trimming.
pub fn validate_title(title: Option<&str>) -> Result<String, Vec<FieldError>> {
    match title {
        Some(t) if !t.trim().is_empty() => Ok(t.to_string()),
        _ => Err(vec![FieldError::new("title", "can't be blank")]),
    }
}
