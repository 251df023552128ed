//! Task persistence.
//!
//! The store owns record identity, timestamps, and validation, and it is the
//! single serialization point for commits: every successful create/update/
//! delete emits a [`TaskEvent`] on an in-process broadcast channel, in the
//! same order the mutations committed. The mutation-to-broadcast bridge
//! consumes that channel; nothing else in the system observes commits.
//!
//! Two implementations are provided:
//!
//! - [`InMemoryTaskStore`] for tests and for development without a database
//! - [`PostgresTaskStore`] backed by a single `tasks` table

mod memory;
mod postgres;

pub use memory::InMemoryTaskStore;
pub use postgres::PostgresTaskStore;

use crate::types::{FieldError, Task, TaskDraft, TaskId};
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Capacity of the post-commit event channel.
///
/// A consumer that falls further behind than this sees a lagged receive and
/// loses events; there is deliberately no replay.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Errors surfaced by a task store.
#[derive(Debug, thiserror::Error)]
pub enum TaskStoreError {
    /// No task has the given id.
    #[error("task {0} not found")]
    NotFound(TaskId),

    /// The submitted fields failed validation; nothing was persisted.
    #[error("validation failed: {}", format_errors(.0))]
    Validation(Vec<FieldError>),

    /// Persistence or connectivity failure.
    ///
    /// Carries the underlying cause for logging; the user only ever sees a
    /// generic message.
    #[error("storage error: {0}")]
    Internal(anyhow::Error),
}

fn format_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, TaskStoreError>;

/// A successful-commit event, emitted by the store after the write is durable.
#[derive(Clone, Debug)]
pub enum TaskEvent {
    /// A task was created.
    Created(Task),
    /// A task was updated.
    Updated(Task),
    /// A task was deleted.
    Deleted(TaskId),
}

/// Persistent table of tasks.
///
/// All operations are atomic with respect to their own record; concurrent
/// updates to the same id are serialized by the implementation and resolve to
/// last-committed-write-wins. No optimistic-concurrency token is tracked.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Returns all tasks, most-recently-created first.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Internal`] on persistence failure.
    async fn list(&self) -> StoreResult<Vec<Task>>;

    /// Returns the task with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] if no task has that id.
    async fn find(&self, id: TaskId) -> StoreResult<Task>;

    /// Validates and persists a new task.
    ///
    /// `completed` defaults to `false` when unset. On success the store
    /// assigns id and timestamps and emits [`TaskEvent::Created`].
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Validation`] when the title is absent or
    /// blank; nothing is persisted in that case.
    async fn create(&self, draft: TaskDraft) -> StoreResult<Task>;

    /// Merges the provided fields into an existing task and re-validates.
    ///
    /// Absent draft fields are left unchanged. On success `updated_at` is
    /// refreshed and [`TaskEvent::Updated`] is emitted.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] or [`TaskStoreError::Validation`].
    async fn update(&self, id: TaskId, draft: TaskDraft) -> StoreResult<Task>;

    /// Permanently removes a task. No soft-delete, no children to cascade.
    ///
    /// Emits [`TaskEvent::Deleted`] on success.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::NotFound`] if the task is absent.
    async fn delete(&self, id: TaskId) -> StoreResult<()>;

    /// Subscribes to post-commit events.
    ///
    /// Events arrive in commit order. Delivery is best-effort: a receiver
    /// that lags past the channel capacity loses events permanently.
    fn subscribe(&self) -> broadcast::Receiver<TaskEvent>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_fields() {
        let err = TaskStoreError::Validation(vec![FieldError::new("title", "can't be blank")]);
        assert_eq!(err.to_string(), "validation failed: title can't be blank");
    }

    #[test]
    fn not_found_names_the_id() {
        let id = TaskId::new();
        let err = TaskStoreError::NotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
