//! In-memory task store.
//!
//! Used by the test suite and as the development fallback when no
//! `DATABASE_URL` is configured. Commits are serialized by holding the write
//! lock across both the mutation and the post-commit emit, so subscribers see
//! events in exactly commit order.

use super::{EVENT_CHANNEL_CAPACITY, StoreResult, TaskEvent, TaskStore, TaskStoreError};
use crate::types::{Task, TaskDraft, TaskId, validate_title};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::RwLock;
use tokio::sync::broadcast;

/// Task store backed by process memory.
pub struct InMemoryTaskStore {
    /// Tasks in insertion order; `list` returns the reverse.
    tasks: RwLock<Vec<Task>>,
    events: broadcast::Sender<TaskEvent>,
}

impl InMemoryTaskStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            tasks: RwLock::new(Vec::new()),
            events,
        }
    }

    fn read_guard(&self) -> StoreResult<std::sync::RwLockReadGuard<'_, Vec<Task>>> {
        self.tasks
            .read()
            .map_err(|_| TaskStoreError::Internal(anyhow::anyhow!("task store lock poisoned")))
    }

    fn write_guard(&self) -> StoreResult<std::sync::RwLockWriteGuard<'_, Vec<Task>>> {
        self.tasks
            .write()
            .map_err(|_| TaskStoreError::Internal(anyhow::anyhow!("task store lock poisoned")))
    }

    fn emit(&self, event: TaskEvent) {
        // A zero-subscriber send is fine; delivery is best-effort by design.
        let _ = self.events.send(event);
    }
}

impl Default for InMemoryTaskStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn list(&self) -> StoreResult<Vec<Task>> {
        let tasks = self.read_guard()?;
        Ok(tasks.iter().rev().cloned().collect())
    }

    async fn find(&self, id: TaskId) -> StoreResult<Task> {
        let tasks = self.read_guard()?;
        tasks
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(TaskStoreError::NotFound(id))
    }

    async fn create(&self, draft: TaskDraft) -> StoreResult<Task> {
        let title = validate_title(draft.title.as_deref()).map_err(TaskStoreError::Validation)?;

        let task = Task::new(
            TaskId::new(),
            title,
            draft.description,
            draft.completed.unwrap_or(false),
            Utc::now(),
        );

        let mut tasks = self.write_guard()?;
        tasks.push(task.clone());
        // Emitted under the write lock so events match commit order.
        self.emit(TaskEvent::Created(task.clone()));
        drop(tasks);

        tracing::info!(task_id = %task.id, "task created");
        Ok(task)
    }

    async fn update(&self, id: TaskId, draft: TaskDraft) -> StoreResult<Task> {
        let mut tasks = self.write_guard()?;
        let slot = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(TaskStoreError::NotFound(id))?;

        let title = match draft.title.as_deref() {
            Some(t) => validate_title(Some(t)).map_err(TaskStoreError::Validation)?,
            None => slot.title.clone(),
        };

        slot.title = title;
        if let Some(description) = draft.description {
            slot.description = Some(description);
        }
        if let Some(completed) = draft.completed {
            slot.completed = completed;
        }
        slot.updated_at = Utc::now();

        let task = slot.clone();
        self.emit(TaskEvent::Updated(task.clone()));
        drop(tasks);

        tracing::info!(task_id = %task.id, completed = task.completed, "task updated");
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        let mut tasks = self.write_guard()?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        if tasks.len() == before {
            return Err(TaskStoreError::NotFound(id));
        }
        self.emit(TaskEvent::Deleted(id));
        drop(tasks);

        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }
}
