//! `PostgreSQL`-backed task store.
//!
//! One table, one row per task. Queries are runtime-checked (`sqlx::query` /
//! `query_as`) so the crate builds without a live database. Commits are
//! serialized by a store-level mutex held across both the write and the
//! post-commit emit, which keeps the event stream in commit order; a losing
//! concurrent writer's changes are silently overwritten.

use super::{EVENT_CHANNEL_CAPACITY, StoreResult, TaskEvent, TaskStore, TaskStoreError};
use crate::types::{Task, TaskDraft, TaskId, validate_title};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

/// Row shape of the `tasks` table.
type TaskRow = (
    Uuid,
    String,
    Option<String>,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn task_from_row(row: TaskRow) -> Task {
    let (id, title, description, completed, created_at, updated_at) = row;
    Task {
        id: TaskId::from_uuid(id),
        title,
        description,
        completed,
        created_at,
        updated_at,
    }
}

fn storage_error(context: &'static str, err: sqlx::Error) -> TaskStoreError {
    TaskStoreError::Internal(anyhow::Error::new(err).context(context))
}

/// Task store backed by a `tasks` table in `PostgreSQL`.
pub struct PostgresTaskStore {
    pool: PgPool,
    /// Serializes commits so emitted events match commit order.
    commit_lock: Mutex<()>,
    events: broadcast::Sender<TaskEvent>,
}

impl PostgresTaskStore {
    /// Connects to the database and ensures the `tasks` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Internal`] when the connection or the schema
    /// statement fails.
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(url)
            .await
            .map_err(|e| storage_error("failed to connect to database", e))?;

        let store = Self::with_pool(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Wraps an existing connection pool.
    #[must_use]
    pub fn with_pool(pool: PgPool) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            pool,
            commit_lock: Mutex::new(()),
            events,
        }
    }

    /// Creates the `tasks` table when it does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`TaskStoreError::Internal`] when the statement fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                 id UUID PRIMARY KEY,
                 title TEXT NOT NULL,
                 description TEXT,
                 completed BOOLEAN NOT NULL DEFAULT FALSE,
                 created_at TIMESTAMPTZ NOT NULL,
                 updated_at TIMESTAMPTZ NOT NULL
             )",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("failed to create tasks table", e))?;

        Ok(())
    }

    fn emit(&self, event: TaskEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn list(&self) -> StoreResult<Vec<Task>> {
        // The id tiebreaker keeps same-timestamp rows in a stable order.
        let rows: Vec<TaskRow> = sqlx::query_as(
            "SELECT id, title, description, completed, created_at, updated_at
             FROM tasks ORDER BY created_at DESC, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("failed to list tasks", e))?;

        Ok(rows.into_iter().map(task_from_row).collect())
    }

    async fn find(&self, id: TaskId) -> StoreResult<Task> {
        let row: Option<TaskRow> = sqlx::query_as(
            "SELECT id, title, description, completed, created_at, updated_at
             FROM tasks WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("failed to load task", e))?;

        row.map(task_from_row).ok_or(TaskStoreError::NotFound(id))
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

        let guard = self.commit_lock.lock().await;
        sqlx::query(
            "INSERT INTO tasks (id, title, description, completed, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(task.id.as_uuid())
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(task.created_at)
        .bind(task.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("failed to insert task", e))?;
        self.emit(TaskEvent::Created(task.clone()));
        drop(guard);

        tracing::info!(task_id = %task.id, "task created");
        Ok(task)
    }

    async fn update(&self, id: TaskId, draft: TaskDraft) -> StoreResult<Task> {
        let guard = self.commit_lock.lock().await;
        let existing = self.find(id).await?;

        let title = match draft.title.as_deref() {
            Some(t) => validate_title(Some(t)).map_err(TaskStoreError::Validation)?,
            None => existing.title,
        };
        let description = draft.description.or(existing.description);
        let completed = draft.completed.unwrap_or(existing.completed);
        let updated_at = Utc::now();

        let row: Option<TaskRow> = sqlx::query_as(
            "UPDATE tasks
             SET title = $2, description = $3, completed = $4, updated_at = $5
             WHERE id = $1
             RETURNING id, title, description, completed, created_at, updated_at",
        )
        .bind(id.as_uuid())
        .bind(&title)
        .bind(&description)
        .bind(completed)
        .bind(updated_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| storage_error("failed to update task", e))?;

        let task = row.map(task_from_row).ok_or(TaskStoreError::NotFound(id))?;
        self.emit(TaskEvent::Updated(task.clone()));
        drop(guard);

        tracing::info!(task_id = %task.id, completed = task.completed, "task updated");
        Ok(task)
    }

    async fn delete(&self, id: TaskId) -> StoreResult<()> {
        let guard = self.commit_lock.lock().await;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("failed to delete task", e))?;

        if result.rows_affected() == 0 {
            return Err(TaskStoreError::NotFound(id));
        }
        self.emit(TaskEvent::Deleted(id));
        drop(guard);

        tracing::info!(task_id = %id, "task deleted");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }
}
