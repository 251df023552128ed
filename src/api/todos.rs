//! Todo CRUD and form endpoints.
//!
//! Mutation responses follow the fragment-respond policy: on success the
//! handler replies to the requesting connection with the same push
//! instruction the bridge broadcasts to everyone else, and on validation
//! failure it replies 422 with a replace instruction that re-renders the form
//! with inline errors. No redirect ever occurs; a validation failure is
//! terminal for the request and requires user correction.

use crate::bridge::update_for;
use crate::broadcast::StreamUpdate;
use crate::error::AppError;
use crate::extractors::TaskSubmission;
use crate::render;
use crate::server::state::AppState;
use crate::store::{TaskEvent, TaskStoreError};
use crate::types::TaskId;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Html,
};
use uuid::Uuid;

/// `GET /` and `GET /todos` — full list page, most-recently-created first.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let tasks = state.store.list().await?;
    Ok(Html(render::list_page(&tasks)))
}

/// `GET /todos/:id` — single-task page.
pub async fn show(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let task = state.store.find(TaskId::from_uuid(id)).await?;
    Ok(Html(render::task_page(&task)))
}

/// `GET /todos/new` — blank submission form.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn new_form() -> Html<String> {
    Html(render::form_page("New todo", "/todos", "POST", None))
}

/// `GET /todos/:id/edit` — prefilled submission form.
pub async fn edit_form(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Html<String>, AppError> {
    let task = state.store.find(TaskId::from_uuid(id)).await?;
    Ok(Html(render::form_page(
        "Edit todo",
        &format!("/todos/{id}"),
        "PATCH",
        Some(&task),
    )))
}

/// `POST /todos` — create. Accepts a form or JSON body.
///
/// 201 with a prepend instruction on success; 422 with a form-replace
/// instruction carrying inline errors on validation failure.
pub async fn create(
    State(state): State<AppState>,
    TaskSubmission(draft): TaskSubmission,
) -> Result<(StatusCode, Json<StreamUpdate>), AppError> {
    match state.store.create(draft).await {
        Ok(task) => Ok((
            StatusCode::CREATED,
            Json(update_for(&TaskEvent::Created(task))),
        )),
        Err(TaskStoreError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(form_replace("/todos", "POST", &errors)),
        )),
        Err(err) => Err(err.into()),
    }
}

/// `PUT|PATCH /todos/:id` — update. Accepts a form or JSON body.
///
/// 200 with a replace instruction addressed by id on success; 422 with a
/// form-replace instruction on validation failure.
pub async fn update(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    TaskSubmission(draft): TaskSubmission,
) -> Result<(StatusCode, Json<StreamUpdate>), AppError> {
    match state.store.update(TaskId::from_uuid(id), draft).await {
        Ok(task) => Ok((
            StatusCode::OK,
            Json(update_for(&TaskEvent::Updated(task))),
        )),
        Err(TaskStoreError::Validation(errors)) => Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(form_replace(&format!("/todos/{id}"), "PATCH", &errors)),
        )),
        Err(err) => Err(err.into()),
    }
}

/// `DELETE /todos/:id` — delete.
///
/// 200 with a remove instruction addressed by id.
pub async fn destroy(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<StreamUpdate>, AppError> {
    let id = TaskId::from_uuid(id);
    state.store.delete(id).await?;
    Ok(Json(update_for(&TaskEvent::Deleted(id))))
}

fn form_replace(action: &str, method: &str, errors: &[crate::types::FieldError]) -> StreamUpdate {
    StreamUpdate::Replace {
        target: render::FORM_TARGET.to_string(),
        html: render::task_form(action, method, None, errors),
    }
}
