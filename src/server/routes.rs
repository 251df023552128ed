//! Router configuration.
//!
//! Builds the complete Axum router with all endpoints.

use super::health::health_check;
use super::jobs;
use super::state::AppState;
use crate::api::{stream, todos};
use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

/// Builds the complete Axum router.
///
/// Routes:
/// - `GET /` and `GET /todos` — list page, most-recent-first
/// - `GET /todos/new`, `GET /todos/:id/edit` — submission forms
/// - `GET /todos/:id` — single-task page
/// - `POST /todos`, `PUT|PATCH /todos/:id`, `DELETE /todos/:id` — mutations
/// - `GET /todos/stream` — WebSocket push channel
/// - `GET /up` — liveness probe (no store dependency)
/// - `/jobs` — opaque admin jobs mount
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(todos::index))
        .route("/todos", get(todos::index).post(todos::create))
        .route("/todos/new", get(todos::new_form))
        .route("/todos/stream", get(stream::subscribe))
        .route(
            "/todos/:id",
            get(todos::show)
                .put(todos::update)
                .patch(todos::update)
                .delete(todos::destroy),
        )
        .route("/todos/:id/edit", get(todos::edit_form))
        .route("/up", get(health_check))
        .nest("/jobs", jobs::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
