//! Error type bridging the store taxonomy to HTTP responses.

use crate::render;
use crate::store::TaskStoreError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use std::fmt;

/// Application error for web handlers.
///
/// Wraps store errors and renders them as HTTP responses: a generic
/// not-found page for unknown ids, a generic message for persistence
/// failures. Validation failures are handled inside the mutation handlers
/// (they re-render the form) and never reach this type's response path with
/// field detail.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Underlying cause, logged on 5xx responses but never shown to the user.
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Creates a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String) -> Self {
        Self {
            status,
            message,
            source: None,
        }
    }

    /// Creates a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
        )
    }

    /// Creates a 500 Internal Server Error with a generic user-facing message.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message.into())
    }

    /// Attaches the underlying cause for logging.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status this error responds with.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.status, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|source| source.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            match &self.source {
                Some(source) => tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    error = ?source,
                    "request failed"
                ),
                None => tracing::error!(
                    status = %self.status,
                    message = %self.message,
                    "request failed"
                ),
            }
        }

        let body = if self.status.is_server_error() {
            // Generic message only; the detail went to the log.
            render::error_page(self.status.as_u16(), "Something went wrong")
        } else {
            render::error_page(self.status.as_u16(), &self.message)
        };

        (self.status, Html(body)).into_response()
    }
}

impl From<TaskStoreError> for AppError {
    fn from(err: TaskStoreError) -> Self {
        match err {
            TaskStoreError::NotFound(id) => Self::not_found("Task", id),
            TaskStoreError::Validation(errors) => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            TaskStoreError::Internal(source) => {
                Self::internal("storage error").with_source(source)
            }
        }
    }
}
