//! Liveness probe.
//!
//! Used by load balancers and uptime monitors to verify the process is live.

use axum::{Json, http::StatusCode};
use serde::Serialize;

/// Liveness response body.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service version.
    pub version: String,
}

/// `GET /up` — returns 200 when the process is healthy.
///
/// Deliberately has zero dependency on the task store: a broken database
/// must not make the probe report the process as dead.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
