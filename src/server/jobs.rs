//! Admin jobs mount point.
//!
//! The job-inspection dashboard is an external sub-application consumed only
//! as a mount point at `/jobs`; it has no interaction with task data. Until
//! the real dashboard is wired in, the mount serves a placeholder page so the
//! path is reserved and routable.

use crate::server::state::AppState;
use axum::{Router, response::Html, routing::get};

/// Builds the router mounted at `/jobs`.
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(index))
}

#[allow(clippy::unused_async)] // Axum handler signature requires async
async fn index() -> Html<&'static str> {
    Html(
        "<!DOCTYPE html><html><head><title>Jobs</title></head>\
         <body><h1>Background jobs</h1>\
         <p>The job dashboard runs as a separate sub-application.</p>\
         </body></html>",
    )
}
