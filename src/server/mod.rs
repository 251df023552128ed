//! HTTP server module.
//!
//! Application state, the router, the liveness probe, and the opaque admin
//! jobs mount.

pub mod health;
pub mod jobs;
pub mod routes;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
