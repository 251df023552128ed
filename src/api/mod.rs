//! HTTP API handlers.

pub mod stream;
pub mod todos;
