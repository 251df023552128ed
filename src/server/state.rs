//! Application state shared across HTTP handlers.

use crate::broadcast::ChannelBroadcaster;
use crate::store::TaskStore;
use std::sync::Arc;

/// Shared resources for every request: the task store and the broadcaster.
///
/// Cloned (cheaply, via `Arc`) for each request.
#[derive(Clone)]
pub struct AppState {
    /// Task persistence. The store owns identity, timestamps, validation,
    /// and the post-commit event stream the bridge consumes.
    pub store: Arc<dyn TaskStore>,
    /// Fan-out for push instructions to connected sessions.
    pub broadcaster: ChannelBroadcaster,
}

impl AppState {
    /// Creates a new application state.
    #[must_use]
    pub fn new(store: Arc<dyn TaskStore>, broadcaster: ChannelBroadcaster) -> Self {
        Self { store, broadcaster }
    }
}
