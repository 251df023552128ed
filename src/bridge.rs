//! Mutation-to-broadcast bridge.
//!
//! Consumes the store's post-commit events and pushes the corresponding
//! rendered fragment instruction to every subscriber of [`TASKS_CHANNEL`]:
//! a created task becomes a prepend, an update a replace addressed by id, a
//! delete a remove with no body. Per-record ordering follows commit order
//! because the store emits under its commit serialization and broadcast
//! channels preserve send order.
//!
//! The push is fire-and-forget relative to the request that triggered the
//! mutation: a subscriber that lags or disconnects is logged and skipped,
//! and never fails or rolls back the already-committed write.

use crate::broadcast::{ChannelBroadcaster, StreamUpdate, TASKS_CHANNEL};
use crate::render;
use crate::store::{TaskEvent, TaskStore};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Builds the push instruction for one committed mutation.
///
/// Shared between the bridge and the request handlers so the mutating client
/// receives exactly the instruction every subscriber receives.
#[must_use]
pub fn update_for(event: &TaskEvent) -> StreamUpdate {
    match event {
        TaskEvent::Created(task) => StreamUpdate::Prepend {
            target: render::LIST_TARGET.to_string(),
            html: render::task_item(task),
        },
        TaskEvent::Updated(task) => StreamUpdate::Replace {
            target: render::item_target(task.id),
            html: render::task_item(task),
        },
        TaskEvent::Deleted(id) => StreamUpdate::Remove {
            target: render::item_target(*id),
        },
    }
}

/// Spawns the bridge task.
///
/// Runs until the store's event channel closes, i.e. for the lifetime of the
/// store.
pub fn spawn(store: &Arc<dyn TaskStore>, broadcaster: ChannelBroadcaster) -> JoinHandle<()> {
    let mut events = store.subscribe();

    tokio::spawn(async move {
        info!("broadcast bridge started");
        loop {
            match events.recv().await {
                Ok(event) => {
                    let update = update_for(&event);
                    debug!(?update, "broadcasting committed mutation");
                    broadcaster.publish(TASKS_CHANNEL, update).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "bridge lagged behind store commits");
                }
                Err(RecvError::Closed) => break,
            }
        }
        info!("broadcast bridge stopped");
    })
}
