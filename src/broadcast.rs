//! Named-channel fan-out for push instructions.
//!
//! Every connected viewer subscribes to a channel by name and receives the
//! [`StreamUpdate`] instructions published to it. The todo list uses a single
//! shared channel, [`TASKS_CHANNEL`]; the name is always passed explicitly
//! into [`ChannelBroadcaster::publish`], never derived from a record type.
//!
//! Delivery is best-effort and at-most-once per connected client per event:
//! a publish with no subscribers is a no-op, a lagging subscriber loses the
//! skipped events, and a client that was disconnected at emit time gets no
//! replay.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

/// Shared channel carrying todo-list instructions.
pub const TASKS_CHANNEL: &str = "todos";

/// Per-channel buffer before a slow subscriber starts losing events.
const CHANNEL_CAPACITY: usize = 256;

/// One push instruction, addressed by DOM id.
///
/// Serialized as JSON text on the wire, e.g.
/// `{"action":"replace","target":"todo_<id>","html":"<li ...>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StreamUpdate {
    /// Insert the fragment at the top of the container identified by `target`.
    Prepend {
        /// DOM id of the list container.
        target: String,
        /// Rendered fragment to insert.
        html: String,
    },
    /// Replace the element identified by `target` with the fragment.
    Replace {
        /// DOM id of the element to replace.
        target: String,
        /// Rendered replacement fragment.
        html: String,
    },
    /// Remove the element identified by `target`. No body needed.
    Remove {
        /// DOM id of the element to remove.
        target: String,
    },
}

/// Map of channel name to broadcast sender.
type ChannelsMap = Arc<RwLock<HashMap<String, broadcast::Sender<StreamUpdate>>>>;

/// Broadcaster fanning push instructions out to channel subscribers.
///
/// Channels are created lazily on first publish or subscribe. Cloning is
/// cheap and shares the underlying channel map.
pub struct ChannelBroadcaster {
    channels: ChannelsMap,
}

impl ChannelBroadcaster {
    /// Creates a broadcaster with no channels yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Publishes an instruction to every subscriber of the named channel.
    ///
    /// Fire-and-forget: returns as soon as the instruction is queued, without
    /// waiting for any subscriber to receive it.
    pub async fn publish(&self, channel: &str, update: StreamUpdate) {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);

        // A send with zero receivers is not an error here.
        let _ = sender.send(update);
    }

    /// Subscribes to the named channel.
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<StreamUpdate> {
        let mut channels = self.channels.write().await;
        let sender = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0);

        sender.subscribe()
    }

    /// Number of live subscribers on the named channel.
    pub async fn subscriber_count(&self, channel: &str) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, broadcast::Sender::receiver_count)
    }
}

impl Default for ChannelBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for ChannelBroadcaster {
    fn clone(&self) -> Self {
        Self {
            channels: Arc::clone(&self.channels),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code
mod tests {
    use super::*;

    fn remove(target: &str) -> StreamUpdate {
        StreamUpdate::Remove {
            target: target.to_string(),
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_subscriber() {
        let broadcaster = ChannelBroadcaster::new();
        let mut rx1 = broadcaster.subscribe(TASKS_CHANNEL).await;
        let mut rx2 = broadcaster.subscribe(TASKS_CHANNEL).await;

        broadcaster.publish(TASKS_CHANNEL, remove("todo_5")).await;

        assert_eq!(rx1.recv().await.unwrap(), remove("todo_5"));
        assert_eq!(rx2.recv().await.unwrap(), remove("todo_5"));
    }

    #[tokio::test]
    async fn channels_are_isolated() {
        let broadcaster = ChannelBroadcaster::new();
        let mut todos = broadcaster.subscribe(TASKS_CHANNEL).await;
        let mut other = broadcaster.subscribe("other").await;

        broadcaster.publish(TASKS_CHANNEL, remove("todo_1")).await;

        assert!(todos.recv().await.is_ok());
        assert!(other.try_recv().is_err());
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_a_noop() {
        let broadcaster = ChannelBroadcaster::new();
        broadcaster.publish(TASKS_CHANNEL, remove("todo_1")).await;
        assert_eq!(broadcaster.subscriber_count(TASKS_CHANNEL).await, 0);
    }

    #[test]
    fn updates_serialize_with_action_tag() {
        let json = serde_json::to_string(&remove("todo_5")).unwrap();
        assert_eq!(json, r#"{"action":"remove","target":"todo_5"}"#);
    }
}
