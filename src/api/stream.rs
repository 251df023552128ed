//! WebSocket subscription endpoint for live list updates.
//!
//! `GET /todos/stream` upgrades the connection and subscribes it to the
//! shared todos channel. Every push instruction published to the channel is
//! forwarded to the client as one JSON text message. The client side of the
//! socket is read only for liveness: pings and close frames are honored,
//! anything else is ignored.

use crate::broadcast::{ChannelBroadcaster, TASKS_CHANNEL};
use crate::server::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// `GET /todos/stream` — upgrade and subscribe to the todos channel.
#[allow(clippy::unused_async)] // Axum handler signature requires async
pub async fn subscribe(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    info!("list stream connection requested");
    ws.on_upgrade(move |socket| stream_updates(socket, state.broadcaster))
}

/// Forwards channel instructions to one client until either side hangs up.
async fn stream_updates(socket: WebSocket, broadcaster: ChannelBroadcaster) {
    let mut updates = broadcaster.subscribe(TASKS_CHANNEL).await;
    let (mut sender, mut receiver) = socket.split();

    info!("list stream connection established");

    loop {
        tokio::select! {
            update = updates.recv() => match update {
                Ok(update) => {
                    let Ok(json) = serde_json::to_string(&update) else {
                        continue;
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        // Client disconnected; nothing to roll back.
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    // Best-effort delivery: the skipped events are gone.
                    warn!(skipped, "list stream client lagging, skipped updates");
                }
                Err(RecvError::Closed) => break,
            },
            message = receiver.next() => match message {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    debug!("list stream keep-alive");
                }
                Some(Ok(_)) => {
                    debug!("ignoring client message on list stream");
                }
            },
        }
    }

    info!("list stream connection closed");
}
