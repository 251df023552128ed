//! Livetodo - a todo list with live updates pushed to every open session.
//!
//! A thin handler layer over a single-table task store, with view-fragment
//! broadcast on every committed mutation.
//!
//! # Architecture
//!
//! ```text
//!  Browser A ──POST /todos──► Handler ──create──► Task Store
//!                                │                    │ post-commit event
//!                                │ fragment           ▼
//!                                │ instruction   Broadcast Bridge
//!                                ▼                    │ rendered fragment
//!  Browser A ◄───201 Prepend────┘                     ▼
//!                                              "todos" channel
//!                                                     │
//!                               ┌─────────────────────┤
//!                               ▼                     ▼
//!                      Browser B (WebSocket)  Browser C (WebSocket)
//! ```
//!
//! The store is the single serialization point for commits and emits a
//! [`store::TaskEvent`] for each one, in commit order. The bridge renders the
//! affected task as a fragment and publishes a prepend/replace/remove
//! instruction to the shared channel; every session subscribed via
//! `GET /todos/stream` applies it in place. The mutating request gets the
//! same instruction as its response body (fragment-respond policy) and never
//! waits on subscriber delivery.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod bridge;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod extractors;
pub mod render;
pub mod server;
pub mod store;
pub mod types;

pub use broadcast::{ChannelBroadcaster, StreamUpdate, TASKS_CHANNEL};
pub use config::Config;
pub use error::AppError;
pub use server::{AppState, build_router};
pub use store::{InMemoryTaskStore, PostgresTaskStore, TaskEvent, TaskStore, TaskStoreError};
pub use types::{FieldError, Task, TaskDraft, TaskId};
