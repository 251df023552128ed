//! Livetodo HTTP server.
//!
//! Wires the task store, the broadcast bridge, and the Axum router together
//! and serves until interrupted.

use livetodo::{
    AppState, ChannelBroadcaster, Config, InMemoryTaskStore, PostgresTaskStore, TaskStore, bridge,
    build_router,
};
use std::sync::Arc;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env before reading configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.server.log_filter.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting livetodo server");

    // Pick the store: Postgres when configured, in-memory otherwise
    let store: Arc<dyn TaskStore> = match &config.database.url {
        Some(url) => {
            info!("Connecting to database...");
            let store = PostgresTaskStore::connect(url).await?;
            info!("Database connected, schema ensured");
            Arc::new(store)
        }
        None => {
            info!("No DATABASE_URL set, using in-memory store");
            Arc::new(InMemoryTaskStore::new())
        }
    };

    // Start the mutation-to-broadcast bridge
    let broadcaster = ChannelBroadcaster::new();
    let bridge_handle = bridge::spawn(&store, broadcaster.clone());

    // Build router and serve
    let state = AppState::new(store, broadcaster);
    let app = build_router(state);

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(address = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    bridge_handle.abort();
    info!("Server stopped");
    Ok(())
}

/// Graceful shutdown signal handler.
///
/// Waits for Ctrl+C (SIGINT) or SIGTERM (in production environments).
#[allow(clippy::expect_used)] // A process that cannot install signal handlers cannot run
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully...");
        },
        () = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully...");
        },
    }
}
