//! slot-swapper server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use slot_swapper::api;
use slot_swapper::app_state::AppState;
use slot_swapper::config::AppConfig;
use slot_swapper::persistence::{MemoryStore, PostgresStore, SwapStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = AppConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting slot-swapper");

    // Build persistence layer
    let store: Arc<dyn SwapStore> = if config.persistence_enabled {
        let store = PostgresStore::connect(&config).await?;
        store.migrate().await?;
        tracing::info!("connected to postgres, migrations applied");
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled, using in-memory store");
        Arc::new(MemoryStore::new())
    };

    // Build application
    let app_state = AppState::new(store, &config);
    let app = api::build_app(app_state, config.request_timeout());

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
