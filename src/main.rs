// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use anyhow::Context;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::EnvFilter;

use crate::application::session_store::SessionStorage;
use crate::infrastructure::config::{load_console_config, StorageKind};
use crate::infrastructure::file_session_store::FileSessionStorage;
use crate::infrastructure::memory_session_store::MemorySessionStorage;
use crate::presentation::app_state::AppState;
use crate::presentation::router::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration
    let config = load_console_config()?;

    // Create session storage (infrastructure layer)
    let storage: Arc<dyn SessionStorage> = match config.session.storage {
        StorageKind::File => {
            let file = FileSessionStorage::new(&config.session.path);
            tracing::info!("Persisting session to {}", file.path().display());
            Arc::new(file)
        }
        StorageKind::Memory => Arc::new(MemorySessionStorage::new()),
    };

    // Create services (application layer)
    let state = Arc::new(AppState::from_config(&config, storage));
    state.session.restore().await;
    let _ticker = state.monitoring.spawn_ticker();

    // Build router (presentation layer)
    let app = router(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!("Starting gpucloud-console on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
