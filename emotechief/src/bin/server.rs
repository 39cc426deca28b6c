//! Headless API server binary.
//!
//! Starts the axum web server and waits for Ctrl+C.

use tracing_subscriber::EnvFilter;

use emotechief_lib::app::SharedState;
use emotechief_lib::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting EmoteChief");

    let (db, config) = emotechief_lib::init_foundation()?;
    let state = SharedState::new(db, config);

    let port = state.server_port();
    let server_handle = tokio::spawn(async move {
        if let Err(e) = server::start_server(state).await {
            tracing::error!("Server failed: {e}");
        }
    });

    tracing::info!(port, "Server running. Press Ctrl+C to stop.");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down...");

    // graceful shutdown is driven by the same signal inside start_server
    if let Err(e) = server_handle.await {
        tracing::warn!("Server task ended abnormally: {e}");
    }
    Ok(())
}
