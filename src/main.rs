use anyhow::Result;
use request_duration::{create_meter, create_router_with, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();

    // Load all configuration from environment
    let config = AppConfig::from_env()?;
    let meter = create_meter(&config.metrics)?;

    // Refuses to start if the histogram cannot be created.
    let app = create_router_with(&config, meter)?;

    info!("Starting at endpoint:{}", config.server.bind_addr);
    info!(
        "Starting Request Duration demo server v{} (metrics backend: {:?})...",
        env!("CARGO_PKG_VERSION"),
        config.metrics.backend
    );

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
    }
}
