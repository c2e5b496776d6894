// Learning Notes API - main entry point

use anyhow::Context;
use tracing::info;

use notes_server::{router, AppState, Config, DocumentStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting Learning Notes API v{}", notes_server::VERSION);

    let config = Config::load().context("Failed to load configuration")?;
    let addr = config.socket_addr()?;

    // Store failures leave the handle unavailable instead of stopping startup
    let store = DocumentStore::connect(&config);
    let app = router(AppState::new(store));

    info!("Server listening on {}", addr);

    axum::Server::try_bind(&addr)
        .with_context(|| format!("Failed to bind {}", addr))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
