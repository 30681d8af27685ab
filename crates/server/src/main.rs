use std::sync::Arc;

use anyhow::Context;
use plagcheck_server::api::{AppState, create_router};
use plagcheck_server::config::ServerConfig;
use plagcheck_server::db;
use submission_archive::SubmissionStore;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing()?;

    info!("starting plagcheck server");
    let config = ServerConfig::load().context("failed to load server config")?;

    let db = db::init_pool_and_migrate(&config.database_url)
        .await
        .context("failed to initialize database")?;

    info!(
        upload_root = %config.upload_root.display(),
        max_entries = config.limits.max_entries,
        max_entry_bytes = config.limits.max_entry_bytes,
        max_total_bytes = config.limits.max_total_bytes,
        "submission store configured"
    );
    let submissions = SubmissionStore::new(config.upload_root.clone(), config.limits);
    let state = Arc::new(AppState::new(db, submissions));

    let app = create_router(state, config.max_upload_bytes).layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    info!(address = %config.bind_address, "server is ready, press Ctrl+C to shut down");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received, stopping server");
}

fn init_tracing() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}
