//! marquee server entry point.
//!
//! Boots the movie search HTTP API: loads configuration, opens the SQLite
//! cache, and serves until Ctrl+C or SIGTERM. Logs are JSON on stderr.

use std::sync::Arc;

use anyhow::{Context, Result};
use marquee_client::TmdbClient;
use marquee_core::{AppConfig, CacheDb, CacheService};
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod error;
mod handler;
mod routes;
#[cfg(test)]
mod testing;

use handler::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marquee=info,tower_http=info")),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    tracing::info!(
        cache_table = %config.cache_table_name,
        requests_table = %config.requests_table_name,
        db_path = %config.db_path.display(),
        "configuration loaded"
    );

    let db = CacheDb::open(&config.db_path, config.tables()?)
        .await
        .with_context(|| format!("failed to open cache database at {}", config.db_path.display()))?;
    let cache = CacheService::from_config(db.clone(), &config);
    tracing::info!(freshness_secs = cache.window().num_seconds(), "cache ready");
    let catalog = TmdbClient::from_app_config(&config).context("failed to build TMDB client")?;

    let app = create_router(AppState::new(cache, Arc::new(catalog)));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "marquee listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Err(e) = db.close().await {
        tracing::warn!(error = %e, "failed to close cache database");
    }
    tracing::info!("shutdown complete");

    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM.
///
/// If a handler cannot be installed, that signal is ignored and the other
/// one still works.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
