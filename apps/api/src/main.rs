//! # Stockroom API
//!
//! HTTP/JSON server for inventory and point-of-sale.
//!
//! ## Startup
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  .env (dotenvy) → ApiConfig::load() → tracing subscriber               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::connect_with_retry ── fail ──► backoff ──► retry (bounded)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  TcpListener::bind(http.host:http.port)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  axum::serve(router) ── Ctrl+C / SIGTERM ──► graceful shutdown          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::Context;
use stockroom_api::config::ApiConfig;
use stockroom_api::{router, AppState};
use stockroom_db::Database;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is normal outside development.
    let dotenv = dotenvy::dotenv();

    let config = ApiConfig::load().context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("parsing log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = dotenv {
        if !e.not_found() {
            warn!(error = %e, "Failed to read .env file");
        }
    }

    info!(
        address = %config.bind_address(),
        database = %config.database.path,
        "Starting Stockroom API"
    );

    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let db = Database::connect_with_retry(config.db_config(), &config.retry_policy())
        .await
        .context("connecting to database")?;

    let listener = TcpListener::bind(config.bind_address())
        .await
        .with_context(|| format!("binding {}", config.bind_address()))?;
    info!(address = %config.bind_address(), "Listening");

    axum::serve(listener, router(AppState::new(db.clone())))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
