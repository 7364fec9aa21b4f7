//! isupipe-api - livestream backend HTTP server
//!
//! Startup order: tracing, configuration, database, tag cache, router.
//! The tag cache must load before the listener opens so that no request
//! observes an empty cache.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use isupipe_common::config::{load_toml_config, ServerConfig};
use isupipe_common::db::init_database;
use isupipe_common::TagCache;
use isupipe_api::{build_router, AppState};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for isupipe-api
#[derive(Parser, Debug)]
#[command(name = "isupipe-api")]
#[command(about = "Livestream backend HTTP API")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "ISUPIPE_PORT")]
    port: Option<u16>,

    /// SQLite database file (overrides ISUPIPE_DATABASE and config file)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// TOML config file
    #[arg(short, long, env = "ISUPIPE_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "isupipe_api=info,isupipe_common=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting isupipe-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let toml = load_toml_config(args.config.as_deref()).context("Failed to load config file")?;
    let config = ServerConfig::resolve(args.port, args.database.as_deref(), &toml);
    info!("Database path: {}", config.database_path.display());

    let pool = match init_database(&config.database_path, config.max_connections).await {
        Ok(pool) => pool,
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let tags = Arc::new(TagCache::new());
    if let Err(e) = tags.initialize(&pool).await {
        error!("Failed to load tag cache: {}", e);
        return Err(e.into());
    }

    let state = AppState::with_session_cookie(pool, tags, &config.session_cookie);
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("isupipe-api listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
