// moniker-server: HTTP surface over the moniker resolution engine.
//
// Startup loads the catalog once (fatal on failure), spawns the hot
// reloader, and serves until SIGINT/SIGTERM with a bounded drain.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use moniker_core::catalog::load_catalog;
use moniker_core::Registry;
use moniker_server::{reload, routes, AppState, ServerConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("moniker_server=info,moniker_core=info,tower_http=info")
        }))
        .init();

    info!(catalog = %config.catalog.display(), "loading catalog");
    let nodes = load_catalog(&config.catalog).context("initial catalog load failed")?;
    let registry = Arc::new(Registry::from_nodes(nodes).context("catalog rejected by registry")?);
    info!(nodes = registry.len(), "catalog loaded");

    let state = AppState::new(
        registry,
        config.catalog.clone(),
        Duration::from_secs(config.cache_ttl_seconds),
    );

    if config.reload_interval_seconds > 0 {
        reload::spawn_reloader(state.clone(), config.reload_interval_seconds);
        info!(
            interval_seconds = config.reload_interval_seconds,
            "hot reloader started"
        );
    }

    let app = routes::router(state);
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "serving");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutdown signal received, draining connections");
    // Failsafe: if the drain outlasts the deadline, exit cleanly anyway.
    tokio::spawn(async {
        tokio::time::sleep(DRAIN_TIMEOUT).await;
        warn!("drain deadline exceeded, exiting");
        std::process::exit(0);
    });
}
