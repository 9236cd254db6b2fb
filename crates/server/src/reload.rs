// Catalog hot reload: a background task on a fixed interval plus the
// synchronous path used by the on-demand endpoint. A failed reload keeps
// the previous snapshot serving.

use std::time::Duration;

use moniker_core::catalog::{load_catalog, LoadError, RegistryError};
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::state::AppState;

#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Re-read the catalog file and swap the snapshot. On success the resolve
/// cache is cleared so no stale result outlives the old tree. Returns the
/// node count of the new snapshot.
pub fn reload_now(state: &AppState) -> Result<usize, ReloadError> {
    let nodes = load_catalog(&state.catalog_path)?;
    let count = state.registry.atomic_replace(nodes)?;
    state.resolve_cache.clear();
    Ok(count)
}

/// Spawn the periodic reloader. The first tick fires one full interval
/// after startup; the initial load already happened in main.
pub fn spawn_reloader(state: AppState, interval_seconds: u64) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_seconds));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            match reload_now(&state) {
                Ok(count) => info!(nodes = count, "catalog reloaded"),
                Err(err) => error!(error = %err, "catalog reload failed, keeping previous snapshot"),
            }
        }
    })
}
