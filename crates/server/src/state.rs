// Shared application state handed to every route handler.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use moniker_core::telemetry::{LogSink, TelemetrySink};
use moniker_core::{MonikerService, Registry, ResolveResult, TtlCache};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<Registry>,
    pub service: Arc<MonikerService>,
    /// Read-through cache over resolve results, keyed by the requested
    /// moniker string. Cleared on every snapshot swap.
    pub resolve_cache: Arc<TtlCache<ResolveResult>>,
    pub cache_enabled: bool,
    pub catalog_path: Arc<PathBuf>,
    pub telemetry: Arc<dyn TelemetrySink>,
}

impl AppState {
    pub fn new(registry: Arc<Registry>, catalog_path: PathBuf, cache_ttl: Duration) -> Self {
        Self {
            service: Arc::new(MonikerService::new(registry.clone())),
            registry,
            resolve_cache: Arc::new(TtlCache::new(cache_ttl)),
            cache_enabled: !cache_ttl.is_zero(),
            catalog_path: Arc::new(catalog_path),
            telemetry: Arc::new(LogSink),
        }
    }
}
