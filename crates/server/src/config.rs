// Server configuration: flags with environment fallbacks.

use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "moniker-server",
    version,
    about = "Moniker resolution service - catalog-backed data directory"
)]
pub struct ServerConfig {
    /// Path to the declarative catalog file.
    #[arg(long, env = "MONIKER_CATALOG")]
    pub catalog: PathBuf,

    /// Bind address.
    #[arg(long, env = "MONIKER_BIND", default_value = "0.0.0.0")]
    pub bind: String,

    /// Listen port.
    #[arg(long, env = "MONIKER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Seconds between background catalog reloads. 0 disables the reloader;
    /// `POST /config/reload` still works.
    #[arg(long, env = "MONIKER_RELOAD_INTERVAL", default_value_t = 60)]
    pub reload_interval_seconds: u64,

    /// Resolve-cache TTL in seconds. 0 disables the cache.
    #[arg(long, env = "MONIKER_CACHE_TTL", default_value_t = 300)]
    pub cache_ttl_seconds: u64,
}
