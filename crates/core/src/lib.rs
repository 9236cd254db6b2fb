pub mod cache;
pub mod catalog;
pub mod model;
pub mod moniker;
pub mod resolver;
pub mod telemetry;

pub use cache::TtlCache;
pub use catalog::{load_catalog, LoadError, Registry, RegistryError};
pub use moniker::{parse_moniker, Moniker, MonikerPath, ParseError};
pub use resolver::{CallerIdentity, MonikerService, ResolveError, ResolveResult};
pub use telemetry::{AccessEvent, LogSink, TelemetrySink};
