pub mod audit;
pub mod binding;
pub mod node;
pub mod ownership;
pub mod policy;
pub mod quality;

pub use audit::AuditEntry;
pub use binding::{QueryCacheConfig, SourceBinding, SourceType};
pub use node::{CatalogNode, NodeStatus};
pub use ownership::{Ownership, ResolvedOwnership};
pub use policy::{AccessPolicy, PolicyDecision};
pub use quality::{ColumnSchema, DataQuality, DataSchema, Documentation, Freshness, Sla};
