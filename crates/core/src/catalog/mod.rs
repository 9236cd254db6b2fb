pub mod loader;
pub mod registry;

pub use loader::{load_catalog, LoadError};
pub use registry::{ancestor_paths, parent_path, Registry, RegistryError};
