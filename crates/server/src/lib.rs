pub mod config;
pub mod error;
pub mod reload;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use state::AppState;
