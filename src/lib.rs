pub mod config;
pub mod core;
pub mod errors;
pub mod form;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use crate::core::*;
pub use errors::config_error::{ConfigError, ConfigResult};
pub use errors::relay_error::{RelayError, RelayResult};
pub use routes::create_app;
pub use state::AppState;
