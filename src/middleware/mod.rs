pub mod auth;

// Re-export middleware functions
pub use auth::relay_auth_middleware;
