//! Error types shared across the relay
//!
//! - `relay_error` - request-scoped failures and their JSON envelope
//! - `config_error` - startup configuration failures

pub mod config_error;
pub mod relay_error;
