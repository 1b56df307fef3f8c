//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `speech` - The text-to-speech relay endpoint
//! - `voices` - Voice catalog listing

pub mod api;
pub mod speech;
pub mod voices;

pub use speech::text_to_speech;
