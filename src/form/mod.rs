//! Form front end: the model a user interface drives.
//!
//! - `state` - form fields, in-flight flag, last error and last audio
//! - `catalog` - languages and voices offered, loaded from YAML
//! - `client` - HTTP client posting the form to the relay
//! - `artifact` - generated audio and its download

pub mod artifact;
pub mod catalog;
pub mod client;
pub mod state;

pub use artifact::AudioArtifact;
pub use catalog::{CatalogError, LanguageEntry, VoiceCatalog, VoiceOption};
pub use client::{ClientConfig, ClientError, RelayClient};
pub use state::{FormState, GenerateRefused};
