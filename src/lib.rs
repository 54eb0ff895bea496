//! Live translation: a dictionary-first resolution service behind an HTTP
//! API, and the client-side orchestrator that drives it from typed or
//! spoken input.

pub mod client;
pub mod config;
pub mod deepl;
pub mod dictionary;
pub mod error;
pub mod language;
pub mod orchestrator;
pub mod resolver;
pub mod server;
pub mod speech;
pub mod types;

pub use error::TranslationError;
pub use resolver::{ResolutionService, TranslationBackend};
pub use types::{Origin, TranslationRequest, TranslationResult};
