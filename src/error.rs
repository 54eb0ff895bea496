use thiserror::Error;

/// Failures of the translation path.
///
/// Dictionary misses are not errors, and results superseded by a newer
/// request are discarded by the orchestrator rather than reported.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TranslationError {
    /// The request shape was rejected before any translation was attempted
    #[error("invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    /// No usable provider credential is configured
    #[error("translation provider is not configured: {0}")]
    Configuration(String),

    /// The provider answered, but with an error status or an unusable body
    #[error("translation provider error{}: {message}", status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Upstream { status: Option<u16>, message: String },

    /// The provider could not be reached or did not answer in time
    #[error("failed to reach translation provider: {0}")]
    Transport(String),
}

impl TranslationError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The message without the kind prefix added by `Display`.
    pub fn detail(&self) -> &str {
        match self {
            Self::Validation { message, .. } => message,
            Self::Configuration(message) => message,
            Self::Upstream { message, .. } => message,
            Self::Transport(message) => message,
        }
    }
}
