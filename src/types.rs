//! Request and result types shared by the resolution service, the HTTP API
//! and the orchestrator.

use crate::error::TranslationError;
use serde::{Deserialize, Serialize};

pub const MAX_TEXT_CHARS: usize = 5000;
pub const MAX_LANG_CHARS: usize = 10;

pub const DEFAULT_SOURCE_LANG: &str = "ja";
pub const DEFAULT_TARGET_LANG: &str = "en";

/// Where a translation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Dictionary,
    Remote,
}

/// A validated request to translate one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    text: String,
    source_lang: String,
    target_lang: String,
}

impl TranslationRequest {
    pub fn new(
        text: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Result<Self, TranslationError> {
        let text = text.into();
        let source_lang = source_lang.into();
        let target_lang = target_lang.into();

        validate_text("text", &text)?;
        validate_lang("source_lang", &source_lang)?;
        validate_lang("target_lang", &target_lang)?;

        Ok(Self {
            text,
            source_lang,
            target_lang,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }
}

/// The outcome of a successful resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationResult {
    pub original_text: String,
    pub translated_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub origin: Origin,
}

/// Required, non-blank, at most [`MAX_TEXT_CHARS`] characters.
pub fn validate_text(field: &'static str, value: &str) -> Result<(), TranslationError> {
    if value.trim().is_empty() {
        return Err(TranslationError::validation(
            field,
            format!("The {} field is required.", field),
        ));
    }
    if value.chars().count() > MAX_TEXT_CHARS {
        return Err(TranslationError::validation(
            field,
            format!(
                "The {} field must not be greater than {} characters.",
                field, MAX_TEXT_CHARS
            ),
        ));
    }
    Ok(())
}

/// Non-blank, at most [`MAX_LANG_CHARS`] characters.
pub fn validate_lang(field: &'static str, value: &str) -> Result<(), TranslationError> {
    if value.trim().is_empty() {
        return Err(TranslationError::validation(
            field,
            format!("The {} field is required.", field),
        ));
    }
    if value.chars().count() > MAX_LANG_CHARS {
        return Err(TranslationError::validation(
            field,
            format!(
                "The {} field must not be greater than {} characters.",
                field, MAX_LANG_CHARS
            ),
        ));
    }
    Ok(())
}
