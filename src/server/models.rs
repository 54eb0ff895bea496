//! JSON request and response bodies for the HTTP API.

use crate::types::Origin;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Request body for `POST /translate`.
///
/// Every field is optional at the serde level so that missing fields are
/// reported through the validation envelope rather than a bare rejection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TranslateBody {
    pub text: Option<String>,
    pub source_lang: Option<String>,
    pub target_lang: Option<String>,
}

/// Response body for a successful `POST /translate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub success: bool,
    pub original_text: String,
    pub translated_text: String,
    /// Same as `translated_text`, kept for older clients
    pub translated: String,
    pub source_lang: String,
    pub target_lang: String,
    pub origin: Origin,
}

/// Request body for `POST /text-to-speech`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextToSpeechBody {
    pub text: Option<String>,
    pub lang: Option<String>,
}

/// Response body for `POST /text-to-speech`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextToSpeechResponse {
    pub success: bool,
    pub message: String,
    pub text: String,
    pub lang: String,
}

/// 422 body: field name → messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorResponse {
    pub success: bool,
    pub message: String,
    pub errors: BTreeMap<String, Vec<String>>,
}

/// Which part of the translation path failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Configuration,
    Upstream,
    Transport,
}

/// 500 body for a failed translation.
///
/// `kind`, `detail` and `provider_status` let an HTTP client rebuild the
/// original error; older bodies without them still parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureResponse {
    pub success: bool,
    pub message: String,
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<FailureKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_status: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}
