//! Axum route handlers for the HTTP API.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::error;

use super::models::{
    FailureKind, FailureResponse, HealthResponse, TextToSpeechBody, TextToSpeechResponse,
    TranslateBody, TranslateResponse, ValidationErrorResponse,
};
use super::AppState;
use crate::error::TranslationError;
use crate::types::{
    validate_lang, validate_text, TranslationRequest, DEFAULT_SOURCE_LANG, DEFAULT_TARGET_LANG,
};

/// Error responses shared by the handlers.
#[derive(Debug)]
pub enum ApiError {
    /// 422 with per-field messages
    Validation(BTreeMap<String, Vec<String>>),
    /// 500 carrying the resolution error
    TranslationFailed(TranslationError),
}

impl ApiError {
    fn from_json_rejection(rejection: JsonRejection) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert("body".to_string(), vec![rejection.body_text()]);
        Self::Validation(errors)
    }
}

fn failure_response(error: TranslationError) -> Response {
    let (kind, provider_status) = match &error {
        TranslationError::Configuration(_) => (FailureKind::Configuration, None),
        TranslationError::Upstream { status, .. } => (FailureKind::Upstream, *status),
        TranslationError::Transport(_) => (FailureKind::Transport, None),
        TranslationError::Validation { field, message } => {
            let mut errors = BTreeMap::new();
            errors.insert(field.to_string(), vec![message.clone()]);
            return ApiError::Validation(errors).into_response();
        }
    };

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(FailureResponse {
            success: false,
            message: "Translation failed".to_string(),
            error: error.to_string(),
            kind: Some(kind),
            detail: Some(error.detail().to_string()),
            provider_status,
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse {
                    success: false,
                    message: "Validation failed".to_string(),
                    errors,
                }),
            )
                .into_response(),
            ApiError::TranslationFailed(error) => failure_response(error),
        }
    }
}

/// Collects field errors so all of them are reported at once.
#[derive(Default)]
struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    fn check(&mut self, result: Result<(), TranslationError>) {
        if let Err(TranslationError::Validation { field, message }) = result {
            self.0.entry(field.to_string()).or_default().push(message);
        }
    }

    fn required(&mut self, field: &'static str, value: &Option<String>) {
        if value.is_none() {
            self.0
                .entry(field.to_string())
                .or_default()
                .push(format!("The {} field is required.", field));
        }
    }

    fn into_result(self) -> Result<(), ApiError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(self.0))
        }
    }
}

/// `GET /health`
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /translate`: dictionary first, then the remote provider.
///
/// # Errors
///
/// - 422 Unprocessable Entity: missing/oversized fields or malformed JSON
/// - 500 Internal Server Error: the provider is unconfigured, unreachable or failed
pub async fn translate(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TranslateBody>, JsonRejection>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let Json(body) = payload.map_err(ApiError::from_json_rejection)?;

    let mut errors = FieldErrors::default();
    errors.required("text", &body.text);
    if let Some(text) = &body.text {
        errors.check(validate_text("text", text));
    }
    if let Some(lang) = &body.source_lang {
        errors.check(validate_lang("source_lang", lang));
    }
    if let Some(lang) = &body.target_lang {
        errors.check(validate_lang("target_lang", lang));
    }
    errors.into_result()?;

    let request = TranslationRequest::new(
        body.text.unwrap_or_default(),
        body.source_lang
            .unwrap_or_else(|| DEFAULT_SOURCE_LANG.to_string()),
        body.target_lang
            .unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string()),
    )
    .map_err(|e| {
        let mut errors = FieldErrors::default();
        errors.check(Err(e));
        ApiError::Validation(errors.0)
    })?;

    let result = state.resolver.resolve(&request).await.map_err(|e| {
        error!("Translation error: {}", e);
        ApiError::TranslationFailed(e)
    })?;

    Ok(Json(TranslateResponse {
        success: true,
        original_text: result.original_text,
        translated: result.translated_text.clone(),
        translated_text: result.translated_text,
        source_lang: result.source_lang,
        target_lang: result.target_lang,
        origin: result.origin,
    }))
}

/// `POST /text-to-speech`: validates and echoes; playback happens on the
/// caller's own speech engine.
pub async fn text_to_speech(
    payload: Result<Json<TextToSpeechBody>, JsonRejection>,
) -> Result<Json<TextToSpeechResponse>, ApiError> {
    let Json(body) = payload.map_err(ApiError::from_json_rejection)?;

    let mut errors = FieldErrors::default();
    errors.required("text", &body.text);
    errors.required("lang", &body.lang);
    if let Some(text) = &body.text {
        errors.check(validate_text("text", text));
    }
    if let Some(lang) = &body.lang {
        errors.check(validate_lang("lang", lang));
    }
    errors.into_result()?;

    Ok(Json(TextToSpeechResponse {
        success: true,
        message: "Text-to-speech will be handled by the client's speech engine".to_string(),
        text: body.text.unwrap_or_default(),
        lang: body.lang.unwrap_or_default(),
    }))
}
