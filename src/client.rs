//! Translation backend that talks to a running `/translate` endpoint.

use crate::error::TranslationError;
use anyhow::Context;
use crate::resolver::TranslationBackend;
use crate::server::models::{
    FailureKind, FailureResponse, TranslateResponse, ValidationErrorResponse,
};
use crate::types::{TranslationRequest, TranslationResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::json;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: reqwest::Client,
    translate_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build translation API client")?;

        Ok(Self {
            http,
            translate_url: format!("{}/translate", base_url.trim_end_matches('/')),
        })
    }

    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        let response = self
            .http
            .post(&self.translate_url)
            .json(&json!({
                "text": request.text(),
                "source_lang": request.source_lang(),
                "target_lang": request.target_lang(),
            }))
            .send()
            .await
            .map_err(|e| TranslationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TranslationError::Transport(e.to_string()))?;

        if status == reqwest::StatusCode::UNPROCESSABLE_ENTITY {
            let message = serde_json::from_str::<ValidationErrorResponse>(&body)
                .map(|v| v.errors.into_values().flatten().collect::<Vec<_>>().join(" "))
                .unwrap_or(body);
            return Err(TranslationError::validation("request", message));
        }

        if !status.is_success() {
            return Err(match serde_json::from_str::<FailureResponse>(&body) {
                Ok(failure) => failure_to_error(failure, status.as_u16()),
                Err(_) => TranslationError::Upstream {
                    status: Some(status.as_u16()),
                    message: body,
                },
            });
        }

        let parsed: TranslateResponse =
            serde_json::from_str(&body).map_err(|e| TranslationError::Upstream {
                status: None,
                message: format!("invalid response body: {}", e),
            })?;

        Ok(TranslationResult {
            original_text: parsed.original_text,
            translated_text: parsed.translated_text,
            source_lang: parsed.source_lang,
            target_lang: parsed.target_lang,
            origin: parsed.origin,
        })
    }
}

/// Rebuild the server-side error from a failure envelope.
///
/// Envelopes without a `kind` are reported as an upstream failure with the
/// HTTP status of the response.
fn failure_to_error(failure: FailureResponse, http_status: u16) -> TranslationError {
    let detail = failure.detail.unwrap_or(failure.error);
    match failure.kind {
        Some(FailureKind::Configuration) => TranslationError::Configuration(detail),
        Some(FailureKind::Transport) => TranslationError::Transport(detail),
        Some(FailureKind::Upstream) => TranslationError::Upstream {
            status: failure.provider_status,
            message: detail,
        },
        None => TranslationError::Upstream {
            status: Some(http_status),
            message: detail,
        },
    }
}

impl TranslationBackend for HttpBackend {
    fn resolve<'a>(
        &'a self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<TranslationResult, TranslationError>> {
        self.translate(request).boxed()
    }
}
