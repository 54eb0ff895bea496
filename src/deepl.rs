//! DeepL translation client.
//!
//! Every failure is classified into one of three kinds: missing credential
//! (`Configuration`), provider rejection or malformed body (`Upstream`), and
//! network failure including timeouts (`Transport`). No retries happen here.

use crate::config::{Config, PLACEHOLDER_API_KEY};
use anyhow::Context;
use crate::error::TranslationError;
use crate::language;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    #[serde(default)]
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

#[derive(Debug, Clone)]
pub struct DeepLClient {
    http: reqwest::Client,
    api_key: Option<String>,
    api_url: String,
}

impl DeepLClient {
    /// Build a client with the request timeout baked into the HTTP client.
    pub fn new(
        api_key: Option<String>,
        api_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build DeepL HTTP client")?;

        Ok(Self {
            http,
            api_key,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.deepl_api_key.clone(),
            config.deepl_api_url.clone(),
            config.deepl_timeout,
        )
    }

    fn api_key(&self) -> Result<&str, TranslationError> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty() && *key != PLACEHOLDER_API_KEY)
            .ok_or_else(|| {
                TranslationError::Configuration(
                    "DeepL API key is not configured. Please set DEEPL_API_KEY".to_string(),
                )
            })
    }

    /// Translate `text` through the provider.
    ///
    /// Language tags are normalized to provider codes first, so "ja-JP"
    /// and "JA" are sent the same way and unknown tags become "EN".
    pub async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        target_lang: &str,
    ) -> Result<String, TranslationError> {
        let api_key = self.api_key()?;
        let source = language::normalize(source_lang);
        let target = language::normalize(target_lang);

        debug!("Sending DeepL request ({} -> {})", source, target);

        let response = self
            .http
            .post(&self.api_url)
            .header("Authorization", format!("DeepL-Auth-Key {}", api_key))
            .form(&[("text", text), ("source_lang", source), ("target_lang", target)])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;

        if !status.is_success() {
            warn!("DeepL API error ({}): {}", status, body);
            return Err(TranslationError::Upstream {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let parsed: DeepLResponse =
            serde_json::from_str(&body).map_err(|e| TranslationError::Upstream {
                status: None,
                message: format!("invalid response body: {}", e),
            })?;

        parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| TranslationError::Upstream {
                status: None,
                message: "response contained no translations".to_string(),
            })
    }
}

fn transport_error(e: reqwest::Error) -> TranslationError {
    if e.is_timeout() {
        TranslationError::Transport(format!("request timed out: {}", e))
    } else {
        TranslationError::Transport(e.to_string())
    }
}
