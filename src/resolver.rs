//! Translation resolution: dictionary fast path, then the remote provider.

use crate::deepl::DeepLClient;
use crate::dictionary;
use crate::error::TranslationError;
use crate::types::{Origin, TranslationRequest, TranslationResult};
use futures::future::BoxFuture;
use futures::FutureExt;
use tracing::info;

/// Anything that can turn a request into a result.
///
/// The orchestrator is written against this trait so it can run on top of
/// the in-process [`ResolutionService`] or an HTTP client for `/translate`.
pub trait TranslationBackend: Send + Sync {
    fn resolve<'a>(
        &'a self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<TranslationResult, TranslationError>>;
}

#[derive(Debug, Clone)]
pub struct ResolutionService {
    remote: DeepLClient,
}

impl ResolutionService {
    pub fn new(remote: DeepLClient) -> Self {
        Self { remote }
    }

    /// Resolve a request, trying the dictionary before any network I/O.
    ///
    /// Remote errors are returned unchanged; there is no fallback text.
    pub async fn resolve(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResult, TranslationError> {
        let (translated_text, origin) = match dictionary::lookup(
            request.text(),
            request.source_lang(),
            request.target_lang(),
        ) {
            Some(hit) => {
                info!(text = %request.text(), "Translation from dictionary");
                (hit.to_string(), Origin::Dictionary)
            }
            None => {
                let translated = self
                    .remote
                    .translate(request.text(), request.source_lang(), request.target_lang())
                    .await?;
                info!(text = %request.text(), "Translation from DeepL API");
                (translated, Origin::Remote)
            }
        };

        Ok(TranslationResult {
            original_text: request.text().to_string(),
            translated_text,
            source_lang: request.source_lang().to_string(),
            target_lang: request.target_lang().to_string(),
            origin,
        })
    }
}

impl TranslationBackend for ResolutionService {
    fn resolve<'a>(
        &'a self,
        request: &'a TranslationRequest,
    ) -> BoxFuture<'a, Result<TranslationResult, TranslationError>> {
        ResolutionService::resolve(self, request).boxed()
    }
}
