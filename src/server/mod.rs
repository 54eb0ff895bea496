//! HTTP API over the resolution service.
//!
//! ## Endpoints
//!
//! - `GET /health`: health check
//! - `POST /translate`: resolve text (dictionary first, then DeepL)
//! - `POST /text-to-speech`: validate and echo; synthesis stays on the client

pub mod models;
pub mod routes;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::deepl::DeepLClient;
use crate::resolver::ResolutionService;

/// Shared application state, passed to all route handlers via Axum `State`.
pub struct AppState {
    pub resolver: ResolutionService,
}

impl AppState {
    pub fn new(resolver: ResolutionService) -> Arc<Self> {
        Arc::new(Self { resolver })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Arc<Self>> {
        let remote = DeepLClient::from_config(config)?;
        Ok(Self::new(ResolutionService::new(remote)))
    }
}

/// Build the Axum router with all routes and request tracing.
pub fn build_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(routes::health))
        .route("/translate", post(routes::translate))
        .route("/text-to-speech", post(routes::text_to_speech))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
