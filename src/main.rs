use anyhow::{Context, Result};
use live_translate::config::Config;
use live_translate::server::{build_app, AppState};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("live_translate=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    if config.deepl_api_key.is_none() {
        info!("DEEPL_API_KEY not set; only dictionary phrases can be translated");
    }

    let state = AppState::from_config(&config)?;
    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context(format!("Failed to bind to {}", addr))?;

    info!("Translation server listening on {}", addr);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
