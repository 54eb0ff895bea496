//! Console driver for the live orchestrator.
//!
//! Every line typed on stdin is treated as the new content of the input box,
//! so it goes through the same debounce/staleness/auto-speak rules as a
//! keystroke in a UI. Speech output is logged instead of played.
//!
//! Usage:
//!   cargo run --bin console        # with the server running on :8080
//!
//! Commands: /swap, /clear, /speak, /quit
//!
//! Optional environment variables:
//! - TRANSLATE_API_URL (defaults to http://localhost:8080)
//! - SOURCE_LANG (defaults to ja)
//! - TARGET_LANG (defaults to en)

use anyhow::{Context, Result};
use live_translate::client::HttpBackend;
use live_translate::orchestrator::{self, Command, OrchestratorConfig};
use live_translate::speech::{LoggingSynthesizer, NoopRecognizer};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("live_translate=info".parse()?)
                .add_directive("console=info".parse()?),
        )
        .init();

    let api_url = std::env::var("TRANSLATE_API_URL")
        .unwrap_or_else(|_| "http://localhost:8080".to_string());
    let backend = HttpBackend::new(&api_url, Duration::from_secs(15))
        .context("Failed to create translation client")?;

    let mut config = OrchestratorConfig::default();
    if let Ok(lang) = std::env::var("SOURCE_LANG") {
        config.source_lang = lang;
    }
    if let Ok(lang) = std::env::var("TARGET_LANG") {
        config.target_lang = lang;
    }

    info!(
        "Translating {} -> {} via {}",
        config.source_lang, config.target_lang, api_url
    );

    let (handle, task) = orchestrator::spawn(
        config,
        Arc::new(backend),
        Box::new(NoopRecognizer),
        Box::new(LoggingSynthesizer),
    );

    let mut updates = handle.subscribe();
    let events = handle.clone();
    let printer = tokio::spawn(async move {
        let mut shown = (String::new(), None::<String>, String::new());
        let mut shown_speech_error = None::<String>;
        while updates.changed().await.is_ok() {
            let snapshot = updates.borrow_and_update().clone();
            let direction = format!("{} -> {}", snapshot.source_lang, snapshot.target_lang);
            if direction != shown.2 && !shown.2.is_empty() {
                println!("⇄ {}", direction);
            }
            if snapshot.translated_text != shown.0 || snapshot.error != shown.1 {
                match &snapshot.error {
                    Some(error) => println!("⚠️  {}", error),
                    None if !snapshot.translated_text.is_empty() => {
                        println!("→ {}", snapshot.translated_text)
                    }
                    None => {}
                }
            }
            if snapshot.speech_error != shown_speech_error {
                if let Some(error) = &snapshot.speech_error {
                    println!("🎤 {}", error);
                }
                shown_speech_error = snapshot.speech_error.clone();
            }
            // Logged speech is over as soon as it is printed
            if snapshot.is_speaking && events.send(Command::SpeechEnded).is_err() {
                break;
            }
            shown = (snapshot.translated_text, snapshot.error, direction);
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        let trimmed = line.trim().to_string();
        let command = match trimmed.as_str() {
            "/quit" => break,
            "/swap" => Command::SwapLanguages,
            "/clear" => Command::Clear,
            "/speak" => Command::SpeakTranslation,
            _ => Command::InputChanged(line),
        };
        handle.send(command)?;
    }

    // The printer holds a handle too; stop it before waiting for shutdown
    printer.abort();
    let _ = printer.await;
    drop(handle);
    task.await?;

    Ok(())
}
