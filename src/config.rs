use anyhow::{Context, Result};
use std::time::Duration;

pub const DEFAULT_DEEPL_API_URL: &str = "https://api-free.deepl.com/v2/translate";

/// Value shipped in the sample `.env`; treated the same as no key at all.
pub const PLACEHOLDER_API_KEY: &str = "your_deepl_api_key_here";

#[derive(Debug, Clone)]
pub struct Config {
    // DeepL
    pub deepl_api_key: Option<String>,
    pub deepl_api_url: String,
    pub deepl_timeout: Duration,

    // Server
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            // DeepL - a missing key is reported per request, not at startup
            deepl_api_key: std::env::var("DEEPL_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty()),
            deepl_api_url: std::env::var("DEEPL_API_URL")
                .unwrap_or_else(|_| DEFAULT_DEEPL_API_URL.to_string()),
            deepl_timeout: Duration::from_secs(
                match std::env::var("DEEPL_TIMEOUT_SECS") {
                    Ok(v) => {
                        let secs: u64 = v
                            .parse()
                            .context(format!("DEEPL_TIMEOUT_SECS is not a number: {}", v))?;
                        if secs == 0 {
                            anyhow::bail!("DEEPL_TIMEOUT_SECS must be at least 1 second");
                        }
                        secs
                    }
                    Err(_) => 10,
                },
            ),

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}
