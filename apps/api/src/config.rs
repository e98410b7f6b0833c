use anyhow::{Context, Result};

use crate::image_client::DEFAULT_IMAGE_API_URL;

/// Application configuration loaded from environment variables.
/// Only malformed numeric values fail startup; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Without a key the thumbnail endpoint answers 500 "not configured".
    pub openai_api_key: Option<String>,
    pub image_api_url: String,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup, so tests need not touch the
    /// process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Config {
            port: non_empty("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: non_empty("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            image_api_url: non_empty("IMAGE_API_URL")
                .unwrap_or_else(|| DEFAULT_IMAGE_API_URL.to_string()),
            rate_limit_max_requests: non_empty("RATE_LIMIT_MAX_REQUESTS")
                .unwrap_or_else(|| "5".to_string())
                .parse::<u32>()
                .context("RATE_LIMIT_MAX_REQUESTS must be a non-negative integer")?,
            rate_limit_window_secs: non_empty("RATE_LIMIT_WINDOW_SECS")
                .unwrap_or_else(|| "600".to_string())
                .parse::<u64>()
                .context("RATE_LIMIT_WINDOW_SECS must be a non-negative integer")?,
        })
    }
}
