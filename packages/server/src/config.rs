use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Default model used for document field extraction.
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-4o";

/// Documents travel inline as base64, so the body limit is well above axum's 2 MiB default.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub extraction_model: String,
    /// Event endpoint of an external workflow service. When unset, events are
    /// handled by the in-process extraction runner.
    pub workflow_event_url: Option<String>,
    pub workflow_event_key: Option<String>,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            openai_api_key: env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?,
            openai_base_url: non_empty_var("OPENAI_BASE_URL"),
            extraction_model: non_empty_var("EXTRACTION_MODEL")
                .unwrap_or_else(|| DEFAULT_EXTRACTION_MODEL.to_string()),
            workflow_event_url: non_empty_var("WORKFLOW_EVENT_URL"),
            workflow_event_key: non_empty_var("WORKFLOW_EVENT_KEY"),
            max_upload_bytes: match non_empty_var("MAX_UPLOAD_BYTES") {
                Some(raw) => raw
                    .parse()
                    .context("MAX_UPLOAD_BYTES must be a valid number")?,
                None => DEFAULT_MAX_UPLOAD_BYTES,
            },
        })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
