//! Error types for the summarizer library.
//!
//! [`ModelError`] is what a single model call can fail with. Rate limiting has
//! its own variant so the retry loop can dispatch on it directly.
//! [`SummarizerError`] is what the request pipeline surfaces to the API.

use std::path::PathBuf;
use thiserror::Error;

/// Failures of one call to the hosted model.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ModelError {
    /// Provider answered 429 / RESOURCE_EXHAUSTED.
    #[error("Rate limit exceeded (429){}", retry_hint(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success response from the provider.
    #[error("Gemini API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Connection, timeout or body decoding failure.
    #[error("Gemini transport error: {0}")]
    Transport(String),
}

impl ModelError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ModelError::RateLimited { .. })
    }
}

fn retry_hint(secs: &Option<u64>) -> String {
    match secs {
        Some(s) => format!(", retry after {s}s"),
        None => String::new(),
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(e: reqwest::Error) -> Self {
        ModelError::Transport(e.to_string())
    }
}

/// Fatal errors of the upload -> extract -> chat pipeline.
#[derive(Debug, Error)]
pub enum SummarizerError {
    /// Path missing or not a parseable PDF.
    #[error("Failed to open document '{path}': {detail}")]
    DocumentOpen { path: PathBuf, detail: String },

    #[error("Failed to store upload '{path}': {source}")]
    Upload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Non rate-limit provider failure, never retried.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Every attempt was rate limited.
    #[error("Maximum retries exceeded ({attempts} attempts). Quota issue persists.")]
    QuotaExceeded { attempts: u32 },
}

/// Startup configuration errors.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("API key is missing or invalid. Please set the GEMINI_API_KEY environment variable.")]
    MissingApiKey,

    #[error("Invalid value '{value}' for {name}")]
    Invalid { name: &'static str, value: String },
}
