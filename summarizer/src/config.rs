//! Process-wide configuration, read once at startup from the environment.
//!
//! `main` calls `dotenv::dotenv()` first so a `.env` file works the same as
//! exported variables.

use crate::error::ConfigError;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-1.5-pro-latest";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_UPLOAD_FOLDER: &str = "upload";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 50;
pub const DEFAULT_MAX_RETRIES: u32 = 5;
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 60;

pub const RESPONDER_SEED: i64 = 42;
pub const RESPONDER_CACHE_SEED: u64 = 41;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub upload_dir: PathBuf,
    pub bind_addr: String,
    pub max_output_tokens: u32,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup("GEMINI_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let or_default = |name: &str, default: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            api_key,
            model: or_default("GEMINI_MODEL", DEFAULT_MODEL),
            base_url: or_default("GEMINI_BASE_URL", DEFAULT_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            upload_dir: PathBuf::from(or_default("UPLOAD_FOLDER", DEFAULT_UPLOAD_FOLDER)),
            bind_addr: or_default("BIND_ADDR", DEFAULT_BIND_ADDR),
            max_output_tokens: parse_var(
                &lookup,
                "MAX_OUTPUT_TOKENS",
                DEFAULT_MAX_OUTPUT_TOKENS,
            )?,
            max_retries: parse_var(&lookup, "CHAT_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_delay: Duration::from_secs(parse_var(
                &lookup,
                "CHAT_RETRY_DELAY_SECS",
                DEFAULT_RETRY_DELAY_SECS,
            )?),
        })
    }
}

fn parse_var<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn missing_api_key_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn blank_api_key_is_fatal() {
        let err = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingApiKey);
    }

    #[test]
    fn defaults_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "k")])).unwrap();
        assert_eq!(cfg.api_key, "k");
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.upload_dir, PathBuf::from("upload"));
        assert_eq!(cfg.max_output_tokens, 50);
        assert_eq!(cfg.max_retries, 5);
        assert_eq!(cfg.retry_delay, Duration::from_secs(60));
    }

    #[test]
    fn overrides_apply() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("GEMINI_BASE_URL", "http://localhost:9000/"),
            ("CHAT_MAX_RETRIES", "2"),
            ("CHAT_RETRY_DELAY_SECS", "1"),
        ]))
        .unwrap();
        assert_eq!(cfg.base_url, "http://localhost:9000");
        assert_eq!(cfg.max_retries, 2);
        assert_eq!(cfg.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn invalid_number_is_rejected() {
        let err = AppConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("MAX_OUTPUT_TOKENS", "lots"),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                name: "MAX_OUTPUT_TOKENS",
                value: "lots".into()
            }
        );
    }
}
