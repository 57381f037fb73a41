// Process configuration
//
// Everything is read from the environment (a `.env` file is loaded first by
// `main`). Only the completion API key is a secret; it is optional here so
// the server can start without it, and the completion call fails with an
// authentication error until it is provided.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
pub const DEFAULT_API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20241022";
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_PROMPTS_FILE: &str = "prompting.yaml";
pub const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "serviceAccountKey.json";

/// Settings for the completion service client
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub api_version: String,
    pub model: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_url", &self.api_url)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl CompletionConfig {
    /// Read `CLAUDE_*` variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = std::env::var("CLAUDE_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "CLAUDE_API_KEY not set, completion requests will fail until it is provided"
            );
        }

        let timeout = match std::env::var("CLAUDE_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map(Duration::from_secs).unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid CLAUDE_TIMEOUT_SECS, using default");
                defaults.timeout
            }),
            Err(_) => defaults.timeout,
        };

        Self {
            api_key,
            api_url: std::env::var("CLAUDE_API_URL").unwrap_or(defaults.api_url),
            api_version: std::env::var("CLAUDE_API_VERSION").unwrap_or(defaults.api_version),
            model: std::env::var("CLAUDE_MODEL").unwrap_or(defaults.model),
            timeout,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub prompts_file: PathBuf,
    pub service_account_path: PathBuf,
    pub completion: CompletionConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let default_addr = SocketAddr::from(([0, 0, 0, 0], 8000));
        let bind_addr = match std::env::var("BIND_ADDR") {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid BIND_ADDR, using default");
                default_addr
            }),
            Err(_) => default_addr,
        };

        Self {
            bind_addr,
            prompts_file: std::env::var("PROMPTS_FILE")
                .unwrap_or_else(|_| DEFAULT_PROMPTS_FILE.to_string())
                .into(),
            service_account_path: std::env::var("SERVICE_ACCOUNT_PATH")
                .unwrap_or_else(|_| DEFAULT_SERVICE_ACCOUNT_PATH.to_string())
                .into(),
            completion: CompletionConfig::from_env(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_defaults() {
        let config = CompletionConfig::default();

        assert!(config.api_key.is_none());
        assert_eq!(config.model, "claude-3-5-sonnet-20241022");
        assert_eq!(config.api_version, "2023-06-01");
        assert_eq!(config.timeout, Duration::from_secs(120));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = CompletionConfig {
            api_key: Some("sk-secret".to_string()),
            ..CompletionConfig::default()
        };

        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
