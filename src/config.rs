//! Configuration management for the Gmail cleaner
//!
//! Handles environment variables and configuration loading.

use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Default address of the AI proxy
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

/// Default listen port for the AI proxy
pub const DEFAULT_PORT: u16 = 3000;

const DEFAULT_DEPLOYMENT: &str = "gpt-4";
const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Configuration for the Gmail cleaner
#[derive(Debug, Clone)]
pub struct Config {
    /// Gmail REST base URL
    pub gmail_api_base: String,

    /// Where the orchestration layer reaches the AI proxy
    pub proxy_url: String,

    /// Port the AI proxy listens on
    pub port: u16,

    /// Per-request deadline for Gmail calls
    pub request_timeout: Option<Duration>,

    /// LLM provider settings
    pub ai: AiConfig,
}

/// Settings for the upstream chat-completions provider
#[derive(Debug, Clone, Default)]
pub struct AiConfig {
    pub endpoint: Option<String>,
    pub api_key: Option<String>,
    pub deployment: String,
    pub api_version: String,
}

/// Provider settings that passed startup validation
#[derive(Debug, Clone)]
pub struct ResolvedAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidConfig {
                message: format!("PORT must be a port number, got '{}'", raw),
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match non_empty("GMAIL_REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::InvalidConfig {
                    message: format!(
                        "GMAIL_REQUEST_TIMEOUT_SECS must be a whole number, got '{}'",
                        raw
                    ),
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            gmail_api_base: non_empty("GMAIL_API_BASE")
                .unwrap_or_else(|| gmail::API_BASE_URL.to_string()),
            proxy_url: non_empty("AI_PROXY_URL").unwrap_or_else(|| DEFAULT_PROXY_URL.to_string()),
            port,
            request_timeout,
            ai: AiConfig {
                endpoint: non_empty("AZURE_OPENAI_ENDPOINT"),
                api_key: non_empty("AZURE_OPENAI_API_KEY"),
                deployment: non_empty("AZURE_OPENAI_DEPLOYMENT")
                    .unwrap_or_else(|| DEFAULT_DEPLOYMENT.to_string()),
                api_version: non_empty("AZURE_API_VERSION")
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
            },
        })
    }

    /// Build the HTTP client used for Gmail calls
    pub fn http_client(&self) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl AiConfig {
    /// Check that the LLM credential is present. Called once at startup.
    pub fn require(&self) -> Result<ResolvedAiConfig> {
        let endpoint = self.endpoint.clone().ok_or_else(|| ConfigError::MissingEnvVar {
            var: "AZURE_OPENAI_ENDPOINT".to_string(),
        })?;
        let api_key = self.api_key.clone().ok_or_else(|| ConfigError::MissingEnvVar {
            var: "AZURE_OPENAI_API_KEY".to_string(),
        })?;

        Ok(ResolvedAiConfig {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment: self.deployment.clone(),
            api_version: self.api_version.clone(),
        })
    }
}

/// Gmail API constants
pub mod gmail {
    /// Base URL for Gmail API
    pub const API_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";

    /// User ID for the authenticated user
    pub const USER_ID: &str = "me";

    /// Upper bound on ids requested when listing candidates
    pub const DEFAULT_LIST_LIMIT: u32 = 100;

    /// How many listed messages get full detail in a preview
    pub const PREVIEW_DETAIL_LIMIT: usize = 50;

    /// How many recent messages an analysis looks at
    pub const ANALYSIS_LIMIT: u32 = 50;

    /// Concurrent detail fetches per chunk
    pub const DEFAULT_CHUNK_SIZE: usize = 10;

    /// System label IDs used by the cleanup actions
    pub mod labels {
        pub const INBOX: &str = "INBOX";
        pub const UNREAD: &str = "UNREAD";
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
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.gmail_api_base, gmail::API_BASE_URL);
        assert_eq!(config.proxy_url, DEFAULT_PROXY_URL);
        assert_eq!(config.port, 3000);
        assert!(config.request_timeout.is_none());
        assert_eq!(config.ai.deployment, "gpt-4");
        assert_eq!(config.ai.api_version, "2024-02-15-preview");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = Config::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_timeout_is_parsed() {
        let config =
            Config::from_lookup(lookup(&[("GMAIL_REQUEST_TIMEOUT_SECS", "15")])).unwrap();
        assert_eq!(config.request_timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_missing_ai_credential_is_a_config_error() {
        let config =
            Config::from_lookup(lookup(&[("AZURE_OPENAI_ENDPOINT", "https://x.example")]))
                .unwrap();
        let err = config.ai.require().unwrap_err();
        assert!(err.to_string().contains("AZURE_OPENAI_API_KEY"));
    }

    #[test]
    fn test_ai_endpoint_trailing_slash_is_trimmed() {
        let config = Config::from_lookup(lookup(&[
            ("AZURE_OPENAI_ENDPOINT", "https://x.example/"),
            ("AZURE_OPENAI_API_KEY", "secret"),
        ]))
        .unwrap();
        let resolved = config.ai.require().unwrap();
        assert_eq!(resolved.endpoint, "https://x.example");
        assert_eq!(resolved.api_key, "secret");
    }
}
