//! Error types for the Gmail cleaner
//!
//! This module defines the error hierarchy for all operations in the crate.

use thiserror::Error;

/// Main error type for the Gmail cleaner
#[derive(Error, Debug)]
pub enum CleanerError {
    /// Missing, invalid or expired access token
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Gmail API errors
    #[error("Gmail API error: {0}")]
    Gmail(#[from] GmailApiError),

    /// Unknown or incomplete action request
    #[error("Invalid action: {0}")]
    InvalidAction(#[from] InvalidActionError),

    /// Model output that could not be interpreted
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// LLM provider or proxy errors
    #[error("AI error: {0}")]
    Ai(#[from] AiError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Authentication errors. Never retried here; the caller re-authenticates.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("No access token available")]
    MissingToken,

    #[error("Access token rejected: {message}")]
    Unauthorized { message: String },
}

/// Gmail API errors
#[derive(Error, Debug)]
pub enum GmailApiError {
    #[error("request failed ({status}): {message}")]
    Provider { status: u16, message: String },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum InvalidActionError {
    #[error("Unknown action: {action}")]
    Unknown { action: String },

    #[error("Label action requires a label name")]
    MissingLabel,
}

/// Errors raised while interpreting model output
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("command is empty")]
    EmptyCommand,

    #[error("no JSON object found in model output")]
    NoJsonFound,

    #[error("model output contains malformed JSON")]
    MalformedJson,

    #[error("model output does not match the expected shape: {message}")]
    Schema { message: String },
}

#[derive(Error, Debug)]
pub enum AiError {
    #[error("upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("upstream response had no choices")]
    EmptyResponse,

    #[error("proxy request failed ({status}): {message}")]
    Proxy { status: u16, message: String },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}")]
    MissingEnvVar { var: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result type alias for cleaner operations
pub type Result<T> = std::result::Result<T, CleanerError>;

impl CleanerError {
    /// True when the failure means the caller must obtain a new token.
    pub fn is_auth(&self) -> bool {
        matches!(self, CleanerError::Auth(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = GmailApiError::Provider {
            status: 404,
            message: "Requested entity was not found.".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("404"));
        assert!(text.contains("Requested entity was not found."));
    }

    #[test]
    fn test_error_conversion() {
        let auth_err = AuthError::MissingToken;
        let err: CleanerError = auth_err.into();
        assert!(matches!(err, CleanerError::Auth(_)));
        assert!(err.is_auth());
    }

    #[test]
    fn test_invalid_action_names_the_action() {
        let err: CleanerError = InvalidActionError::Unknown {
            action: "explode".to_string(),
        }
        .into();
        assert!(err.to_string().contains("explode"));
        assert!(!err.is_auth());
    }
}
