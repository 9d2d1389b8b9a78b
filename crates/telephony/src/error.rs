//! Typed error enum for telephony operations.

use thiserror::Error;

/// Errors from provider REST calls and configuration.
#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),
    #[error("HTTP status {code}: {body}")]
    HttpStatus { code: u16, body: String },
    #[error("JSON parse error in {context}: {source}")]
    JsonParse {
        context: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing field in provider response: {0}")]
    MissingField(String),
    #[error("client initialization failed: {0}")]
    ClientInit(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl TelephonyError {
    /// Whether this error is transient. Outbound call placement is never
    /// auto-retried (a retry could ring the contact twice); the flag only
    /// informs logging and the fallback decision.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpRequest(e) => e.is_timeout() || e.is_connect(),
            Self::HttpStatus { code, .. } => matches!(code, 429 | 500 | 502 | 503),
            _ => false,
        }
    }
}
