//! Error types for the payment service client.
//!
//! # Design
//! Every non-2xx response lands in `Http` with the raw status code and body,
//! so callers can branch on the status. Transport failures keep the
//! underlying `reqwest::Error` as their source. Nothing here is retried or
//! mapped to a default value.

use thiserror::Error;

/// Errors returned by `EpayClient` parsers and `TtkEpay` operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was obtained: DNS, connection refused, timeout, ...
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// Invalid client configuration (bad base URL, bad env var, ...).
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// HTTP status code, for failures where the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Transport(e) if e.is_timeout())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        ApiError::Transport(e)
    }
}
