//! Error types for the real-time subscriptions SDK

use crate::models::Envelope;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the real-time subscriptions SDK
#[derive(Error, Debug)]
pub enum Error {
    /// The API rejected the request and described why in its `meta` block
    #[error("API error {code} ({error_type}): {message}")]
    Api {
        code: u16,
        error_type: String,
        message: String,
    },

    /// Authentication failed (401)
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Authorization failed (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found (404)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded (429)
    #[error("Rate limit exceeded: retry after {retry_after:?}")]
    RateLimited {
        retry_after: Option<Duration>,
    },

    /// Server error (5xx)
    #[error("Server error: {0}")]
    Server(String),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Callback signature validation failed
    #[error("Invalid callback signature: {0}")]
    InvalidSignature(String),

    /// Missing required header
    #[error("Missing required header: {0}")]
    MissingHeader(String),

    /// Subscription challenge could not be answered
    #[error("Invalid challenge: {0}")]
    InvalidChallenge(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Check if the error is worth retrying by the caller
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::RateLimited { .. } | Error::Server(_))
    }

    /// Create an error from an HTTP status code and message
    pub fn from_status(status: reqwest::StatusCode, message: String) -> Self {
        match status.as_u16() {
            401 => Error::Authentication(message),
            403 => Error::Forbidden(message),
            404 => Error::NotFound(message),
            429 => Error::RateLimited { retry_after: None },
            500..=599 => Error::Server(message),
            _ => Error::Other(format!("HTTP {}: {}", status, message)),
        }
    }

    /// Create an error from a non-success response.
    ///
    /// 429 always becomes [`Error::RateLimited`] carrying `retry_after`.
    /// Other bodies carrying the API's `meta` error block become
    /// [`Error::Api`]; anything else falls back to [`Error::from_status`].
    pub fn from_response(
        status: reqwest::StatusCode,
        retry_after: Option<Duration>,
        body: String,
    ) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Error::RateLimited { retry_after };
        }

        if let Ok(envelope) = serde_json::from_str::<Envelope>(&body) {
            let meta = envelope.meta;
            if meta.error_type.is_some() || meta.error_message.is_some() {
                return Error::Api {
                    code: meta.code.unwrap_or(status.as_u16()),
                    error_type: meta.error_type.unwrap_or_default(),
                    message: meta.error_message.unwrap_or_default(),
                };
            }
        }
        Error::from_status(status, body)
    }
}
