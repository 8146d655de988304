//! Suggestion service error types

use std::time::Duration;
use thiserror::Error;

/// Errors from a suggest-mapping call
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Suggestion service is rate limiting, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("Suggestion service answered {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Couldn't reach suggestion service: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Suggestion service did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Malformed suggestion response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("Suggestion service unavailable: {0}")]
    Unavailable(String),
}

/// HTTP statuses worth another attempt
pub(crate) fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500 | 502 | 503 | 504)
}

impl ServiceError {
    /// Whether the same request may succeed when sent again
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Network(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => is_retryable_status(*status),
            Self::MalformedResponse(_) | Self::Unavailable(_) => false,
        }
    }

    /// Server-requested wait before the next attempt
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
