//! Error types for vidgate.

use thiserror::Error;

/// Primary error type for all gateway operations.
///
/// Every failure a request can hit is classified into one of these
/// variants before it reaches the HTTP layer; raw transport errors
/// never travel past the upstream client boundary.
#[derive(Error, Debug)]
pub enum VidgateError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    #[error("Upstream API credential is not configured")]
    MissingCredential,

    #[error("Video {0} not found")]
    NotFound(String),

    #[error("Upstream request timed out after {0}s")]
    UpstreamTimeout(u64),

    #[error("Upstream request was denied: {snippet}")]
    UpstreamDenied { snippet: String },

    #[error("Upstream error (status {0})")]
    UpstreamStatus(u16),

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VidgateError {
    /// HTTP status this error maps to at the response boundary.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::RateLimited { .. } => 429,
            Self::MissingCredential => 503,
            Self::UpstreamTimeout(_) => 504,
            Self::UpstreamDenied { .. } | Self::UpstreamStatus(_) | Self::Network(_) => 502,
            Self::Io(_) => 500,
        }
    }

    /// Whether a caller could reasonably retry after this error.
    ///
    /// Client mistakes (400/404) are permanent; quota and upstream
    /// trouble may clear on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self.http_status(), 429 | 502 | 504)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, VidgateError>;
