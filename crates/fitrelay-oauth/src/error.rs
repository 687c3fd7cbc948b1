//! Error types for upstream OAuth and resource calls.

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, OAuthError>;

/// Errors that can occur while talking to the provider or resource API.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Connection, TLS or other transport failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream did not answer within the configured timeout.
    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// The upstream answered with a non-2xx status.
    #[error("Upstream returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// The upstream answered 2xx but the body was not what we expected.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),

    /// Caller input was rejected before any upstream call.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// HTTP client could not be constructed.
    #[error("Config error: {0}")]
    Config(String),

    /// Token store failure.
    #[error("Token store error: {0}")]
    Store(String),
}

impl OAuthError {
    /// HTTP status returned by the upstream, if it got that far.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            OAuthError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OAuthError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            OAuthError::Timeout(e.to_string())
        } else if e.is_decode() {
            OAuthError::InvalidResponse(e.to_string())
        } else {
            OAuthError::Network(e.to_string())
        }
    }
}
