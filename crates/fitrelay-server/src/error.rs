//! Error types for the server.
//!
//! Upstream failures are logged in full and reported to the caller with a
//! fixed message only; provider error bodies never reach the response.

use std::fmt;

use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use fitrelay_oauth::OAuthError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which upstream call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamOperation {
    CodeExchange,
    ProfileFetch,
    TokenRefresh,
}

impl UpstreamOperation {
    /// Message shown to callers when this operation fails.
    pub fn public_message(self) -> &'static str {
        match self {
            UpstreamOperation::CodeExchange => "Error exchanging code for tokens.",
            UpstreamOperation::ProfileFetch => "Error fetching profile data.",
            UpstreamOperation::TokenRefresh => "Error refreshing token.",
        }
    }
}

impl fmt::Display for UpstreamOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UpstreamOperation::CodeExchange => "code exchange",
            UpstreamOperation::ProfileFetch => "profile fetch",
            UpstreamOperation::TokenRefresh => "token refresh",
        };
        f.write_str(name)
    }
}

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Required caller input is missing or malformed.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// The provider or resource API call failed.
    #[error("Upstream {operation} failed: {source}")]
    Upstream {
        operation: UpstreamOperation,
        #[source]
        source: OAuthError,
    },

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Wrap an upstream failure, keeping input errors as 400s.
    pub fn upstream(operation: UpstreamOperation, source: OAuthError) -> Self {
        match source {
            OAuthError::InvalidRequest(msg) => ServerError::BadRequest(msg),
            source => ServerError::Upstream { operation, source },
        }
    }

    /// HTTP status and machine-readable code for this error.
    pub fn status_code(&self) -> (StatusCode, &'static str) {
        match self {
            ServerError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ServerError::Upstream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error"),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// The message safe to show to callers.
    pub fn public_message(&self) -> String {
        match self {
            ServerError::BadRequest(msg) => msg.clone(),
            ServerError::Upstream { operation, .. } => operation.public_message().to_string(),
            ServerError::Internal(_) => "Internal server error.".to_string(),
        }
    }
}

/// Query strings that fail to deserialize, such as a repeated key. The
/// rejection text is not forwarded.
impl From<QueryRejection> for ServerError {
    fn from(_: QueryRejection) -> Self {
        ServerError::BadRequest("Malformed query string.".to_string())
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

/// Error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_code();

        match &self {
            ServerError::Upstream { operation, source } => {
                tracing::error!(
                    status = %status,
                    code,
                    operation = %operation,
                    upstream_status = ?source.upstream_status(),
                    error = %source,
                    "Upstream call failed"
                );
            }
            ServerError::Internal(detail) => {
                tracing::error!(status = %status, code, error = %detail, "Server error");
            }
            ServerError::BadRequest(msg) => {
                tracing::warn!(status = %status, code, error = %msg, "Client error");
            }
        }

        let body = ErrorResponse {
            code: code.to_string(),
            message: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_request_maps_to_400() {
        let err = ServerError::BadRequest("Authorization code missing.".to_string());
        assert_eq!(err.status_code().0, StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Authorization code missing.");
    }

    #[test]
    fn test_every_upstream_failure_maps_to_500() {
        let failures = [
            OAuthError::Network("connection refused".to_string()),
            OAuthError::Timeout("deadline elapsed".to_string()),
            OAuthError::Upstream {
                status: 401,
                body: "invalid_grant".to_string(),
            },
            OAuthError::InvalidResponse("not json".to_string()),
        ];

        for source in failures {
            let err = ServerError::upstream(UpstreamOperation::CodeExchange, source);
            assert_eq!(err.status_code(), (StatusCode::INTERNAL_SERVER_ERROR, "upstream_error"));
            assert_eq!(err.public_message(), "Error exchanging code for tokens.");
        }
    }

    #[test]
    fn test_invalid_request_from_client_stays_400() {
        let err = ServerError::upstream(
            UpstreamOperation::TokenRefresh,
            OAuthError::InvalidRequest("Refresh token is required".to_string()),
        );
        assert!(matches!(err, ServerError::BadRequest(_)));
    }

    #[test]
    fn test_query_rejection_is_bad_request() {
        use axum::extract::Query;
        use axum::http::Uri;

        #[derive(Debug, serde::Deserialize)]
        struct Params {
            #[allow(dead_code)]
            code: Option<String>,
        }

        let uri: Uri = "/callback?code=C1&code=C2".parse().unwrap();
        let rejection = Query::<Params>::try_from_uri(&uri).unwrap_err();
        let err = ServerError::from(rejection);
        assert_eq!(err.status_code(), (StatusCode::BAD_REQUEST, "bad_request"));
        assert_eq!(err.public_message(), "Malformed query string.");
    }

    #[tokio::test]
    async fn test_upstream_body_not_echoed() {
        let err = ServerError::upstream(
            UpstreamOperation::ProfileFetch,
            OAuthError::Upstream {
                status: 401,
                body: r#"{"errors":[{"errorType":"expired_token"}]}"#.to_string(),
            },
        );
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let parsed: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(parsed.code, "upstream_error");
        assert_eq!(parsed.message, "Error fetching profile data.");
        assert!(!String::from_utf8_lossy(&body).contains("expired_token"));
    }
}
