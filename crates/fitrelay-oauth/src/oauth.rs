//! OAuth 2.0 authorization-code flow against the fitness provider.
//!
//! Every upstream-calling operation issues exactly one HTTP request and
//! returns a typed [`OAuthError`] on failure. Nothing is retried: an
//! authorization code is single-use, so a failed exchange must restart the
//! flow from the authorization redirect.

use std::fmt;
use std::sync::Arc;

use fitrelay_config::RelayConfig;
use serde::{Deserialize, Serialize};

use crate::error::{OAuthError, Result};

/// Build the provider authorization URL.
///
/// Parameters are emitted in a fixed order and percent-encoded. No `state`
/// parameter is included.
pub fn build_authorization_url(config: &RelayConfig) -> String {
    let expires_in = config.token_expires_in.to_string();
    let params = [
        ("response_type", "code"),
        ("client_id", config.client_id.as_str()),
        ("redirect_uri", config.redirect_uri.as_str()),
        ("scope", config.scope.as_str()),
        ("expires_in", expires_in.as_str()),
    ];

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let separator = if config.authorize_uri.contains('?') { '&' } else { '?' };
    format!("{}{}{}", config.authorize_uri, separator, query)
}

/// Access/refresh token pair handed back to callers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Token endpoint response.
///
/// Only the two tokens are required; the remaining fields are informational
/// and never returned to callers.
#[derive(Clone, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

impl TokenGrant {
    /// Drop everything but the token pair.
    pub fn into_pair(self) -> TokenPair {
        TokenPair {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
        }
    }
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expires_in", &self.expires_in)
            .field("token_type", &self.token_type)
            .field("scope", &self.scope)
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Raw profile document from the resource API, kept byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDocument {
    body: Vec<u8>,
}

impl ProfileDocument {
    /// Wrap a body, rejecting anything that is not JSON.
    pub fn from_json_bytes(body: Vec<u8>) -> Result<Self> {
        serde_json::from_slice::<serde::de::IgnoredAny>(&body).map_err(|e| {
            OAuthError::InvalidResponse(format!("Profile body is not JSON: {}", e))
        })?;
        Ok(Self { body })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }
}

#[derive(Serialize)]
struct CodeExchangeForm<'a> {
    client_id: &'a str,
    grant_type: &'static str,
    redirect_uri: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
struct RefreshForm<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
    refresh_token: &'a str,
}

/// Client for the provider token endpoint and the resource API.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: reqwest::Client,
    config: Arc<RelayConfig>,
}

impl OAuthClient {
    /// Create a client whose every request is bounded by the configured timeout.
    pub fn new(config: Arc<RelayConfig>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .connect_timeout(config.upstream_timeout)
            .user_agent(concat!("fitrelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| OAuthError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Provider authorization URL for the configured client.
    pub fn authorization_url(&self) -> String {
        build_authorization_url(&self.config)
    }

    /// Exchange an authorization code for tokens.
    ///
    /// Client credentials go in an HTTP Basic `Authorization` header.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenGrant> {
        if code.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "Authorization code missing".to_string(),
            ));
        }

        let form = CodeExchangeForm {
            client_id: &self.config.client_id,
            grant_type: "authorization_code",
            redirect_uri: &self.config.redirect_uri,
            code,
        };

        tracing::debug!(token_uri = %self.config.token_uri, "Exchanging authorization code");

        let response = self
            .http
            .post(&self.config.token_uri)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&form)
            .send()
            .await?;

        parse_token_response(response).await
    }

    /// Exchange a refresh token for a new token pair.
    ///
    /// The provider may rotate the refresh token; the returned grant always
    /// carries the provider's new value.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenGrant> {
        if refresh_token.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "Refresh token is required".to_string(),
            ));
        }

        let form = RefreshForm {
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            grant_type: "refresh_token",
            refresh_token,
        };

        tracing::debug!(token_uri = %self.config.token_uri, "Refreshing access token");

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&form)
            .send()
            .await?;

        parse_token_response(response).await
    }

    /// Fetch the authenticated user's profile from the resource API.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<ProfileDocument> {
        if access_token.is_empty() {
            return Err(OAuthError::InvalidRequest(
                "Access token is required".to_string(),
            ));
        }

        tracing::debug!(profile_uri = %self.config.profile_uri, "Fetching profile");

        let response = self
            .http
            .get(&self.config.profile_uri)
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        ProfileDocument::from_json_bytes(body.to_vec())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(OAuthError::Upstream {
        status: status.as_u16(),
        body,
    })
}

async fn parse_token_response(response: reqwest::Response) -> Result<TokenGrant> {
    let response = ensure_success(response).await?;
    let body = response.bytes().await?;
    serde_json::from_slice(&body)
        .map_err(|e| OAuthError::InvalidResponse(format!("Failed to parse token response: {}", e)))
}
