//! The relay configuration struct.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Provider authorization page users are redirected to.
pub const DEFAULT_AUTHORIZE_URI: &str = "https://www.fitbit.com/oauth2/authorize";

/// Resource API endpoint serving the authenticated user's profile.
pub const DEFAULT_PROFILE_URI: &str = "https://api.fitbit.com/1/user/-/profile.json";

/// Scope requested during authorization.
pub const DEFAULT_SCOPE: &str = "nutrition";

/// Requested token lifetime in seconds (one week).
pub const DEFAULT_TOKEN_EXPIRES_IN: u64 = 604_800;

/// Upper bound on any single upstream call.
pub const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Port the relay listens on.
pub const DEFAULT_PORT: u16 = 3000;

/// Immutable, process-wide relay configuration.
///
/// Built once at startup and shared behind an `Arc`; nothing mutates it
/// afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// OAuth client identifier issued by the provider.
    pub client_id: String,
    /// OAuth client secret. Never rendered by `Debug`.
    pub client_secret: String,
    /// Callback URL registered with the provider.
    pub redirect_uri: String,
    /// Provider token endpoint (code exchange and refresh).
    pub token_uri: String,
    /// Provider authorization page.
    pub authorize_uri: String,
    /// Resource API profile endpoint.
    pub profile_uri: String,
    /// Space-separated scopes requested at authorization.
    pub scope: String,
    /// Requested token lifetime, forwarded as `expires_in`.
    pub token_expires_in: u64,
    /// Total timeout applied to each upstream request.
    pub upstream_timeout: Duration,
    /// Address the HTTP server binds to.
    pub bind_address: SocketAddr,
}

impl RelayConfig {
    /// Create a config from the four required values, with defaults for the rest.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
        token_uri: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            token_uri: token_uri.into(),
            authorize_uri: DEFAULT_AUTHORIZE_URI.to_string(),
            profile_uri: DEFAULT_PROFILE_URI.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
            token_expires_in: DEFAULT_TOKEN_EXPIRES_IN,
            upstream_timeout: DEFAULT_UPSTREAM_TIMEOUT,
            bind_address: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), DEFAULT_PORT),
        }
    }

    /// Set the provider authorization page.
    pub fn with_authorize_uri(mut self, uri: impl Into<String>) -> Self {
        self.authorize_uri = uri.into();
        self
    }

    /// Set the resource API profile endpoint.
    pub fn with_profile_uri(mut self, uri: impl Into<String>) -> Self {
        self.profile_uri = uri.into();
        self
    }

    /// Set the upstream request timeout.
    pub fn with_upstream_timeout(mut self, timeout: Duration) -> Self {
        self.upstream_timeout = timeout;
        self
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Replace only the listening port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_address.set_port(port);
        self
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("redirect_uri", &self.redirect_uri)
            .field("token_uri", &self.token_uri)
            .field("authorize_uri", &self.authorize_uri)
            .field("profile_uri", &self.profile_uri)
            .field("scope", &self.scope)
            .field("token_expires_in", &self.token_expires_in)
            .field("upstream_timeout", &self.upstream_timeout)
            .field("bind_address", &self.bind_address)
            .finish()
    }
}
