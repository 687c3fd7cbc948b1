//! OAuth 2.0 authorization-code client for the fitness provider.
//!
//! # Components
//!
//! - [`oauth`] — authorization URL, code exchange, token refresh, profile fetch
//! - [`token_store`] — pluggable storage for issued tokens (no-op by default)

pub mod error;
pub mod oauth;
pub mod token_store;

pub use error::{OAuthError, Result};
pub use oauth::{OAuthClient, ProfileDocument, TokenGrant, TokenPair, build_authorization_url};
#[cfg(any(test, feature = "testing"))]
pub use token_store::InMemoryTokenStore;
pub use token_store::{NoopTokenStore, SharedTokenStore, TokenStore, noop_token_store};
