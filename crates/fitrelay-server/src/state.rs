//! Application state shared across handlers.

use std::sync::Arc;

use fitrelay_oauth::{OAuthClient, SharedTokenStore, TokenPair, noop_token_store};
use tracing::warn;

use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// Everything in here is immutable after construction and cheap to clone;
/// handlers never coordinate with each other.
#[derive(Clone)]
pub struct AppState {
    /// Upstream OAuth client (carries the relay configuration).
    pub oauth: OAuthClient,

    /// Where issued tokens are handed after an exchange or refresh.
    pub token_store: SharedTokenStore,

    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Create a new application state with the no-op token store.
    pub fn new(oauth: OAuthClient, config: ServerConfig) -> Self {
        Self {
            oauth,
            token_store: noop_token_store(),
            config: Arc::new(config),
        }
    }

    /// Replace the token store.
    pub fn with_token_store(mut self, store: SharedTokenStore) -> Self {
        self.token_store = store;
        self
    }

    /// Hand a freshly issued pair to the token store.
    ///
    /// A store failure is logged and swallowed: the authorization code is
    /// already consumed, so the caller still gets the tokens.
    pub async fn store_tokens(&self, tokens: &TokenPair) {
        if let Err(e) = self.token_store.save(tokens).await {
            warn!(error = %e, "Failed to save token pair");
        }
    }
}
