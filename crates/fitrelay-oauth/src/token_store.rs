//! Token storage extension point.
//!
//! The relay keeps nothing between requests. After each successful exchange
//! or refresh it hands the new pair to a [`TokenStore`]; the default
//! [`NoopTokenStore`] drops it. Deployments that want persistence plug in
//! their own implementation without touching the relay handlers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::oauth::TokenPair;

/// Storage for issued token pairs.
#[async_trait]
pub trait TokenStore: Send + Sync + std::fmt::Debug {
    /// Persist the latest token pair.
    async fn save(&self, tokens: &TokenPair) -> Result<()>;

    /// Load the most recently saved pair, if any.
    async fn load(&self) -> Result<Option<TokenPair>>;
}

/// Store that keeps nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTokenStore;

#[async_trait]
impl TokenStore for NoopTokenStore {
    async fn save(&self, _tokens: &TokenPair) -> Result<()> {
        tracing::trace!("NoopTokenStore: discarding token pair");
        Ok(())
    }

    async fn load(&self) -> Result<Option<TokenPair>> {
        Ok(None)
    }
}

/// Shared token store for use across handlers.
pub type SharedTokenStore = Arc<dyn TokenStore>;

/// Create the default shared store.
pub fn noop_token_store() -> SharedTokenStore {
    Arc::new(NoopTokenStore)
}

#[cfg(any(test, feature = "testing"))]
pub use memory::InMemoryTokenStore;

#[cfg(any(test, feature = "testing"))]
mod memory {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use super::TokenStore;
    use crate::error::{OAuthError, Result};
    use crate::oauth::TokenPair;

    /// In-memory token store for testing.
    #[derive(Debug, Default)]
    pub struct InMemoryTokenStore {
        tokens: RwLock<Option<TokenPair>>,
        save_count: AtomicU32,
        fail_saves: bool,
    }

    impl InMemoryTokenStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// A store whose `save` always errors.
        pub fn failing() -> Self {
            Self {
                fail_saves: true,
                ..Self::default()
            }
        }

        pub fn save_count(&self) -> u32 {
            self.save_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TokenStore for InMemoryTokenStore {
        async fn save(&self, tokens: &TokenPair) -> Result<()> {
            self.save_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return Err(OAuthError::Store("simulated save failure".to_string()));
            }
            *self.tokens.write().await = Some(tokens.clone());
            Ok(())
        }

        async fn load(&self) -> Result<Option<TokenPair>> {
            Ok(self.tokens.read().await.clone())
        }
    }
}
