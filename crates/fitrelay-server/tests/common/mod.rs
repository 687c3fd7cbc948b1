//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tokio::sync::oneshot;
use wiremock::MockServer;

use fitrelay_config::RelayConfig;
use fitrelay_oauth::{InMemoryTokenStore, OAuthClient};
use fitrelay_server::{AppState, Server, ServerConfig};

pub const CLIENT_ID: &str = "test-client";
pub const CLIENT_SECRET: &str = "test-secret";
pub const REDIRECT_URI: &str = "http://localhost:3000/callback";
pub const TOKEN_PATH: &str = "/oauth2/token";
pub const PROFILE_PATH: &str = "/1/user/-/profile.json";

/// A relay running in the background against a mock provider.
pub struct TestRelay {
    /// The relay's address.
    pub addr: SocketAddr,
    /// HTTP client that does not follow redirects.
    pub client: Client,
    /// Mock provider and resource API.
    pub upstream: MockServer,
    /// Token store the relay saves into.
    pub store: Arc<InMemoryTokenStore>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestRelay {
    /// Start a relay with a working token store.
    pub async fn start() -> Result<Self> {
        Self::start_with(InMemoryTokenStore::new(), Duration::from_secs(5)).await
    }

    /// Start a relay with a specific token store and upstream timeout.
    pub async fn start_with(store: InMemoryTokenStore, timeout: Duration) -> Result<Self> {
        let upstream = MockServer::start().await;

        let relay = RelayConfig::new(
            CLIENT_ID,
            CLIENT_SECRET,
            REDIRECT_URI,
            format!("{}{}", upstream.uri(), TOKEN_PATH),
        )
        .with_profile_uri(format!("{}{}", upstream.uri(), PROFILE_PATH))
        .with_upstream_timeout(timeout);

        let oauth = OAuthClient::new(Arc::new(relay))?;
        let config = ServerConfig::default().with_bind_address("127.0.0.1:0".parse()?);

        let store = Arc::new(store);
        let state = AppState::new(oauth, config).with_token_store(store.clone());

        let (tx, rx) = oneshot::channel::<()>();
        let addr = Server::from_state(state)
            .run_with_shutdown(async move {
                let _ = rx.await;
            })
            .await?;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            addr,
            client,
            upstream,
            store,
            shutdown: Some(tx),
        })
    }

    /// Get the base URL for the relay.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}
