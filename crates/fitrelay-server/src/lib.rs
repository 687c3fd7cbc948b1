//! HTTP surface of the fitrelay OAuth relay.
//!
//! A stateless forwarder: every request is handled independently and makes
//! at most one upstream call.
//!
//! | Method | Path | Upstream |
//! |---|---|---|
//! | GET | `/` | — |
//! | GET | `/health` | — |
//! | GET | `/auth` | — (302 to the provider) |
//! | GET | `/callback?code=` | token endpoint |
//! | GET | `/user/profile?access_token=` | resource API |
//! | POST | `/refresh_token` | token endpoint |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use fitrelay_config::RelayConfig;
//! use fitrelay_oauth::OAuthClient;
//! use fitrelay_server::{AppState, Server, ServerConfig};
//!
//! let relay = Arc::new(RelayConfig::from_env()?);
//! let state = AppState::new(
//!     OAuthClient::new(relay.clone())?,
//!     ServerConfig::from_relay(&relay),
//! );
//! Server::from_state(state).serve_until(shutdown_signal()).await?;
//! ```

pub mod config;
pub mod error;
pub mod routes;
pub mod state;
pub mod trace;

pub use config::ServerConfig;
pub use error::{ErrorResponse, Result, ServerError, UpstreamOperation};
pub use routes::HealthResponse;
pub use state::AppState;

use std::future::Future;
use std::net::SocketAddr;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// The relay HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        Router::new()
            .merge(routes::health_routes())
            .route("/auth", get(routes::authorize_handler))
            .route("/callback", get(routes::callback_handler))
            .route("/user/profile", get(routes::profile_handler))
            .route("/refresh_token", post(routes::refresh_handler))
            .layer(trace::trace_layer(self.state.config.request_logging))
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .with_state(self.state.clone())
    }

    /// Get the configured bind address.
    pub fn bind_address(&self) -> SocketAddr {
        self.state.config.bind_address
    }

    /// Serve on the configured address until `shutdown` resolves, then drain
    /// in-flight requests.
    pub async fn serve_until(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = self.bind().await?;
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Internal(format!("Server error: {}", e)))?;
        info!("Server stopped");
        Ok(())
    }

    /// Serve in a background task, returning the bound address.
    ///
    /// Binding to port 0 picks a free port, which is what tests want.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<SocketAddr> {
        let listener = self.bind().await?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| ServerError::Internal(format!("Failed to read local address: {}", e)))?;
        let router = self.router();
        tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown)
                .await
                .ok();
        });
        Ok(local_addr)
    }

    async fn bind(&self) -> Result<TcpListener> {
        let addr = self.bind_address();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::Internal(format!("Failed to bind {}: {}", addr, e)))?;
        let local_addr = listener.local_addr().unwrap_or(addr);
        info!(addr = %local_addr, "Starting OAuth relay server");
        Ok(listener)
    }
}
