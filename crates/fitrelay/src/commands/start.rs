//! Start command - launches the relay server.

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Args;

use fitrelay_oauth::OAuthClient;
use fitrelay_server::{AppState, Server, ServerConfig};

use super::Context;

/// Arguments for the start command.
///
/// CLI arguments override environment values.
#[derive(Args, Debug)]
pub struct StartArgs {
    /// Port to listen on (overrides PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to (overrides BIND_ADDRESS)
    #[arg(short, long)]
    pub bind: Option<IpAddr>,

    /// Disable per-request completion logging
    #[arg(long)]
    pub no_request_log: bool,
}

/// Run the start command.
pub async fn run(args: StartArgs, ctx: &Context) -> Result<()> {
    // ── Load configuration ──────────────────────────────────────────────

    let mut config = ctx.load_config()?;
    if let Some(ip) = args.bind {
        config.bind_address.set_ip(ip);
    }
    if let Some(port) = args.port {
        config = config.with_port(port);
    }
    let config = Arc::new(config);

    // ── Build server ────────────────────────────────────────────────────

    let oauth = OAuthClient::new(config.clone())?;
    let server_config =
        ServerConfig::from_relay(&config).with_request_logging(!args.no_request_log);
    let server = Server::from_state(AppState::new(oauth, server_config));

    println!("Server running at http://{}", server.bind_address());
    println!("Press Ctrl+C to stop");

    server.serve_until(shutdown_signal()).await?;
    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining requests");
}
