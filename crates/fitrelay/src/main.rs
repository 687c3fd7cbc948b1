//! fitrelay - OAuth 2.0 authorization-code relay for the Fitbit API
//!
//! Main entry point for the fitrelay CLI.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};

mod commands;

use commands::{auth_url, start};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// fitrelay - OAuth 2.0 authorization-code relay for the Fitbit API
#[derive(Parser)]
#[command(name = "fitrelay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true, env = "FITRELAY_ENV_FILE")]
    pub env_file: Option<PathBuf>,

    /// Also write JSON logs to a daily-rotated file in this directory
    #[arg(long, global = true, env = "FITRELAY_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Start(start::StartArgs),

    /// Print the provider authorization URL
    AuthUrl(auth_url::AuthUrlArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_file = load_env_file(cli.env_file.as_deref())?;

    // Console (human-readable, stderr) + optional rotating JSON file
    let filter = if cli.verbose {
        "fitrelay=debug,fitrelay_server=debug,fitrelay_oauth=debug,fitrelay_config=debug,tower_http=debug,info"
    } else {
        "fitrelay=info,fitrelay_server=info,fitrelay_oauth=info,fitrelay_config=info,warn"
    };

    let (file_layer, _guard) = match &cli.log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "fitrelay.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "fitrelay=trace,fitrelay_server=trace,fitrelay_oauth=trace,fitrelay_config=trace,info",
                ));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(file_layer)
        .init();

    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    let ctx = commands::Context {
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Start(args) => start::run(args, &ctx).await,
        Commands::AuthUrl(args) => auth_url::run(args, &ctx).await,
    }
}

/// Load `.env` (or an explicit file) into the process environment.
///
/// A missing default `.env` is fine; a missing explicit file or a malformed
/// one is an error.
fn load_env_file(explicit: Option<&std::path::Path>) -> Result<Option<PathBuf>> {
    match explicit {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load env file '{}'", path.display()))?;
            Ok(Some(path.to_path_buf()))
        }
        None => match dotenvy::dotenv() {
            Ok(path) => Ok(Some(path)),
            Err(e) if e.not_found() => Ok(None),
            Err(e) => Err(e).context("failed to load .env"),
        },
    }
}
