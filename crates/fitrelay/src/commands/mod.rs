//! CLI command handlers.

use anyhow::{Context as _, Result};
use fitrelay_config::RelayConfig;

pub mod auth_url;
pub mod start;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Verbose output enabled.
    pub verbose: bool,
}

impl Context {
    /// Read and validate relay configuration from the environment.
    pub fn load_config(&self) -> Result<RelayConfig> {
        let config = RelayConfig::from_env().context("invalid relay configuration")?;
        if self.verbose {
            eprintln!("Configuration: {:?}", config);
        }
        Ok(config)
    }
}
