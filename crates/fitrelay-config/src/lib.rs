//! Configuration for the fitrelay OAuth relay.
//!
//! All settings come from environment variables, are read once at startup,
//! and are validated before the server binds a socket. A missing credential
//! or malformed URL is a fatal [`ConfigError`].

pub mod env;
pub mod error;
pub mod types;

pub use error::{ConfigError, Result};
pub use types::*;
