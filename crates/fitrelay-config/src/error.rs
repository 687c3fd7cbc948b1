//! Configuration error types.

/// Result type alias for config operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors that can occur while loading relay configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable '{0}'")]
    MissingVar(&'static str),

    /// A variable is set but its value cannot be used.
    #[error("invalid value for environment variable '{name}': {reason}")]
    InvalidVar { name: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::InvalidVar {
            name,
            reason: reason.into(),
        }
    }
}
