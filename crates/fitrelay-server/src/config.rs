//! Server configuration.

use std::net::SocketAddr;

use fitrelay_config::RelayConfig;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Log a completion event for every request.
    pub request_logging: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], fitrelay_config::DEFAULT_PORT)),
            request_logging: true,
        }
    }
}

impl ServerConfig {
    /// Derive server settings from the relay configuration.
    pub fn from_relay(relay: &RelayConfig) -> Self {
        Self {
            bind_address: relay.bind_address,
            ..Default::default()
        }
    }

    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_listens_on_3000() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address.port(), 3000);
        assert!(config.request_logging);
    }

    #[test]
    fn test_from_relay_uses_relay_bind_address() {
        let relay = RelayConfig::new("id", "s", "http://localhost/cb", "http://t/token")
            .with_bind_address("127.0.0.1:4100".parse().unwrap());
        let config = ServerConfig::from_relay(&relay).with_request_logging(false);
        assert_eq!(config.bind_address, relay.bind_address);
        assert!(!config.request_logging);
    }
}
