//! Loading [`RelayConfig`] from environment variables.
//!
//! Required: `CLIENT_ID`, `CLIENT_SECRET`, `REDIRECT_URI`, `TOKEN_URI`.
//! Optional: `AUTHORIZE_URI`, `PROFILE_URI`, `OAUTH_SCOPE`,
//! `TOKEN_EXPIRES_IN`, `UPSTREAM_TIMEOUT_SECS`, `BIND_ADDRESS`, `PORT`.
//!
//! Empty values count as unset.

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::error::{ConfigError, Result};
use crate::types::RelayConfig;

pub const CLIENT_ID: &str = "CLIENT_ID";
pub const CLIENT_SECRET: &str = "CLIENT_SECRET";
pub const REDIRECT_URI: &str = "REDIRECT_URI";
pub const TOKEN_URI: &str = "TOKEN_URI";
pub const AUTHORIZE_URI: &str = "AUTHORIZE_URI";
pub const PROFILE_URI: &str = "PROFILE_URI";
pub const OAUTH_SCOPE: &str = "OAUTH_SCOPE";
pub const TOKEN_EXPIRES_IN: &str = "TOKEN_EXPIRES_IN";
pub const UPSTREAM_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";
pub const BIND_ADDRESS: &str = "BIND_ADDRESS";
pub const PORT: &str = "PORT";

impl RelayConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::MissingVar(name));

        let client_id = required(CLIENT_ID)?;
        let client_secret = required(CLIENT_SECRET)?;
        let redirect_uri = parse_url(REDIRECT_URI, required(REDIRECT_URI)?)?;
        let token_uri = parse_url(TOKEN_URI, required(TOKEN_URI)?)?;

        let mut config = RelayConfig::new(client_id, client_secret, redirect_uri, token_uri);

        if let Some(uri) = get(AUTHORIZE_URI) {
            config.authorize_uri = parse_url(AUTHORIZE_URI, uri)?;
        }
        if let Some(uri) = get(PROFILE_URI) {
            config.profile_uri = parse_url(PROFILE_URI, uri)?;
        }
        if let Some(scope) = get(OAUTH_SCOPE) {
            config.scope = scope;
        }
        if let Some(raw) = get(TOKEN_EXPIRES_IN) {
            config.token_expires_in = parse_number(TOKEN_EXPIRES_IN, &raw)?;
        }
        if let Some(raw) = get(UPSTREAM_TIMEOUT_SECS) {
            let secs: u64 = parse_number(UPSTREAM_TIMEOUT_SECS, &raw)?;
            if secs == 0 {
                return Err(ConfigError::invalid(
                    UPSTREAM_TIMEOUT_SECS,
                    "timeout must be at least one second",
                ));
            }
            config.upstream_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = get(BIND_ADDRESS) {
            let ip = IpAddr::from_str(&raw)
                .map_err(|e| ConfigError::invalid(BIND_ADDRESS, e.to_string()))?;
            config.bind_address = SocketAddr::new(ip, config.bind_address.port());
        }
        if let Some(raw) = get(PORT) {
            config.bind_address.set_port(parse_number(PORT, &raw)?);
        }

        tracing::debug!(?config, "Loaded relay configuration");
        Ok(config)
    }
}

/// Accept only absolute http(s) URLs. The input string is returned unchanged.
fn parse_url(name: &'static str, value: String) -> Result<String> {
    let url = Url::parse(&value).map_err(|e| ConfigError::invalid(name, e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(value),
        other => Err(ConfigError::invalid(
            name,
            format!("unsupported URL scheme '{}'", other),
        )),
    }
}

fn parse_number<T>(name: &'static str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| ConfigError::invalid(name, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    fn required_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            (CLIENT_ID, "23ABCD"),
            (CLIENT_SECRET, "s3cr3t"),
            (REDIRECT_URI, "http://localhost:3000/callback"),
            (TOKEN_URI, "https://api.fitbit.com/oauth2/token"),
        ]
    }

    #[test]
    fn test_loads_required_with_defaults() {
        let config = RelayConfig::from_lookup(lookup(&required_vars())).unwrap();
        assert_eq!(config.client_id, "23ABCD");
        assert_eq!(config.client_secret, "s3cr3t");
        assert_eq!(config.redirect_uri, "http://localhost:3000/callback");
        assert_eq!(config.token_uri, "https://api.fitbit.com/oauth2/token");
        assert_eq!(config.scope, "nutrition");
        assert_eq!(config.bind_address.port(), 3000);
    }

    #[test]
    fn test_each_required_var_is_enforced() {
        for missing in [CLIENT_ID, CLIENT_SECRET, REDIRECT_URI, TOKEN_URI] {
            let vars: Vec<_> = required_vars()
                .into_iter()
                .filter(|(k, _)| *k != missing)
                .collect();
            let err = RelayConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(
                matches!(err, ConfigError::MissingVar(name) if name == missing),
                "expected MissingVar({}), got {:?}",
                missing,
                err
            );
        }
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let mut vars = required_vars();
        vars[0] = (CLIENT_ID, "   ");
        let err = RelayConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(CLIENT_ID)));
    }

    #[test]
    fn test_rejects_relative_token_uri() {
        let mut vars = required_vars();
        vars[3] = (TOKEN_URI, "/oauth2/token");
        let err = RelayConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidVar { name: TOKEN_URI, .. }));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let mut vars = required_vars();
        vars[2] = (REDIRECT_URI, "ftp://example.com/cb");
        let err = RelayConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("unsupported URL scheme"));
    }

    #[test]
    fn test_optional_overrides() {
        let mut vars = required_vars();
        vars.extend([
            (OAUTH_SCOPE, "profile nutrition"),
            (TOKEN_EXPIRES_IN, "86400"),
            (UPSTREAM_TIMEOUT_SECS, "3"),
            (BIND_ADDRESS, "127.0.0.1"),
            (PORT, "4000"),
            (PROFILE_URI, "http://127.0.0.1:9999/profile.json"),
        ]);
        let config = RelayConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(config.scope, "profile nutrition");
        assert_eq!(config.token_expires_in, 86_400);
        assert_eq!(config.upstream_timeout, Duration::from_secs(3));
        assert_eq!(config.bind_address, "127.0.0.1:4000".parse().unwrap());
        assert_eq!(config.profile_uri, "http://127.0.0.1:9999/profile.json");
    }

    #[test]
    fn test_rejects_bad_port_and_zero_timeout() {
        let mut vars = required_vars();
        vars.push((PORT, "70000"));
        assert!(matches!(
            RelayConfig::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::InvalidVar { name: PORT, .. }
        ));

        let mut vars = required_vars();
        vars.push((UPSTREAM_TIMEOUT_SECS, "0"));
        assert!(matches!(
            RelayConfig::from_lookup(lookup(&vars)).unwrap_err(),
            ConfigError::InvalidVar {
                name: UPSTREAM_TIMEOUT_SECS,
                ..
            }
        ));
    }
}
