//! Server configuration read from the environment.

use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://coach_tracking.sqlite3";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PUBLIC_DIR: &str = "public";

#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid port: {0}")]
    InvalidPort(String),
    #[error("invalid host address: {0}")]
    InvalidHost(String),
}

/// Allowed browser origins. `*` or an empty value allows any origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorsConfig {
    pub allowed_origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: "*".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: String,
    pub public_dir: PathBuf,
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.into(),
            public_dir: PathBuf::from(DEFAULT_PUBLIC_DIR),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `PORT` or `COACHTRACK_HOST` cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Unset or blank keys
    /// fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the port or host value cannot be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let host = match get("COACHTRACK_HOST") {
            Some(raw) => raw
                .trim()
                .parse::<IpAddr>()
                .map_err(|_| ConfigError::InvalidHost(raw))?,
            None => defaults.host,
        };
        let port = match get("PORT") {
            Some(raw) => parse_port(&raw)?,
            None => defaults.port,
        };

        Ok(Self {
            host,
            port,
            database_url: get("COACHTRACK_DB_URL").unwrap_or(defaults.database_url),
            public_dir: get("COACHTRACK_PUBLIC_DIR").map_or(defaults.public_dir, PathBuf::from),
            cors: CorsConfig {
                allowed_origins: get("CORS_ALLOWED_ORIGINS")
                    .unwrap_or(defaults.cors.allowed_origins),
            },
        })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Parse a TCP port; zero is rejected.
///
/// # Errors
///
/// Returns `ConfigError::InvalidPort` for anything outside `1..=65535`.
pub fn parse_port(raw: &str) -> Result<u16, ConfigError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(raw.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("COACHTRACK_HOST", "127.0.0.1"),
            ("COACHTRACK_DB_URL", "sqlite://other.db"),
            ("COACHTRACK_PUBLIC_DIR", "/srv/www"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example"),
        ]))
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8080");
        assert_eq!(config.database_url, "sqlite://other.db");
        assert_eq!(config.public_dir, PathBuf::from("/srv/www"));
        assert_eq!(config.cors.allowed_origins, "https://a.example");
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn bad_port_and_host_are_errors() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err(),
            ConfigError::InvalidPort("http".into())
        );
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(matches!(
            ServerConfig::from_lookup(lookup(&[("COACHTRACK_HOST", "localhost:1")])),
            Err(ConfigError::InvalidHost(_))
        ));
    }
}
