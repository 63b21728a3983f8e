use std::env;
use std::net::SocketAddr;

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_TILE_BASE_URL: &str = "https://tiles.example.com";

const BIND_ADDR_VAR: &str = "DECISION_BIND_ADDR";
const TILE_BASE_URL_VAR: &str = "DECISION_TILE_BASE_URL";

/// Server settings loaded from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen address, e.g. `127.0.0.1:8080`.
    pub bind_addr: SocketAddr,
    /// Tile CDN root; layer URLs are `{root}/{layer}/{z}/{x}/{y}.pbf`.
    pub tile_base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid bind address in {var}: {value}")]
    InvalidBindAddr { var: &'static str, value: String },
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let raw_addr = read(BIND_ADDR_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw_addr
            .trim()
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: raw_addr.clone(),
            })?;

        Ok(Self {
            bind_addr,
            tile_base_url: read(TILE_BASE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_TILE_BASE_URL.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_unset_or_blank() {
        let config = ServerConfig::from_lookup(lookup(&[(TILE_BASE_URL_VAR, "  ")]))
            .expect("defaults parse");
        assert_eq!(config.bind_addr.to_string(), DEFAULT_BIND_ADDR);
        assert_eq!(config.tile_base_url, DEFAULT_TILE_BASE_URL);
    }

    #[test]
    fn overrides_are_read() {
        let config = ServerConfig::from_lookup(lookup(&[
            (BIND_ADDR_VAR, "0.0.0.0:9000"),
            (TILE_BASE_URL_VAR, "https://cdn.test/tiles"),
        ]))
        .expect("overrides parse");
        assert_eq!(config.bind_addr.port(), 9000);
        assert_eq!(config.tile_base_url, "https://cdn.test/tiles");
    }

    #[test]
    fn malformed_bind_addr_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[(BIND_ADDR_VAR, "localhost")]))
            .expect_err("hostnames are not socket addrs");
        assert_eq!(
            err,
            ConfigError::InvalidBindAddr {
                var: BIND_ADDR_VAR,
                value: "localhost".to_string(),
            }
        );
    }
}
