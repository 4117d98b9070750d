//! Relay host configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the HTTP relay host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Whether to answer `GET /_health`.
    pub enable_health: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            enable_health: true,
            max_body_size: 1024 * 1024, // 1MB
        }
    }
}

impl ServerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the host address.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Toggle the `GET /_health` endpoint.
    pub fn health(mut self, enabled: bool) -> Self {
        self.enable_health = enabled;
        self
    }

    /// Set the maximum accepted body size.
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Load `RELAY_HOST`, `RELAY_PORT` and `RELAY_MAX_BODY_BYTES` from the environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(host) = lookup("RELAY_HOST").filter(|h| !h.trim().is_empty()) {
            config.host = host;
        }
        if let Some(port) = lookup("RELAY_PORT").and_then(|p| p.trim().parse().ok()) {
            config.port = port;
        }
        if let Some(max) = lookup("RELAY_MAX_BODY_BYTES").and_then(|m| m.trim().parse().ok()) {
            config.max_body_size = max;
        }
        config
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup_overrides_defaults() {
        let config = ServerConfig::from_lookup(|key| match key {
            "RELAY_HOST" => Some("127.0.0.1".to_string()),
            "RELAY_PORT" => Some("3000".to_string()),
            "RELAY_MAX_BODY_BYTES" => Some("oops".to_string()),
            _ => None,
        });

        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.max_body_size, ServerConfig::default().max_body_size);
    }
}
