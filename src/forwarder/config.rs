//! Forwarder configuration.

use crate::forwarder::error::{ForwardError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Environment key holding the destination webhook URL.
pub const WEBHOOK_URL_ENV: &str = "GHL_WEBHOOK_URL";
/// Environment key holding the outbound timeout in seconds.
pub const TIMEOUT_ENV: &str = "FORWARD_TIMEOUT_SECS";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Configuration for the forwarder, built once at startup.
///
/// A missing destination is not a startup failure: every request answers with
/// a configuration error until the deployment is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Destination webhook URL, as configured.
    pub destination_url: Option<String>,
    /// Upper bound on the outbound call.
    pub timeout: Duration,
    /// User agent sent to the destination.
    pub user_agent: String,
    /// Maximum number of redirects followed on the outbound call.
    pub max_redirects: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            destination_url: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            user_agent: concat!("form-relay/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 3,
        }
    }
}

impl RelayConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the destination webhook URL.
    pub fn destination(mut self, url: impl Into<String>) -> Self {
        self.destination_url = Some(url.into());
        self
    }

    /// Set the outbound timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load the config from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self {
            destination_url: lookup(WEBHOOK_URL_ENV),
            ..Self::default()
        };

        if let Some(raw) = lookup(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => warn!(
                    "Ignoring invalid {}={:?}, using {}s",
                    TIMEOUT_ENV, raw, DEFAULT_TIMEOUT_SECS
                ),
            }
        }

        config
    }

    /// Resolve the destination URL, rejecting absent, empty or non-HTTP values.
    pub fn destination_url(&self) -> Result<Url> {
        let raw = self
            .destination_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ForwardError::configuration(format!("{} environment variable not set", WEBHOOK_URL_ENV))
            })?;

        let url = Url::parse(raw).map_err(|e| {
            ForwardError::configuration(format!("{} is not a valid URL: {}", WEBHOOK_URL_ENV, e))
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(ForwardError::configuration(format!(
                "{} must use http or https, got {}",
                WEBHOOK_URL_ENV, scheme
            ))),
        }
    }
}
