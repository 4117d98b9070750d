//! Outbound HTTP client for posting payloads to the destination webhook.

use crate::forwarder::config::RelayConfig;
use crate::forwarder::error::{ForwardError, Result};
use crate::http::StatusCode;
use async_trait::async_trait;
use bytes::Bytes;
use std::time::{Duration, Instant};
use tracing::{debug, info_span, warn, Instrument};
use url::Url;

/// Response received from the destination.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
    /// HTTP status code.
    pub status: u16,
    /// Declared content type, if any.
    pub content_type: Option<String>,
    /// Raw response body.
    pub body: Bytes,
}

impl UpstreamResponse {
    /// Whether the destination accepted the payload (2xx).
    pub fn is_success(&self) -> bool {
        StatusCode(self.status).is_success()
    }
}

/// Posts a JSON document to a destination URL.
///
/// Implementations make exactly one attempt and map transport failures onto
/// `ForwardError::Timeout` or `ForwardError::Network`. Any HTTP status,
/// including failures, comes back as an `UpstreamResponse`.
#[async_trait]
pub trait WebhookClient: Send + Sync {
    async fn post_json(&self, url: &Url, body: Bytes) -> Result<UpstreamResponse>;
}

/// `WebhookClient` backed by a pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpWebhookClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpWebhookClient {
    /// Build a client honoring the timeout, user agent and redirect limit in `config`.
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::Configuration` if the TLS backend or the client
    /// builder rejects the settings.
    pub fn new(config: &RelayConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| ForwardError::configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn post_json(&self, url: &Url, body: Bytes) -> Result<UpstreamResponse> {
        let start_time = Instant::now();
        let span = info_span!("webhook_post", host = url.host_str().unwrap_or_default());

        async move {
            let response = self
                .client
                .post(url.clone())
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await
                .map_err(|e| {
                    warn!(duration_ms = start_time.elapsed().as_millis(), "Request failed: {}", e);
                    if e.is_timeout() {
                        ForwardError::timeout(self.timeout.as_secs())
                    } else if e.is_connect() {
                        ForwardError::network(format!("connection failed: {e}"))
                    } else {
                        ForwardError::network(e.to_string())
                    }
                })?;

            let status = response.status().as_u16();
            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            let body = response.bytes().await.map_err(|e| {
                if e.is_timeout() {
                    ForwardError::timeout(self.timeout.as_secs())
                } else {
                    ForwardError::network(format!("failed to read response body: {e}"))
                }
            })?;

            debug!(
                status,
                duration_ms = start_time.elapsed().as_millis(),
                "Received destination response"
            );

            Ok(UpstreamResponse {
                status,
                content_type,
                body,
            })
        }
        .instrument(span)
        .await
    }
}
