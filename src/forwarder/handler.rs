//! Relay function trait, the forwarder implementation, and the response boundary.

use crate::forwarder::client::{HttpWebhookClient, WebhookClient};
use crate::forwarder::config::RelayConfig;
use crate::forwarder::error::{ForwardError, Result};
use crate::http::{Method, RelayRequest, RelayResponse, StatusCode};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

pub const SUCCESS_MESSAGE: &str = "Successfully forwarded to GHL";

/// Execution context for a single invocation.
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    /// Function name.
    pub function_name: String,
    /// Request ID for tracing.
    pub request_id: String,
}

impl FunctionContext {
    /// Create a new function context.
    pub fn new(function_name: impl Into<String>, request_id: impl Into<String>) -> Self {
        Self {
            function_name: function_name.into(),
            request_id: request_id.into(),
        }
    }
}

/// A request handler that hosts can mount behind any transport.
///
/// Implementations report failures as `ForwardError`; hosts never build error
/// responses themselves and instead go through [`dispatch`].
#[async_trait]
pub trait RelayFunction: Send + Sync {
    /// Handle an incoming HTTP request.
    async fn fetch(&self, request: RelayRequest, ctx: &FunctionContext) -> Result<RelayResponse>;

    /// Get the function name.
    fn name(&self) -> &str;
}

/// Forwards POSTed JSON to the configured destination webhook.
pub struct Forwarder {
    config: RelayConfig,
    client: Arc<dyn WebhookClient>,
}

impl Forwarder {
    /// Create a forwarder that posts through a reqwest-backed client.
    pub fn new(config: RelayConfig) -> Result<Self> {
        let client = HttpWebhookClient::new(&config)?;
        Ok(Self::with_client(config, Arc::new(client)))
    }

    /// Create a forwarder with a caller-supplied outbound client.
    pub fn with_client(config: RelayConfig, client: Arc<dyn WebhookClient>) -> Self {
        Self { config, client }
    }

    /// Run the check-then-forward flow for one request.
    ///
    /// Returns `Ok(())` only when the destination answered 2xx. Method and
    /// configuration are checked before the body is touched, so neither a
    /// wrong verb nor a missing destination ever reaches the network.
    pub async fn forward(&self, request: &RelayRequest) -> Result<()> {
        if request.method != Method::Post {
            return Err(ForwardError::method_not_allowed(request.method.clone()));
        }

        let url = self.config.destination_url()?;
        let payload = request.json_body()?;
        let body = serde_json::to_vec(&payload)?;

        let upstream = self.client.post_json(&url, body.into()).await?;
        if !upstream.is_success() {
            return Err(ForwardError::upstream(
                upstream.status,
                upstream.content_type,
                upstream.body,
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl RelayFunction for Forwarder {
    async fn fetch(&self, request: RelayRequest, ctx: &FunctionContext) -> Result<RelayResponse> {
        let start_time = Instant::now();
        self.forward(&request).await?;

        info!(
            request_id = %ctx.request_id,
            duration_ms = start_time.elapsed().as_millis(),
            "Forwarded submission to destination"
        );
        Ok(RelayResponse::message(StatusCode::OK, SUCCESS_MESSAGE))
    }

    fn name(&self) -> &str {
        "forwarder"
    }
}

/// Run a function and turn its outcome into the response sent to the caller.
///
/// This is the single place where failures are logged and translated.
pub async fn dispatch(
    function: &dyn RelayFunction,
    request: RelayRequest,
    ctx: &FunctionContext,
) -> RelayResponse {
    match function.fetch(request, ctx).await {
        Ok(response) => response,
        Err(err) => {
            log_failure(&err, ctx);
            err.into()
        }
    }
}

fn log_failure(err: &ForwardError, ctx: &FunctionContext) {
    match err {
        ForwardError::MethodNotAllowed { method } => {
            debug!(request_id = %ctx.request_id, %method, "Rejected non-POST request");
        }
        ForwardError::Upstream { status, body, .. } => {
            warn!(
                request_id = %ctx.request_id,
                status,
                body = %String::from_utf8_lossy(body),
                "Error from destination"
            );
        }
        ForwardError::Configuration { message } => {
            error!(request_id = %ctx.request_id, "{}", message);
        }
        other => {
            error!(
                request_id = %ctx.request_id,
                function = %ctx.function_name,
                "Error in relay function: {}",
                other
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forwarder::client::UpstreamResponse;
    use bytes::Bytes;
    use serde_json::{json, Value};
    use std::sync::Mutex;
    use url::Url;

    /// Records every outbound call and answers with a canned outcome.
    struct RecordingClient {
        outcome: Result<UpstreamResponse>,
        calls: Mutex<Vec<(Url, Bytes)>>,
    }

    impl RecordingClient {
        fn responding(status: u16, body: &str) -> Arc<Self> {
            Arc::new(Self {
                outcome: Ok(UpstreamResponse {
                    status,
                    content_type: Some("application/json".to_string()),
                    body: Bytes::from(body.to_string()),
                }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(err: ForwardError) -> Arc<Self> {
            Arc::new(Self {
                outcome: Err(err),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(Url, Bytes)> {
            self.calls.lock().expect("poisoned mutex").clone()
        }
    }

    #[async_trait]
    impl WebhookClient for RecordingClient {
        async fn post_json(&self, url: &Url, body: Bytes) -> Result<UpstreamResponse> {
            self.calls
                .lock()
                .expect("poisoned mutex")
                .push((url.clone(), body));
            self.outcome.clone()
        }
    }

    fn configured() -> RelayConfig {
        RelayConfig::new().destination("https://hooks.example.com/form")
    }

    fn ctx() -> FunctionContext {
        FunctionContext::new("forwarder", "req-1")
    }

    fn message_of(response: &RelayResponse) -> String {
        let body: Value = response.json_body().unwrap().unwrap();
        body["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn non_post_methods_are_rejected_without_forwarding() {
        let client = RecordingClient::responding(200, "{}");
        let forwarder = Forwarder::with_client(configured(), client.clone());

        for method in [Method::Get, Method::Put, Method::Delete, Method::Other("TRACE".into())] {
            let request = RelayRequest::new(method, "/").body(r#"{"name":"Ada"}"#);
            let response = dispatch(&forwarder, request, &ctx()).await;

            assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
            assert_eq!(message_of(&response), "Method Not Allowed");
        }
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_destination_skips_outbound_call() {
        let client = RecordingClient::responding(200, "{}");
        let forwarder = Forwarder::with_client(RelayConfig::new(), client.clone());

        let request = RelayRequest::new(Method::Post, "/").json(json!({"name": "Ada"}));
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_of(&response), "Server configuration error.");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn success_forwards_payload_unchanged() {
        let client = RecordingClient::responding(201, r#"{"id":"contact-9"}"#);
        let forwarder = Forwarder::with_client(configured(), client.clone());
        let payload = json!({"firstName": "Ada", "email": "ada@example.com", "consent": true});

        let request = RelayRequest::new(Method::Post, "/api/submit-form").json(payload.clone());
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(message_of(&response), SUCCESS_MESSAGE);

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.as_str(), "https://hooks.example.com/form");
        let forwarded: Value = serde_json::from_slice(&calls[0].1).unwrap();
        assert_eq!(forwarded, payload);
    }

    #[tokio::test]
    async fn raw_body_keeps_field_order() {
        let client = RecordingClient::responding(200, "{}");
        let forwarder = Forwarder::with_client(configured(), client.clone());
        let raw = r#"{"zeta":1,"alpha":2,"mid":{"b":1,"a":2}}"#;

        let request = RelayRequest::new(Method::Post, "/").body(raw);
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(client.calls()[0].1, Bytes::from(raw));
    }

    #[tokio::test]
    async fn upstream_failure_is_relayed_verbatim() {
        let client = RecordingClient::responding(400, r#"{"error":"bad field"}"#);
        let forwarder = Forwarder::with_client(configured(), client);

        let request = RelayRequest::new(Method::Post, "/").json(json!({"email": ""}));
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode(400));
        assert_eq!(response.text_body(), Some(r#"{"error":"bad field"}"#.to_string()));
    }

    #[tokio::test]
    async fn network_failure_is_generic_internal_error() {
        let client = RecordingClient::failing(ForwardError::network("connection refused"));
        let forwarder = Forwarder::with_client(configured(), client);

        let request = RelayRequest::new(Method::Post, "/").json(json!({}));
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_of(&response), "An internal error occurred.");
    }

    #[tokio::test]
    async fn timeout_maps_to_gateway_timeout() {
        let client = RecordingClient::failing(ForwardError::timeout(30));
        let forwarder = Forwarder::with_client(configured(), client);

        let request = RelayRequest::new(Method::Post, "/").json(json!({}));
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode::GATEWAY_TIMEOUT);
    }

    #[tokio::test]
    async fn malformed_body_is_internal_error_and_not_forwarded() {
        let client = RecordingClient::responding(200, "{}");
        let forwarder = Forwarder::with_client(configured(), client.clone());

        let request = RelayRequest::new(Method::Post, "/").body("firstName=Ada");
        let response = dispatch(&forwarder, request, &ctx()).await;

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message_of(&response), "An internal error occurred.");
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn repeated_submissions_are_forwarded_each_time() {
        let client = RecordingClient::responding(200, "{}");
        let forwarder = Forwarder::with_client(configured(), client.clone());
        let payload = json!({"email": "ada@example.com"});

        for _ in 0..2 {
            let request = RelayRequest::new(Method::Post, "/").json(payload.clone());
            let response = dispatch(&forwarder, request, &ctx()).await;
            assert_eq!(response.status, StatusCode::OK);
        }

        let calls = client.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, calls[1].1);
    }
}
