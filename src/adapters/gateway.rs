//! API-Gateway style events, as delivered to Lambda and Netlify functions.
//!
//! Hosts of this kind hand over the whole request as one JSON document and
//! expect one back. The body may arrive as a string (possibly base64) or, for
//! direct invocations, as an already decoded JSON value.

use crate::forwarder::{dispatch, ForwardError, FunctionContext, RelayFunction};
use crate::http::{Method, Payload, RelayRequest, RelayResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use tracing::error;

/// Inbound gateway event. Both REST (v1) and HTTP API (v2) shapes are accepted.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayEvent {
    #[serde(default)]
    pub http_method: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub raw_path: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

/// Gateways send `null` rather than omitting fields that carry no value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    #[serde(default)]
    pub http: Option<HttpDescription>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpDescription {
    #[serde(default)]
    pub method: Option<String>,
}

/// Outbound gateway response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
    pub is_base64_encoded: bool,
}

impl GatewayEvent {
    /// Verb of the request, looking at the v1 field first.
    pub fn method(&self) -> Method {
        let verb = self.http_method.as_deref().or_else(|| {
            self.request_context
                .as_ref()
                .and_then(|ctx| ctx.http.as_ref())
                .and_then(|http| http.method.as_deref())
        });
        Method::from(verb.unwrap_or_default())
    }

    /// Convert into a transport-agnostic request.
    ///
    /// # Errors
    ///
    /// Returns `ForwardError::InvalidPayload` when a base64 body does not decode.
    pub fn into_request(self) -> Result<RelayRequest, ForwardError> {
        let method = self.method();
        let url = self
            .path
            .or(self.raw_path)
            .unwrap_or_else(|| "/".to_string());

        let body = match self.body {
            None | Some(Value::Null) => Payload::Empty,
            Some(Value::String(text)) if text.is_empty() => Payload::Empty,
            Some(Value::String(text)) if self.is_base64_encoded => {
                let decoded = STANDARD.decode(text.as_bytes()).map_err(|e| {
                    ForwardError::InvalidPayload {
                        message: format!("body is not valid base64: {e}"),
                    }
                })?;
                Payload::Raw(decoded.into())
            }
            Some(Value::String(text)) => Payload::Raw(text.into()),
            Some(value) => Payload::Json(value),
        };

        let headers = self
            .headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();

        Ok(RelayRequest {
            method,
            url,
            headers,
            body,
        })
    }
}

impl From<RelayResponse> for GatewayResponse {
    fn from(response: RelayResponse) -> Self {
        let bytes = response.body.unwrap_or_default();
        let (body, is_base64_encoded) = match std::str::from_utf8(&bytes) {
            Ok(text) => (text.to_string(), false),
            Err(_) => (STANDARD.encode(&bytes), true),
        };

        Self {
            status_code: response.status.0,
            headers: response.headers,
            body,
            is_base64_encoded,
        }
    }
}

/// Run `function` for one gateway event and produce the gateway response.
pub async fn handle_gateway_event(
    function: &dyn RelayFunction,
    event: GatewayEvent,
    request_id: &str,
) -> GatewayResponse {
    let ctx = FunctionContext::new(function.name(), request_id);

    let response = match event.into_request() {
        Ok(request) => dispatch(function, request, &ctx).await,
        Err(err) => {
            error!(request_id = %ctx.request_id, "Rejected gateway event: {}", err);
            RelayResponse::from(err)
        }
    };

    response.into()
}
