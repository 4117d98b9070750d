//! Error taxonomy for the forward-and-relay flow.
//!
//! Every step of the forwarder returns one of these. The caller only ever
//! sees the response built by `From<ForwardError> for RelayResponse`, which
//! relays upstream failures verbatim and hides every other detail behind a
//! fixed message.

use crate::http::{BodyError, Method, RelayResponse, StatusCode};
use bytes::Bytes;
use thiserror::Error;

/// Result type alias for forwarder operations.
pub type Result<T> = std::result::Result<T, ForwardError>;

pub const METHOD_NOT_ALLOWED_MESSAGE: &str = "Method Not Allowed";
pub const CONFIGURATION_ERROR_MESSAGE: &str = "Server configuration error.";
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred.";
pub const TIMEOUT_MESSAGE: &str = "The destination did not respond in time.";

/// Failure kinds of a single forward attempt.
#[derive(Debug, Clone, Error)]
pub enum ForwardError {
    /// Inbound request used a verb other than POST.
    #[error("method {method} is not allowed")]
    MethodNotAllowed {
        /// Verb the caller used
        method: Method,
    },

    /// Destination URL is missing or unusable.
    #[error("server misconfigured: {message}")]
    Configuration {
        /// What is wrong with the configuration
        message: String,
    },

    /// Destination answered with a non-2xx status.
    #[error("destination returned HTTP {status}")]
    Upstream {
        /// Status code returned by the destination
        status: u16,
        /// Content type the destination declared, if any
        content_type: Option<String>,
        /// Raw response body
        body: Bytes,
    },

    /// Destination did not answer within the configured timeout.
    #[error("destination timed out after {timeout_seconds}s")]
    Timeout {
        /// Configured timeout
        timeout_seconds: u64,
    },

    /// Destination could not be reached.
    #[error("network failure reaching destination: {message}")]
    Network {
        /// Underlying transport error
        message: String,
    },

    /// Inbound body could not be turned into JSON.
    #[error("invalid inbound payload: {message}")]
    InvalidPayload {
        /// Parse failure detail
        message: String,
    },

    /// Anything else.
    #[error("internal error: {message}")]
    Internal {
        /// Error detail, never sent to the caller
        message: String,
    },
}

impl ForwardError {
    pub fn method_not_allowed(method: Method) -> Self {
        Self::MethodNotAllowed { method }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn upstream(status: u16, content_type: Option<String>, body: impl Into<Bytes>) -> Self {
        Self::Upstream {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn timeout(timeout_seconds: u64) -> Self {
        Self::Timeout { timeout_seconds }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether this error belongs to the generic internal-error family.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::InvalidPayload { .. } | Self::Internal { .. }
        )
    }

    /// Status code the caller receives for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::Upstream { status, .. } => StatusCode(*status),
            Self::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::Configuration { .. }
            | Self::Network { .. }
            | Self::InvalidPayload { .. }
            | Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BodyError> for ForwardError {
    fn from(err: BodyError) -> Self {
        Self::InvalidPayload {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ForwardError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(err.to_string())
    }
}

impl From<ForwardError> for RelayResponse {
    fn from(err: ForwardError) -> Self {
        let status = err.status();
        match err {
            ForwardError::MethodNotAllowed { .. } => {
                RelayResponse::message(status, METHOD_NOT_ALLOWED_MESSAGE)
            }
            ForwardError::Configuration { .. } => {
                RelayResponse::message(status, CONFIGURATION_ERROR_MESSAGE)
            }
            ForwardError::Upstream {
                content_type, body, ..
            } => {
                // JSON bodies go back byte for byte; anything else is relayed as text.
                let content_type = if serde_json::from_slice::<serde_json::Value>(&body).is_ok() {
                    "application/json".to_string()
                } else {
                    content_type.unwrap_or_else(|| "text/plain".to_string())
                };
                RelayResponse::new(status)
                    .header("Content-Type", content_type)
                    .body(body)
            }
            ForwardError::Timeout { .. } => RelayResponse::message(status, TIMEOUT_MESSAGE),
            ForwardError::Network { .. }
            | ForwardError::InvalidPayload { .. }
            | ForwardError::Internal { .. } => {
                RelayResponse::message(status, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_family_identified() {
        assert!(ForwardError::network("connection refused").is_internal());
        assert!(ForwardError::internal("boom").is_internal());
        assert!(ForwardError::from(BodyError::Empty).is_internal());

        assert!(!ForwardError::configuration("missing").is_internal());
        assert!(!ForwardError::timeout(30).is_internal());
        assert!(!ForwardError::upstream(400, None, "{}").is_internal());
        assert!(!ForwardError::method_not_allowed(Method::Get).is_internal());
    }

    #[test]
    fn internal_errors_hide_detail() {
        let response: RelayResponse =
            ForwardError::network("dns lookup failed for hooks.example").into();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.text_body(),
            Some(r#"{"message":"An internal error occurred."}"#.to_string())
        );
    }

    #[test]
    fn configuration_error_hides_detail() {
        let response: RelayResponse =
            ForwardError::configuration("GHL_WEBHOOK_URL is not set").into();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.text_body(),
            Some(r#"{"message":"Server configuration error."}"#.to_string())
        );
    }

    #[test]
    fn upstream_json_relayed_verbatim() {
        let response: RelayResponse =
            ForwardError::upstream(422, Some("application/json".into()), r#"{"error":"bad field"}"#)
                .into();

        assert_eq!(response.status, StatusCode(422));
        assert_eq!(response.text_body(), Some(r#"{"error":"bad field"}"#.to_string()));
        assert_eq!(
            response.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
    }

    #[test]
    fn upstream_text_relayed_with_its_content_type() {
        let response: RelayResponse =
            ForwardError::upstream(503, Some("text/html".into()), "<h1>Down</h1>").into();
        assert_eq!(response.status, StatusCode(503));
        assert_eq!(response.text_body(), Some("<h1>Down</h1>".to_string()));
        assert_eq!(response.headers.get("Content-Type"), Some(&"text/html".to_string()));

        let untyped: RelayResponse = ForwardError::upstream(500, None, "oops").into();
        assert_eq!(untyped.headers.get("Content-Type"), Some(&"text/plain".to_string()));
    }

    #[test]
    fn error_display_format() {
        assert_eq!(
            ForwardError::timeout(30).to_string(),
            "destination timed out after 30s"
        );
        assert_eq!(
            ForwardError::method_not_allowed(Method::Put).to_string(),
            "method PUT is not allowed"
        );
    }
}
