//! Relay HTTP request type providing a fetch-like API.

use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// HTTP method enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Method {
    #[default]
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Options,
    /// Any verb the relay has no dedicated variant for.
    Other(String),
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
            Method::Put => write!(f, "PUT"),
            Method::Delete => write!(f, "DELETE"),
            Method::Patch => write!(f, "PATCH"),
            Method::Head => write!(f, "HEAD"),
            Method::Options => write!(f, "OPTIONS"),
            Method::Other(verb) => write!(f, "{}", verb),
        }
    }
}

impl From<&str> for Method {
    fn from(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            other => Method::Other(other.to_string()),
        }
    }
}

impl From<&hyper::Method> for Method {
    fn from(method: &hyper::Method) -> Self {
        Method::from(method.as_str())
    }
}

/// Body of an inbound request as the transport handed it over.
///
/// Some hosts deliver the body already decoded into JSON, others deliver the
/// raw bytes. Both shapes are accepted so the forwarder stays transport-agnostic.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Payload {
    #[default]
    Empty,
    /// Undecoded body bytes.
    Raw(Bytes),
    /// Body already decoded by the transport.
    Json(Value),
}

/// Failure to obtain a JSON value from a request body.
#[derive(Debug, Error)]
pub enum BodyError {
    #[error("request body is empty")]
    Empty,

    #[error("request body is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Fetch-like HTTP request handed to relay functions.
#[derive(Debug, Clone)]
pub struct RelayRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub url: String,
    /// HTTP headers, keyed by lowercase name.
    pub headers: HashMap<String, String>,
    /// Request body.
    pub body: Payload,
}

impl RelayRequest {
    /// Create a new RelayRequest.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HashMap::new(),
            body: Payload::Empty,
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Set a raw request body.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Payload::Raw(body.into());
        self
    }

    /// Set a body that the transport has already decoded.
    pub fn json(mut self, value: Value) -> Self {
        self.body = Payload::Json(value);
        self
    }

    /// Get a header value. Lookup is case-insensitive.
    pub fn get_header(&self, key: &str) -> Option<&String> {
        self.headers.get(&key.to_ascii_lowercase())
    }

    /// Resolve the body to a JSON value.
    ///
    /// A pre-decoded body is returned as is; raw bytes are parsed.
    pub fn json_body(&self) -> Result<Value, BodyError> {
        match &self.body {
            Payload::Json(value) => Ok(value.clone()),
            Payload::Raw(bytes) => Ok(serde_json::from_slice(bytes)?),
            Payload::Empty => Err(BodyError::Empty),
        }
    }
}

impl Default for RelayRequest {
    fn default() -> Self {
        Self::new(Method::Get, "/")
    }
}
