//! Relay HTTP server implementation.

use crate::forwarder::{dispatch, FunctionContext, RelayFunction};
use crate::http::{Method, Payload, RelayRequest, RelayResponse, StatusCode};
use crate::runtime::ServerConfig;
use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// HTTP host for a single relay function.
///
/// Every path except the health endpoint is handed to the function.
pub struct RelayServer {
    /// Server configuration.
    config: ServerConfig,
    /// Function serving every request.
    function: Arc<dyn RelayFunction>,
}

impl RelayServer {
    /// Create a new relay server.
    pub fn new(config: ServerConfig, function: Arc<dyn RelayFunction>) -> Self {
        Self { config, function }
    }

    /// Bind the configured address and serve until the process exits.
    ///
    /// The host may be a name such as `localhost`; it is resolved at bind time.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve connections from an already bound listener.
    pub async fn serve(
        self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        info!(
            "Relay server listening on {} (function: {})",
            listener.local_addr()?,
            self.function.name()
        );

        let function = self.function.clone();
        let config = Arc::new(self.config);

        loop {
            let (stream, remote_addr) = listener.accept().await?;
            let io = TokioIo::new(stream);

            let function = function.clone();
            let config = config.clone();

            tokio::task::spawn(async move {
                let service = service_fn(move |req| {
                    let function = function.clone();
                    let config = config.clone();
                    async move { handle_request(req, function, config, remote_addr).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!("Error serving connection: {:?}", err);
                }
            });
        }
    }
}

/// Handle an incoming HTTP request.
async fn handle_request(
    req: Request<Incoming>,
    function: Arc<dyn RelayFunction>,
    config: Arc<ServerConfig>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let path = req.uri().path().to_string();
    let method = req.method().clone();
    let request_id = generate_request_id();

    debug!(
        "Handling request: {} {} from {} [{}]",
        method, path, remote_addr, request_id
    );

    if config.enable_health && method == hyper::Method::GET && path == "/_health" {
        return Ok(build_response(RelayResponse::text("OK")));
    }

    let relay_request = match convert_request(req, &config).await {
        Ok(req) => req,
        Err(e) => {
            warn!("Failed to read request body: {} [{}]", e, request_id);
            let response = if e.is::<LengthLimitError>() {
                RelayResponse::message(StatusCode::PAYLOAD_TOO_LARGE, "Payload Too Large")
            } else {
                RelayResponse::message(StatusCode::BAD_REQUEST, "Bad Request")
            };
            return Ok(build_response(response));
        }
    };

    let ctx = FunctionContext::new(function.name(), request_id);
    Ok(build_response(
        dispatch(function.as_ref(), relay_request, &ctx).await,
    ))
}

/// Convert a hyper Request to RelayRequest, enforcing the body size limit.
async fn convert_request(
    req: Request<Incoming>,
    config: &ServerConfig,
) -> Result<RelayRequest, Box<dyn std::error::Error + Send + Sync>> {
    let method = Method::from(req.method());
    let url = req.uri().path().to_string();

    let mut headers = HashMap::new();
    for (name, value) in req.headers() {
        if let Ok(v) = value.to_str() {
            headers.insert(name.as_str().to_string(), v.to_string());
        }
    }

    let body_bytes = Limited::new(req.into_body(), config.max_body_size)
        .collect()
        .await?
        .to_bytes();
    let body = if body_bytes.is_empty() {
        Payload::Empty
    } else {
        Payload::Raw(body_bytes)
    };

    Ok(RelayRequest {
        method,
        url,
        headers,
        body,
    })
}

/// Build a hyper Response from RelayResponse.
fn build_response(relay_response: RelayResponse) -> Response<Full<Bytes>> {
    let status = hyper::StatusCode::from_u16(relay_response.status.0).unwrap_or_else(|_| {
        warn!(
            "Invalid status code {}, falling back to 502 Bad Gateway",
            relay_response.status.0
        );
        hyper::StatusCode::BAD_GATEWAY
    });

    let mut builder = Response::builder().status(status);
    for (name, value) in &relay_response.headers {
        builder = builder.header(name, value);
    }

    let body = relay_response.body.clone().unwrap_or_default();
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        error!("Failed to build response: {}", e);
        internal_error_response()
    })
}

/// Generic 500 used when a relay response cannot be turned into a hyper one.
fn internal_error_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        br#"{"message":"An internal error occurred."}"#,
    )));
    *response.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    response
}

/// Generate a unique request ID.
fn generate_request_id() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{:x}", timestamp)
}
