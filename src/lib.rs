//! # form-relay
//!
//! Accepts POSTed form submissions and forwards them, unchanged, as JSON to a
//! single destination webhook configured through `GHL_WEBHOOK_URL`. The
//! destination's failure responses are relayed back to the caller verbatim;
//! a success is acknowledged with a fixed message.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP client                      API Gateway / Netlify
//!        │                                    │
//!        ▼                                    ▼
//! ┌──────────────┐                 ┌────────────────────┐
//! │ RelayServer  │                 │ handle_gateway_    │
//! │ (hyper host) │                 │ event (lambda host)│
//! └──────┬───────┘                 └─────────┬──────────┘
//!        └────────────► dispatch ◄───────────┘
//!                          │
//!                          ▼
//!                 ┌─────────────────┐      POST JSON     ┌─────────────┐
//!                 │    Forwarder    │ ─────────────────► │ destination │
//!                 └─────────────────┘                    └─────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use form_relay::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let forwarder = Forwarder::new(RelayConfig::from_env())?;
//!     RelayServer::new(ServerConfig::from_env(), Arc::new(forwarder))
//!         .run()
//!         .await
//! }
//! ```

pub mod adapters;
pub mod forwarder;
pub mod http;
pub mod runtime;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::adapters::{handle_gateway_event, GatewayEvent, GatewayResponse};
    pub use crate::forwarder::{
        dispatch, ForwardError, Forwarder, FunctionContext, RelayConfig, RelayFunction,
    };
    pub use crate::http::{Method, Payload, RelayRequest, RelayResponse, StatusCode};
    pub use crate::runtime::{RelayServer, ServerConfig};
    pub use async_trait::async_trait;
}

pub use forwarder::{ForwardError, Forwarder, RelayConfig};
pub use http::{RelayRequest, RelayResponse};
pub use runtime::{RelayServer, ServerConfig};
