//! The forwarder: validate, forward to the destination webhook, translate the outcome.

pub mod client;
pub mod config;
pub mod error;
pub mod handler;

pub use client::{HttpWebhookClient, UpstreamResponse, WebhookClient};
pub use config::RelayConfig;
pub use error::ForwardError;
pub use handler::{dispatch, Forwarder, FunctionContext, RelayFunction};
