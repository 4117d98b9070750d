//! Transport adapters for hosts that do not speak plain HTTP to the process.

pub mod gateway;

pub use gateway::{handle_gateway_event, GatewayEvent, GatewayResponse};
