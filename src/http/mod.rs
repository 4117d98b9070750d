//! HTTP types for relay functions providing a fetch-like API.

mod request;
mod response;

pub use request::{BodyError, Method, Payload, RelayRequest};
pub use response::{RelayResponse, StatusCode};
