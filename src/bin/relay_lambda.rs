//! form-relay function host for API Gateway and Netlify-style runtimes.

use form_relay::adapters::{handle_gateway_event, GatewayEvent, GatewayResponse};
use form_relay::{Forwarder, RelayConfig};
use lambda_runtime::{service_fn, Error, LambdaEvent};
use std::sync::Arc;

async fn handle_request(
    forwarder: Arc<Forwarder>,
    event: LambdaEvent<GatewayEvent>,
) -> Result<GatewayResponse, Error> {
    Ok(handle_gateway_event(forwarder.as_ref(), event.payload, &event.context.request_id).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    form_relay::runtime::init_tracing();

    let forwarder = Arc::new(Forwarder::new(RelayConfig::from_env())?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<GatewayEvent>| {
        handle_request(forwarder.clone(), event)
    }))
    .await
}
