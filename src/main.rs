//! form-relay HTTP host.
//!
//! Serves the forwarder on `RELAY_HOST:RELAY_PORT`, posting every accepted
//! submission to `GHL_WEBHOOK_URL`.

use form_relay::forwarder::config::WEBHOOK_URL_ENV;
use form_relay::prelude::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    form_relay::runtime::init_tracing();

    let relay_config = RelayConfig::from_env();
    if let Err(e) = relay_config.destination_url() {
        // Not fatal: requests answer with a configuration error until this is fixed.
        tracing::warn!("{} is unusable at startup: {}", WEBHOOK_URL_ENV, e);
    }

    let forwarder = Forwarder::new(relay_config)?;
    let server_config = ServerConfig::from_env();

    tracing::info!("Starting form-relay on {}", server_config.bind_addr());
    tracing::info!(
        "Try: curl -X POST -H 'Content-Type: application/json' -d '{{\"name\":\"Ada\"}}' http://localhost:{}/",
        server_config.port
    );

    RelayServer::new(server_config, Arc::new(forwarder)).run().await
}
