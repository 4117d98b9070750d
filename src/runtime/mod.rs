//! Hosting glue shared by the relay binaries.

mod config;
mod server;

pub use config::ServerConfig;
pub use server::RelayServer;

use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber, honoring `RUST_LOG` and defaulting to `info`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
