//! wabot-server: link status surface for the wabot WhatsApp bot
//!
//! Serves the pages an operator needs to link the bot to a phone:
//! - `/qr` shows the current QR code, or a waiting/connected page
//! - `/pairing` requests a phone-number pairing code
//! - `/status` reports the raw link status as JSON
//!
//! The WhatsApp connection itself belongs to the external protocol library.
//! It reports progress by calling into the [`StatusStore`] shared here.

mod handlers;
mod pages;
mod server;
mod state;

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use wabot_core::{Config, StatusStore};

use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wabot_server=debug,wabot_core=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::load());
    tracing::info!(
        mode = %config.mode,
        port = %config.port,
        handlers = %config.handlers,
        qr = config.qr,
        "Configuration loaded"
    );

    // The messaging client registers itself here and feeds connection events
    let status = Arc::new(StatusStore::new());
    let state = Arc::new(AppState::new(Arc::clone(&config), status));

    if config.qr {
        tracing::info!("Scan the QR code at http://localhost:{}/qr", config.port);
    }

    // A failed listener ends only its own task
    tokio::spawn(server::serve(state));

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}
