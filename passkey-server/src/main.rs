//! Passkey Server - REST API for single-credential passkey login
//!
//! Exposes the passkey ceremonies via HTTP endpoints:
//! - POST /passkey/register/start, /passkey/register/verify
//! - POST /passkey/auth/start, /passkey/auth/verify
//! - GET  /passkey/session

use std::net::SocketAddr;

use passkey_server::{create_router_with_state, AppState, Config, RelyingPartyConfig};
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,passkey_server=debug";

#[tokio::main]
async fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(true)
        .init();

    let config = Config::from_env();
    let rp = RelyingPartyConfig::from_env();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        store = ?config.store_backend,
        rp_id = rp.rp_id.as_deref().unwrap_or("<request host>"),
        "Starting passkey-server"
    );

    let state = AppState::initialize(&config, rp).await;
    let app = create_router_with_state(&config, state);

    let addr = config.socket_addr();
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "Failed to bind listener");
            std::process::exit(1);
        }
    };
    tracing::info!("Listening on http://{}", addr);

    // Peer addresses feed the rate limiter's key extractor
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
