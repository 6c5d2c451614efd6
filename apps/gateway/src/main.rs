mod config;
mod envelope;
mod errors;
mod proxy;
mod resume;
mod routes;
mod session;
mod state;
mod upstream;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::routes::build_router;
use crate::session::TokenVerifier;
use crate::state::AppState;
use crate::upstream::HttpUpstream;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting ZUME gateway v{}", env!("CARGO_PKG_VERSION"));

    let upstream = HttpUpstream::new(config.upstream_url.clone())?;
    info!(
        "Upstream client initialized ({:?}: {})",
        config.environment,
        upstream.base_url()
    );

    let verifier = TokenVerifier::new(config.jwt_secret.as_deref(), config.jwt_algorithm);
    if !verifier.verifies_signature() {
        warn!("JWT_SECRET not set; session token signatures are not verified locally");
    }

    let state = AppState {
        config: config.clone(),
        upstream: Arc::new(upstream),
        verifier: Arc::new(verifier),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
