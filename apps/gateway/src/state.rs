use std::sync::Arc;

use crate::config::Config;
use crate::session::TokenVerifier;
use crate::upstream::Upstream;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything in here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Remote origin client. Default: `HttpUpstream`; tests swap in a recording double.
    pub upstream: Arc<dyn Upstream>,
    pub verifier: Arc<TokenVerifier>,
}

impl AppState {
    /// Whether session cookies carry the `Secure` attribute.
    pub fn secure_cookies(&self) -> bool {
        self.config.environment.is_production()
    }
}
