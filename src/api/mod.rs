use std::sync::Arc;
use std::time::Duration;

use axum::{routing::{get, post}, Router};
use tower_http::trace::TraceLayer;

use crate::{
    config::AppConfig,
    metrics::Metrics,
    ops::RateLimiter,
    store::EnrollmentStore,
    totp::SharedAuthenticator,
};

mod routes;

#[derive(Clone)]
pub struct AppState {
    pub cfg: AppConfig,
    pub store: EnrollmentStore,
    pub authenticator: Arc<SharedAuthenticator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub metrics: Arc<Metrics>,
}

impl AppState {
    pub fn new(cfg: AppConfig, authenticator: SharedAuthenticator) -> Result<Self, prometheus::Error> {
        let rate_limiter = Arc::new(RateLimiter::new(cfg.totp_attempts_per_minute));
        let store = EnrollmentStore::new(Duration::from_secs(cfg.totp_pending_ttl_seconds));
        Ok(Self {
            cfg,
            store,
            authenticator: Arc::new(authenticator),
            rate_limiter,
            metrics: Metrics::new()?,
        })
    }
}

/// Enrollment routes trust the `:account` segment; callers must be
/// authenticated upstream before reaching them.
pub fn router(state: AppState) -> Router {
    Router::new()
		.route("/health", get(routes::health))
		.route("/metrics", get(routes::metrics))
		.route("/mfa/totp/:account", get(routes::totp_status))
		.route("/mfa/totp/:account/secret", post(routes::totp_generate_secret))
		.route("/mfa/totp/:account/enable", post(routes::totp_enable))
		.route("/mfa/totp/:account/disable", post(routes::totp_disable))
		.route("/mfa/totp/:account/verify", post(routes::totp_verify))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
