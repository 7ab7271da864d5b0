use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Used when `RUST_LOG` is unset or unparsable. Keeps per-request spans from
/// the HTTP trace layer visible.
pub const DEFAULT_FILTER: &str = "info,tower_http=debug";

/// Install the global subscriber. Returns `false` if one was already set.
pub fn init_tracing() -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let fmt_layer = fmt::layer().with_target(false).with_level(true);
    let subscriber = Registry::default().with(env_filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber).is_ok()
}
