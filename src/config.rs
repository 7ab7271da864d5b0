use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
	pub host: String,
	pub port: u16,
	/// Issuer label shown by authenticator apps.
	pub totp_issuer: String,
	/// Failed code attempts tolerated per account per minute.
	pub totp_attempts_per_minute: usize,
	/// Seconds an unconfirmed enrollment stays valid.
	pub totp_pending_ttl_seconds: u64,
}

impl Default for AppConfig {
	fn default() -> Self {
		Self {
			host: "0.0.0.0".to_string(),
			port: 8080,
			totp_issuer: "Marketplace".to_string(),
			totp_attempts_per_minute: 5,
			totp_pending_ttl_seconds: 600,
		}
	}
}

impl AppConfig {
	pub fn from_env() -> Self {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
		let defaults = Self::default();
		Self {
			host: var("HOST").unwrap_or(defaults.host),
			port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(defaults.port),
			totp_issuer: var("TOTP_ISSUER").filter(|v| !v.trim().is_empty()).unwrap_or(defaults.totp_issuer),
			totp_attempts_per_minute: var("TOTP_ATTEMPTS_PER_MINUTE")
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.totp_attempts_per_minute),
			totp_pending_ttl_seconds: var("TOTP_PENDING_TTL_SECONDS")
				.and_then(|v| v.parse().ok())
				.unwrap_or(defaults.totp_pending_ttl_seconds),
		}
	}
}
