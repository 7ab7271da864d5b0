use std::net::SocketAddr;

use anyhow::Result;
use dotenvy::dotenv;
use tracing::info;

use twofactor::{
	api::{self, AppState},
	clock::SystemClock,
	config::AppConfig,
	entropy::OsSecretSource,
	telemetry::init_tracing,
	totp::SharedAuthenticator,
};

#[tokio::main]
async fn main() -> Result<()> {
	// Load environment variables from .env if present
	dotenv().ok();
	init_tracing();

	let cfg = AppConfig::from_env();
	let addr: SocketAddr = format!("{}:{}", cfg.host, cfg.port).parse()?;
	let state = AppState::new(cfg, SharedAuthenticator::shared(OsSecretSource, SystemClock))?;
	let app = api::router(state);

	info!(%addr, "starting server");
	axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

	Ok(())
}
