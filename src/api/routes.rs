use axum::{extract::{Path, State}, http::{header, StatusCode}, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
	error::{AppError, AppResult, TwoFactorError},
	totp::provisioning_uri,
};
use super::AppState;

pub async fn health() -> Json<serde_json::Value> {
	Json(serde_json::json!({ "status": "ok" }))
}

pub async fn metrics(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
	let body = state.metrics.gather().map_err(|e| AppError::Internal(e.to_string()))?;
	Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body))
}

#[derive(Deserialize)]
pub struct TokenRequest { pub token: String }

#[derive(Serialize)]
pub struct SecretResponse { pub secret: String, pub uri: String }

pub async fn totp_status(State(state): State<AppState>, Path(account): Path<String>) -> Json<serde_json::Value> {
	let status = state.store.get(&account).await.status();
	Json(serde_json::json!({ "account": account, "status": status }))
}

pub async fn totp_generate_secret(State(state): State<AppState>, Path(account): Path<String>) -> AppResult<Json<SecretResponse>> {
	let secret = state.authenticator.generate_secret();
	state.store.update(&account, |s| s.begin(secret.clone())).await?;
	state.metrics.secrets_issued.inc();
	info!(%account, "issued TOTP secret");
	let uri = provisioning_uri(&state.cfg.totp_issuer, &account, &secret);
	Ok(Json(SecretResponse { secret, uri }))
}

pub async fn totp_enable(State(state): State<AppState>, Path(account): Path<String>, Json(req): Json<TokenRequest>) -> AppResult<Json<serde_json::Value>> {
	guard_attempt(&state, &account).await?;
	let authenticator = state.authenticator.clone();
	let result = state.store.update(&account, |s| s.confirm(&*authenticator, &req.token)).await;
	settle(&state, &account, result).await?;
	info!(%account, "two-factor enabled");
	Ok(Json(serde_json::json!({ "status": "enabled" })))
}

pub async fn totp_disable(State(state): State<AppState>, Path(account): Path<String>, Json(req): Json<TokenRequest>) -> AppResult<Json<serde_json::Value>> {
	guard_attempt(&state, &account).await?;
	let authenticator = state.authenticator.clone();
	let result = state.store.update(&account, |s| s.disable(&*authenticator, &req.token)).await;
	settle(&state, &account, result).await?;
	info!(%account, "two-factor disabled");
	Ok(Json(serde_json::json!({ "status": "disabled" })))
}

pub async fn totp_verify(State(state): State<AppState>, Path(account): Path<String>, Json(req): Json<TokenRequest>) -> AppResult<Json<serde_json::Value>> {
	guard_attempt(&state, &account).await?;
	let result = state.store.get(&account).await.verify_login(&*state.authenticator, &req.token);
	match settle(&state, &account, result).await {
		Ok(()) => Ok(Json(serde_json::json!({ "valid": true }))),
		Err(AppError::Unauthorized) => Ok(Json(serde_json::json!({ "valid": false }))),
		Err(e) => Err(e),
	}
}

async fn guard_attempt(state: &AppState, account: &str) -> AppResult<()> {
	if state.rate_limiter.check_and_record(account).await {
		return Ok(());
	}
	state.metrics.rate_limited.inc();
	warn!(%account, "too many TOTP attempts");
	Err(AppError::RateLimited)
}

// Book-keeping shared by every code-consuming route.
async fn settle(state: &AppState, account: &str, result: Result<(), TwoFactorError>) -> AppResult<()> {
	match result {
		Ok(()) => {
			state.rate_limiter.reset(account).await;
			state.metrics.verifications_accepted.inc();
			Ok(())
		}
		Err(TwoFactorError::InvalidCode) => {
			state.metrics.verifications_rejected.inc();
			Err(AppError::Unauthorized)
		}
		Err(TwoFactorError::Totp(e)) => {
			state.metrics.invalid_secrets.inc();
			warn!(%account, error = %e, "stored TOTP secret is corrupted");
			Err(TwoFactorError::Totp(e).into())
		}
		Err(e) => Err(e.into()),
	}
}
