use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;

/// Failures raised by the TOTP core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TotpError {
	/// The stored secret is not Base32. Points at data corruption, not user error.
	#[error("invalid base32 secret: unexpected character {character:?} at position {position}")]
	InvalidSecret { position: usize, character: char },
}

/// Failures raised by the enrollment state machine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TwoFactorError {
	#[error("two-factor authentication is already enabled")]
	TotpAlreadyEnabled,
	#[error("no pending two-factor enrollment")]
	NotPending,
	#[error("two-factor authentication is not enabled")]
	NotEnabled,
	#[error("invalid verification code")]
	InvalidCode,
	#[error(transparent)]
	Totp(#[from] TotpError),
}

#[derive(Error, Debug)]
pub enum AppError {
	#[error("Bad request: {0}")]
	BadRequest(String),
	#[error("Unauthorized")]
	Unauthorized,
	#[error("Conflict: {0}")]
	Conflict(String),
	#[error("Too many attempts")]
	RateLimited,
	#[error("Internal error: {0}")]
	Internal(String),
}

impl From<TwoFactorError> for AppError {
	fn from(err: TwoFactorError) -> Self {
		match err {
			TwoFactorError::TotpAlreadyEnabled => AppError::Conflict(err.to_string()),
			TwoFactorError::NotPending | TwoFactorError::NotEnabled => AppError::BadRequest(err.to_string()),
			TwoFactorError::InvalidCode => AppError::Unauthorized,
			// a corrupted stored secret is never reported as a wrong code
			TwoFactorError::Totp(_) => AppError::Internal("stored secret is corrupted".to_string()),
		}
	}
}

#[derive(Serialize)]
struct ErrorBody {
	code: u16,
	message: String,
}

impl IntoResponse for AppError {
	fn into_response(self) -> axum::response::Response {
		let (status, message) = match self {
			AppError::BadRequest(e) => (StatusCode::BAD_REQUEST, e),
			AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
			AppError::Conflict(e) => (StatusCode::CONFLICT, e),
			AppError::RateLimited => (StatusCode::TOO_MANY_REQUESTS, "rate limited".to_string()),
			AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e),
		};
		let body = Json(ErrorBody { code: status.as_u16(), message });
		(status, body).into_response()
	}
}

pub type AppResult<T> = Result<T, AppError>;
