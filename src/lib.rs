pub mod api;
pub mod base32;
pub mod clock;
pub mod config;
pub mod enrollment;
pub mod entropy;
pub mod error;
pub mod hotp;
pub mod metrics;
pub mod ops;
pub mod store;
pub mod telemetry;
pub mod totp;

pub use error::TotpError;
pub use totp::{generate_secret, provisioning_uri, verify_token, Authenticator, Verification};
