//! Secret issuance and time-windowed token verification.
//!
//! Only backward clock skew is tolerated: a token is accepted for the current
//! time step and the one before it, never for a future step.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    base32,
    clock::{Clock, SystemClock},
    entropy::{OsSecretSource, SecretSource},
    error::TotpError,
    hotp,
};

/// Raw secret length. 80 bits is exactly 16 Base32 characters.
pub const SECRET_BYTES: usize = 10;

/// Outcome of checking a token against a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// The token matched the code for `counter`.
    Accepted { counter: u64 },
    /// The token is not exactly six ASCII digits.
    MalformedToken,
    /// No time step in the window produced this token.
    WrongCode,
}

impl Verification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Verification::Accepted { .. })
    }
}

#[derive(Clone, Debug)]
pub struct Authenticator<S = OsSecretSource, C = SystemClock> {
    source: S,
    clock: C,
}

impl Authenticator {
    /// Authenticator backed by the OS random source and the system clock.
    pub fn new() -> Self {
        Self { source: OsSecretSource, clock: SystemClock }
    }
}

impl Default for Authenticator {
    fn default() -> Self {
        Self::new()
    }
}

/// Type-erased authenticator that can sit in shared application state.
pub type SharedAuthenticator =
    Authenticator<Arc<dyn SecretSource + Send + Sync>, Arc<dyn Clock + Send + Sync>>;

impl SharedAuthenticator {
    pub fn shared(
        source: impl SecretSource + Send + Sync + 'static,
        clock: impl Clock + Send + Sync + 'static,
    ) -> Self {
        Self { source: Arc::new(source), clock: Arc::new(clock) }
    }
}

impl<S: SecretSource, C: Clock> Authenticator<S, C> {
    pub fn with_capabilities(source: S, clock: C) -> Self {
        Self { source, clock }
    }

    /// Draw a fresh secret and return it as 16 uppercase Base32 characters.
    pub fn generate_secret(&self) -> String {
        let mut bytes = [0u8; SECRET_BYTES];
        self.source.fill(&mut bytes);
        base32::encode(&bytes)
    }

    pub fn verify(&self, secret: &str, token: &str) -> bool {
        self.verify_at(secret, token, self.clock.unix_seconds())
    }

    /// Like [`verify`](Self::verify) with an explicit Unix timestamp.
    ///
    /// A corrupted secret is logged and reported as `false`.
    pub fn verify_at(&self, secret: &str, token: &str, unix_seconds: u64) -> bool {
        match self.check_at(secret, token, unix_seconds) {
            Ok(outcome) => outcome.is_accepted(),
            Err(e) => {
                warn!(error = %e, "stored TOTP secret failed to decode");
                false
            }
        }
    }

    pub fn check(&self, secret: &str, token: &str) -> Result<Verification, TotpError> {
        self.check_at(secret, token, self.clock.unix_seconds())
    }

    pub fn check_at(&self, secret: &str, token: &str, unix_seconds: u64) -> Result<Verification, TotpError> {
        if !is_well_formed(token) {
            return Ok(Verification::MalformedToken);
        }
        let key = base32::decode(secret)?;
        let current = hotp::counter_at(unix_seconds);

        for counter in [Some(current), current.checked_sub(1)].into_iter().flatten() {
            if constant_time_eq(hotp::generate(&key, counter).as_bytes(), token.as_bytes()) {
                if counter != current {
                    debug!(counter, "accepted token from previous time step");
                }
                return Ok(Verification::Accepted { counter });
            }
        }
        Ok(Verification::WrongCode)
    }

    /// Code an authenticator app would display right now.
    pub fn current_code(&self, secret: &str) -> Result<String, TotpError> {
        let key = base32::decode(secret)?;
        Ok(hotp::generate(&key, hotp::counter_at(self.clock.unix_seconds())))
    }
}

/// Generate an enrollment secret from the OS random source.
pub fn generate_secret() -> String {
    Authenticator::new().generate_secret()
}

/// Verify `token` against `secret` at the current system time.
pub fn verify_token(secret: &str, token: &str) -> bool {
    Authenticator::new().verify(secret, token)
}

/// `otpauth://` URI consumed by authenticator apps.
///
/// Algorithm, digits and period are left implicit (SHA1, 6, 30s).
pub fn provisioning_uri(issuer: &str, account: &str, secret: &str) -> String {
    let issuer = urlencoding::encode(issuer);
    format!(
        "otpauth://totp/{}:{}?secret={}&issuer={}",
        issuer,
        urlencoding::encode(account),
        secret,
        issuer,
    )
}

fn is_well_formed(token: &str) -> bool {
    token.len() == hotp::DIGITS && token.bytes().all(|b| b.is_ascii_digit())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{clock::FixedClock, entropy::FixedSecretSource};

    const RFC_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn frozen(at: u64) -> Authenticator<OsSecretSource, FixedClock> {
        Authenticator::with_capabilities(OsSecretSource, FixedClock(at))
    }

    #[test]
    fn test_rfc6238_sha1_vectors() {
        let vectors = [
            (59u64, "287082"),
            (1_111_111_109, "081804"),
            (1_111_111_111, "050471"),
            (1_234_567_890, "005924"),
            (2_000_000_000, "279037"),
            (20_000_000_000, "353130"),
        ];
        for (time, code) in vectors {
            assert!(frozen(time).verify(RFC_SECRET, code), "T={}", time);
            assert_eq!(frozen(time).current_code(RFC_SECRET).unwrap(), code);
        }
    }

    #[test]
    fn test_window_is_current_and_previous_step_only() {
        let key = base32::decode(RFC_SECRET).unwrap();
        let counter = 41_152_263u64;
        let token = hotp::generate(&key, counter);
        let start = counter * hotp::STEP_SECONDS;
        let auth = Authenticator::new();

        assert!(auth.verify_at(RFC_SECRET, &token, start));
        assert!(auth.verify_at(RFC_SECRET, &token, start + 29));
        assert!(auth.verify_at(RFC_SECRET, &token, start + 30));
        assert!(auth.verify_at(RFC_SECRET, &token, start + 59));
        assert!(!auth.verify_at(RFC_SECRET, &token, start + 60));
        assert!(!auth.verify_at(RFC_SECRET, &token, start - 1));
    }

    #[test]
    fn test_check_reports_matching_counter() {
        let key = base32::decode(RFC_SECRET).unwrap();
        let token = hotp::generate(&key, 100);
        let auth = Authenticator::new();
        assert_eq!(auth.check_at(RFC_SECRET, &token, 100 * 30), Ok(Verification::Accepted { counter: 100 }));
        assert_eq!(auth.check_at(RFC_SECRET, &token, 101 * 30), Ok(Verification::Accepted { counter: 100 }));
        assert_eq!(auth.check_at(RFC_SECRET, &token, 102 * 30), Ok(Verification::WrongCode));
    }

    #[test]
    fn test_first_step_has_no_previous_counter() {
        let auth = frozen(10);
        let code = auth.current_code(RFC_SECRET).unwrap();
        assert_eq!(auth.check(RFC_SECRET, &code), Ok(Verification::Accepted { counter: 0 }));
    }

    #[test]
    fn test_malformed_tokens_are_rejected_without_error() {
        let auth = frozen(59);
        for token in ["12a456", "12345", "1234567", "", " 28708", "287082 ", "２８７０８２"] {
            assert_eq!(auth.check(RFC_SECRET, token), Ok(Verification::MalformedToken), "{:?}", token);
            assert!(!auth.verify(RFC_SECRET, token));
        }
    }

    #[test]
    fn test_malformed_secret_is_distinct_from_wrong_code() {
        let auth = frozen(59);
        assert!(matches!(auth.check("not-base32!", "123456"), Err(TotpError::InvalidSecret { .. })));
        assert!(!auth.verify("not-base32!", "123456"));
    }

    #[test]
    fn test_generated_secret_shape() {
        let auth = Authenticator::new();
        for _ in 0..32 {
            let secret = auth.generate_secret();
            assert_eq!(secret.len(), 16);
            assert!(secret.bytes().all(|b| base32::ALPHABET.contains(&b)));
            assert_eq!(base32::decode(&secret).unwrap().len(), SECRET_BYTES);
        }
    }

    #[test]
    fn test_injected_source_makes_secret_deterministic() {
        let auth = Authenticator::with_capabilities(FixedSecretSource((1..=10).collect()), FixedClock(0));
        assert_eq!(auth.generate_secret(), "AEBAGBAFAYDQQCIK");
    }

    #[test]
    fn test_wrong_code_with_known_secret() {
        // 806499 is the code at counter 0 for this key
        let auth = Authenticator::with_capabilities(FixedSecretSource((1..=10).collect()), FixedClock(0));
        let secret = auth.generate_secret();
        assert!(auth.verify(&secret, "806499"));
        assert!(!auth.verify(&secret, "000000"));
        assert_eq!(auth.check(&secret, "000000"), Ok(Verification::WrongCode));
    }

    #[test]
    fn test_provisioning_uri_format() {
        let uri = provisioning_uri("Marketplace", "alice@example.com", "AEBAGBAFAYDQQCIK");
        assert_eq!(
            uri,
            "otpauth://totp/Marketplace:alice%40example.com?secret=AEBAGBAFAYDQQCIK&issuer=Marketplace"
        );
        assert!(!uri.contains("algorithm="));
        assert!(!uri.contains("digits="));
        assert!(!uri.contains("period="));
    }

    #[test]
    fn test_provisioning_uri_escapes_issuer() {
        let uri = provisioning_uri("Acme Market", "bob", "AEBAGBAFAYDQQCIK");
        assert_eq!(uri, "otpauth://totp/Acme%20Market:bob?secret=AEBAGBAFAYDQQCIK&issuer=Acme%20Market");
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"123456", b"123456"));
        assert!(!constant_time_eq(b"123456", b"123457"));
        assert!(!constant_time_eq(b"123456", b"12345"));
    }
}
