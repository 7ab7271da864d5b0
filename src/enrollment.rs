use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    clock::Clock,
    entropy::SecretSource,
    error::TwoFactorError,
    totp::{Authenticator, Verification},
};

/// Two-factor state attached to an account.
#[derive(Default, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TwoFactor {
    #[default]
    Disabled,
    /// Secret issued, waiting for the first valid code
    Pending { secret: String },
    /// Codes required on this account
    Enabled { secret: String },
}

impl fmt::Debug for TwoFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print the secret
        write!(f, "TwoFactor::{}", self.status())
    }
}

impl TwoFactor {
    pub fn is_enabled(&self) -> bool {
        matches!(self, TwoFactor::Enabled { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            TwoFactor::Disabled => "disabled",
            TwoFactor::Pending { .. } => "pending",
            TwoFactor::Enabled { .. } => "enabled",
        }
    }

    /// Attach a freshly issued secret. Re-enrolling replaces a pending secret.
    pub fn begin(&mut self, secret: String) -> Result<(), TwoFactorError> {
        if self.is_enabled() {
            return Err(TwoFactorError::TotpAlreadyEnabled);
        }
        *self = TwoFactor::Pending { secret };
        Ok(())
    }

    /// Move a pending enrollment to enabled once the user proves possession.
    pub fn confirm<S: SecretSource, C: Clock>(
        &mut self,
        authenticator: &Authenticator<S, C>,
        token: &str,
    ) -> Result<(), TwoFactorError> {
        let TwoFactor::Pending { secret } = self else {
            return Err(TwoFactorError::NotPending);
        };
        check(authenticator, secret, token)?;
        let secret = std::mem::take(secret);
        *self = TwoFactor::Enabled { secret };
        Ok(())
    }

    /// Turn two-factor off. Requires a valid code.
    pub fn disable<S: SecretSource, C: Clock>(
        &mut self,
        authenticator: &Authenticator<S, C>,
        token: &str,
    ) -> Result<(), TwoFactorError> {
        self.verify_login(authenticator, token)?;
        *self = TwoFactor::Disabled;
        Ok(())
    }

    /// Gate a login on an enabled account.
    pub fn verify_login<S: SecretSource, C: Clock>(
        &self,
        authenticator: &Authenticator<S, C>,
        token: &str,
    ) -> Result<(), TwoFactorError> {
        match self {
            TwoFactor::Enabled { secret } => check(authenticator, secret, token),
            _ => Err(TwoFactorError::NotEnabled),
        }
    }
}

fn check<S: SecretSource, C: Clock>(
    authenticator: &Authenticator<S, C>,
    secret: &str,
    token: &str,
) -> Result<(), TwoFactorError> {
    match authenticator.check(secret, token)? {
        Verification::Accepted { .. } => Ok(()),
        Verification::MalformedToken | Verification::WrongCode => Err(TwoFactorError::InvalidCode),
    }
}
