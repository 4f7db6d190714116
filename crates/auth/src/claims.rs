use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use farmxchain_core::AccountId;

use crate::Role;

/// Fixed session lifetime: 10 hours.
pub const SESSION_TTL_SECS: i64 = 10 * 60 * 60;

/// Claims carried by a session token.
///
/// Timestamps are seconds since the Unix epoch. The signature covers every
/// field, so none of them can change without invalidating the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject: the account email.
    pub sub: String,

    /// Bare role name as issued (e.g. `FARMER`).
    pub role: String,

    /// Stable numeric account identifier; used for ownership checks.
    pub account_id: AccountId,

    /// Issued-at timestamp.
    pub iat: i64,

    /// Expiration timestamp (`iat + SESSION_TTL_SECS`).
    pub exp: i64,
}

impl SessionClaims {
    pub fn new(
        account_id: AccountId,
        subject: impl Into<String>,
        role: &Role,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let iat = issued_at.timestamp();
        Self {
            sub: subject.into(),
            role: role.as_str().to_string(),
            account_id,
            iat,
            exp: iat + SESSION_TTL_SECS,
        }
    }

    /// True iff the expiry is at or before `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Malformed structure, bad signature, wrong algorithm or missing claims.
    #[error("invalid token: {0}")]
    Invalid(String),

    /// Well-formed and correctly signed, but past its expiry.
    #[error("token has expired")]
    Expired,

    #[error("signing key too short: {actual} bytes (minimum {min})")]
    KeyTooShort { actual: usize, min: usize },

    #[error("token encoding failed: {0}")]
    Encoding(String),
}

/// Deterministically check the time window of already-verified claims.
///
/// Note: this checks the *claims* only. Signature verification happens in
/// [`crate::TokenCodec::decode_claims`].
pub fn check_expiry(claims: &SessionClaims, now: DateTime<Utc>) -> Result<(), TokenError> {
    if claims.exp <= claims.iat {
        return Err(TokenError::Invalid("expiry not after issued-at".to_string()));
    }
    if claims.is_expired_at(now) {
        return Err(TokenError::Expired);
    }
    Ok(())
}
