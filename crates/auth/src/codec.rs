//! Signed session token issuing and verification (HS256, compact JWS).
//!
//! Signature verification and expiry are deliberately separate steps:
//! [`TokenCodec::decode_claims`] only proves the token is authentic and well
//! formed, [`check_expiry`] decides whether it is still usable. [`TokenCodec::verify_at`]
//! runs both.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use farmxchain_core::AccountId;

use crate::claims::{SessionClaims, TokenError, check_expiry};
use crate::Role;

/// Minimum signing key length: 256 bits.
pub const MIN_KEY_BYTES: usize = 32;

/// Server-held HMAC secret. Never serialized, never logged.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, TokenError> {
        let bytes = bytes.into();
        if bytes.len() < MIN_KEY_BYTES {
            return Err(TokenError::KeyTooShort {
                actual: bytes.len(),
                min: MIN_KEY_BYTES,
            });
        }
        Ok(Self(bytes))
    }

    fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl core::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "SigningKey(<{} bytes redacted>)", self.0.len())
    }
}

/// Issues and verifies session tokens.
///
/// Built once at startup from a [`SigningKey`] and shared read-only (`Arc`)
/// across all request handlers; no method takes `&mut self`.
#[derive(Clone)]
pub struct TokenCodec {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(key: SigningKey) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked explicitly by `check_expiry`, never by the decoder.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "exp"]);

        Self {
            header: Header::new(Algorithm::HS256),
            encoding: EncodingKey::from_secret(key.as_bytes()),
            decoding: DecodingKey::from_secret(key.as_bytes()),
            validation,
        }
    }

    /// Issue a token valid for [`crate::SESSION_TTL_SECS`] from now.
    pub fn issue(&self, account_id: AccountId, subject: &str, role: &Role) -> Result<String, TokenError> {
        self.issue_at(account_id, subject, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        account_id: AccountId,
        subject: &str,
        role: &Role,
        now: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = SessionClaims::new(account_id, subject, role, now);
        jsonwebtoken::encode(&self.header, &claims, &self.encoding)
            .map_err(|e| TokenError::Encoding(e.to_string()))
    }

    /// Verify signature and structure; does NOT check expiry.
    pub fn decode_claims(&self, token: &str) -> Result<SessionClaims, TokenError> {
        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| TokenError::Invalid(e.to_string()))
    }

    /// Decode and require the token to be unexpired at `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let claims = self.decode_claims(token)?;
        check_expiry(&claims, now)?;
        Ok(claims)
    }

    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.decode_claims(token)?.sub)
    }

    pub fn extract_role(&self, token: &str) -> Result<String, TokenError> {
        Ok(self.decode_claims(token)?.role)
    }

    pub fn extract_account_id(&self, token: &str) -> Result<AccountId, TokenError> {
        Ok(self.decode_claims(token)?.account_id)
    }

    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        self.is_expired_at(token, Utc::now())
    }

    pub fn is_expired_at(&self, token: &str, now: DateTime<Utc>) -> Result<bool, TokenError> {
        Ok(self.decode_claims(token)?.is_expired_at(now))
    }

    /// True only for an authentic, unexpired token issued to `expected_subject`.
    ///
    /// Never fails: any decode error yields `false`.
    pub fn validate(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_at(token, expected_subject, Utc::now())
    }

    pub fn validate_at(&self, token: &str, expected_subject: &str, now: DateTime<Utc>) -> bool {
        match self.decode_claims(token) {
            Ok(claims) => claims.sub == expected_subject && check_expiry(&claims, now).is_ok(),
            Err(_) => false,
        }
    }
}

impl core::fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &self.header.alg)
            .finish_non_exhaustive()
    }
}
