//! HS256 access and refresh token issuance.
//!
//! Access tokens live for 15 minutes and refresh tokens for 7 days. Each
//! kind is signed with its own secret. Expiry is checked against the
//! injected [`Clock`] rather than the system time so tests can move time.

use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::user::User;

/// Access token lifetime in seconds (15 minutes).
pub const ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
/// Refresh token lifetime in seconds (7 days).
pub const REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

impl TokenKind {
    /// Lifetime of tokens of this kind.
    #[must_use]
    pub fn ttl(self) -> Duration {
        match self {
            Self::Access => Duration::seconds(ACCESS_TOKEN_TTL_SECS),
            Self::Refresh => Duration::seconds(REFRESH_TOKEN_TTL_SECS),
        }
    }
}

/// Claims carried by both token kinds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// User id.
    pub sub: String,
    /// Normalised email at issue time.
    pub email: String,
    /// Username at issue time.
    pub username: String,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
    /// Unique token id; rotated refresh tokens never repeat.
    pub jti: String,
}

/// Which secret a token is signed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Short-lived bearer token for API calls.
    Access,
    /// Long-lived token kept server-side for renewing access.
    Refresh,
}

/// Failures raised while issuing or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The signer rejected the claims or key.
    #[error("failed to sign token: {0}")]
    Signing(String),
    /// Bad encoding, wrong algorithm, or wrong secret.
    #[error("token is malformed or its signature is invalid")]
    Invalid,
    /// `exp` is not after the clock's current time.
    #[error("token has expired")]
    Expired,
}

/// Signing secrets for both token kinds.
#[derive(Clone)]
pub struct TokenSecrets {
    access: Zeroizing<Vec<u8>>,
    refresh: Zeroizing<Vec<u8>>,
}

impl TokenSecrets {
    /// Build from raw secret material.
    #[must_use]
    pub fn new(access: impl AsRef<[u8]>, refresh: impl AsRef<[u8]>) -> Self {
        Self {
            access: Zeroizing::new(access.as_ref().to_vec()),
            refresh: Zeroizing::new(refresh.as_ref().to_vec()),
        }
    }

    fn for_kind(&self, kind: TokenKind) -> &[u8] {
        match kind {
            TokenKind::Access => self.access.as_slice(),
            TokenKind::Refresh => self.refresh.as_slice(),
        }
    }
}

impl fmt::Debug for TokenSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TokenSecrets(<redacted>)")
    }
}

/// A freshly issued access/refresh pair.
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    /// Encoded access token.
    pub access_token: String,
    /// Encoded refresh token.
    pub refresh_token: String,
}

impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &fingerprint(&self.access_token))
            .field("refresh_token", &fingerprint(&self.refresh_token))
            .finish()
    }
}

/// Issues and verifies tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    secrets: TokenSecrets,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer reading time from `clock`.
    #[must_use]
    pub fn new(secrets: TokenSecrets, clock: Arc<dyn Clock>) -> Self {
        Self { secrets, clock }
    }

    /// Issue both tokens for `user`.
    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user, TokenKind::Access)?,
            refresh_token: self.issue(user, TokenKind::Refresh)?,
        })
    }

    /// Issue a single token of `kind` for `user`.
    pub fn issue(&self, user: &User, kind: TokenKind) -> Result<String, TokenError> {
        let now = self.clock.utc();
        let ttl = kind.ttl();
        let claims = TokenClaims {
            sub: user.id.to_string(),
            email: user.email.to_string(),
            username: user.username.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secrets.for_kind(kind)),
        )
        .map_err(|err| TokenError::Signing(err.to_string()))
    }

    /// Verify the signature and expiry of `token`.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;
        let data = decode::<TokenClaims>(
            token,
            &DecodingKey::from_secret(self.secrets.for_kind(kind)),
            &validation,
        )
        .map_err(|_| TokenError::Invalid)?;
        if data.claims.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::Expired);
        }
        Ok(data.claims)
    }
}

/// Short SHA-256 fingerprint used to reference a token in logs.
#[must_use]
pub fn fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    hex::encode(digest.get(..6).unwrap_or_default())
}
