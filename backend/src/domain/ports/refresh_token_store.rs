//! Port for refresh token storage.
//!
//! One refresh token is kept per username. Storing a token replaces any
//! previous one, which is how rotation and re-login invalidate old tokens.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{LoginContext, Username};

use super::define_port_error;

define_port_error! {
    /// Errors raised by refresh token stores.
    pub enum RefreshTokenStoreError {
        /// The backing store is unreachable or sealed.
        Unavailable { message: String } => "refresh token store unavailable: {message}",
        /// The store rejected the request or returned an unexpected payload.
        Backend { message: String } => "refresh token store failed: {message}",
    }
}

/// A refresh token with the metadata recorded when it was stored.
#[derive(Clone, PartialEq, Eq)]
pub struct StoredRefreshToken {
    /// The opaque refresh token.
    pub token: String,
    /// Client details captured at login.
    pub context: LoginContext,
    /// When the token was stored.
    pub created_at: Option<DateTime<Utc>>,
    /// When the token was last read for a refresh.
    pub last_used: Option<DateTime<Utc>>,
}

impl fmt::Debug for StoredRefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredRefreshToken")
            .field("token", &crate::domain::fingerprint(&self.token))
            .field("context", &self.context)
            .field("created_at", &self.created_at)
            .field("last_used", &self.last_used)
            .finish()
    }
}

/// Refresh token persistence keyed by username.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Store `token` for `username`, replacing any previous token.
    async fn store(
        &self,
        username: &Username,
        token: &str,
        context: &LoginContext,
    ) -> Result<(), RefreshTokenStoreError>;

    /// Fetch the stored token for `username`.
    async fn get(
        &self,
        username: &Username,
    ) -> Result<Option<StoredRefreshToken>, RefreshTokenStoreError>;

    /// Remove the token for `username`. Removing an absent token succeeds.
    async fn delete(&self, username: &Username) -> Result<(), RefreshTokenStoreError>;
}

impl From<RefreshTokenStoreError> for crate::domain::Error {
    fn from(value: RefreshTokenStoreError) -> Self {
        tracing::error!(error = %value, "refresh token store failure");
        match value {
            RefreshTokenStoreError::Unavailable { .. } => {
                Self::service_unavailable("refresh token store unavailable")
            }
            RefreshTokenStoreError::Backend { .. } => Self::internal("refresh token store error"),
        }
    }
}
