//! Driving port for the authentication session lifecycle.
//!
//! Inbound adapters call this port for registration, login, token refresh,
//! logout and access-token authentication. The refresh token itself never
//! crosses this boundary; adapters only learn the username they should bind
//! to the client's session cookie.

use async_trait::async_trait;

use crate::domain::{Error, LoginContext, LoginCredentials, Registration, User, Username};

/// Result of a successful register, login or refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedSession {
    /// Short-lived bearer token for API calls.
    pub access_token: String,
    /// The authenticated user.
    pub user: User,
}

/// Authentication use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthSessionService: Send + Sync {
    /// Create an account and open a session for it.
    async fn register(
        &self,
        registration: Registration,
        context: LoginContext,
    ) -> Result<IssuedSession, Error>;

    /// Verify credentials and open a session.
    async fn login(
        &self,
        credentials: LoginCredentials,
        context: LoginContext,
    ) -> Result<IssuedSession, Error>;

    /// Issue a new access token for the session bound to `username`,
    /// rotating the stored refresh token.
    async fn refresh(&self, username: Option<String>) -> Result<IssuedSession, Error>;

    /// Revoke the stored refresh token for `username`.
    async fn logout(&self, username: &Username) -> Result<(), Error>;

    /// Resolve the user behind an access token.
    async fn authenticate(&self, access_token: &str) -> Result<User, Error>;
}
