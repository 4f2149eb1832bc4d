//! Authentication session service implementing [`AuthSessionService`].
//!
//! Registration and login issue an access/refresh pair and persist the
//! refresh token in the configured [`RefreshTokenStore`]. Refresh verifies the
//! stored token, issues a new access token and rotates the refresh token.
//! A stored token that fails verification is deleted so the client must log
//! in again.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{
    AuthSessionService, IssuedSession, RefreshTokenStore, UserRepository,
};
use crate::domain::{
    Error, LoginContext, LoginCredentials, NewUser, PasswordHasher, Registration, TokenError,
    TokenIssuer, TokenKind, User, UserId, Username, fingerprint, username_base,
    username_candidates,
};

/// Returned for unknown emails and wrong passwords alike.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";
/// Returned when registering an email that is already taken.
pub const USER_EXISTS: &str = "User already exists";
/// Returned when the refresh cookie does not name a known user.
pub const REFRESH_USER_NOT_FOUND: &str = "Username not found for refresh token";
/// Returned when the stored refresh token is missing, invalid or expired.
pub const REFRESH_EXPIRED: &str = "Refresh token expired, please log in again";
/// Returned when a request carries no access token.
pub const ACCESS_TOKEN_REQUIRED: &str = "Access token required";
/// Returned when an access token fails verification.
pub const INVALID_ACCESS_TOKEN: &str = "Invalid or expired token";
/// Returned when a valid access token names a deleted user.
pub const USER_NOT_FOUND: &str = "User not found";

/// Upper bound on username suffixes tried before giving up.
const MAX_USERNAME_ATTEMPTS: usize = 10_000;

/// Authentication service backed by a user repository and token store.
#[derive(Clone)]
pub struct AuthService<U: ?Sized, T: ?Sized> {
    users: Arc<U>,
    refresh_tokens: Arc<T>,
    issuer: TokenIssuer,
    hasher: PasswordHasher,
}

impl<U: ?Sized, T: ?Sized> AuthService<U, T> {
    /// Create a service.
    ///
    /// ```rust,no_run
    /// # use std::sync::Arc;
    /// # use mockable::DefaultClock;
    /// # use recordkeeper::domain::{AuthService, PasswordHasher, TokenIssuer, TokenSecrets};
    /// # use recordkeeper::outbound::memory::{InMemoryRefreshTokenStore, InMemoryUserRepository};
    /// let service = AuthService::new(
    ///     Arc::new(InMemoryUserRepository::new(Arc::new(DefaultClock))),
    ///     Arc::new(InMemoryRefreshTokenStore::new(Arc::new(DefaultClock))),
    ///     TokenIssuer::new(TokenSecrets::new("a", "r"), Arc::new(DefaultClock)),
    ///     PasswordHasher::default(),
    /// );
    /// ```
    #[must_use]
    pub fn new(
        users: Arc<U>,
        refresh_tokens: Arc<T>,
        issuer: TokenIssuer,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            users,
            refresh_tokens,
            issuer,
            hasher,
        }
    }
}

impl<U, T> AuthService<U, T>
where
    U: UserRepository + ?Sized,
    T: RefreshTokenStore + ?Sized,
{
    async fn allocate_username(&self, registration: &Registration) -> Result<Username, Error> {
        let base = username_base(
            registration.first_name(),
            registration.last_name(),
            registration.credentials().email(),
        );
        for candidate in username_candidates(&base).take(MAX_USERNAME_ATTEMPTS) {
            if self.users.find_by_username(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(Error::internal("could not allocate a username"))
    }

    async fn open_session(&self, user: User, context: &LoginContext) -> Result<IssuedSession, Error> {
        let pair = self.issuer.issue_pair(&user).map_err(token_failure)?;
        self.refresh_tokens
            .store(&user.username, &pair.refresh_token, context)
            .await?;
        debug!(
            username = %user.username,
            refresh = %fingerprint(&pair.refresh_token),
            "refresh token stored"
        );
        Ok(IssuedSession {
            access_token: pair.access_token,
            user,
        })
    }

    async fn expire_refresh(&self, username: &Username) -> Error {
        if let Err(err) = self.refresh_tokens.delete(username).await {
            warn!(%username, error = %err, "failed to delete expired refresh token");
        }
        Error::unauthorized(REFRESH_EXPIRED)
    }
}

fn token_failure(err: TokenError) -> Error {
    tracing::error!(error = %err, "token issuance failed");
    Error::internal("token issuance failed")
}

#[async_trait]
impl<U, T> AuthSessionService for AuthService<U, T>
where
    U: UserRepository + ?Sized,
    T: RefreshTokenStore + ?Sized,
{
    async fn register(
        &self,
        registration: Registration,
        context: LoginContext,
    ) -> Result<IssuedSession, Error> {
        let email = registration.credentials().email();
        if self.users.find_by_email(email).await?.is_some() {
            return Err(Error::conflict(USER_EXISTS));
        }
        let username = self.allocate_username(&registration).await?;
        let password_hash = self
            .hasher
            .hash(registration.credentials().password())
            .await?;
        let user = self
            .users
            .insert(NewUser {
                id: UserId::random(),
                first_name: registration.first_name().map(str::to_owned),
                last_name: registration.last_name().map(str::to_owned),
                email: email.clone(),
                username,
                password_hash,
            })
            .await?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        self.open_session(user, &context).await
    }

    async fn login(
        &self,
        credentials: LoginCredentials,
        context: LoginContext,
    ) -> Result<IssuedSession, Error> {
        let Some(user) = self.users.find_by_email(credentials.email()).await? else {
            debug!("login rejected: unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        if !self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await?
        {
            debug!(user_id = %user.id, "login rejected: wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        info!(user_id = %user.id, "user logged in");
        self.open_session(user, &context).await
    }

    async fn refresh(&self, claimed: Option<String>) -> Result<IssuedSession, Error> {
        let Some(username) = claimed.and_then(|raw| Username::new(raw).ok()) else {
            return Err(Error::forbidden(REFRESH_USER_NOT_FOUND));
        };
        let Some(user) = self.users.find_by_username(&username).await? else {
            return Err(Error::forbidden(REFRESH_USER_NOT_FOUND));
        };
        let Some(stored) = self.refresh_tokens.get(&username).await? else {
            debug!(%username, "no refresh token stored");
            return Err(self.expire_refresh(&username).await);
        };
        match self.issuer.verify(&stored.token, TokenKind::Refresh) {
            Ok(claims) if claims.sub == user.id.as_ref() => {}
            Ok(_) => {
                warn!(%username, "stored refresh token belongs to another user");
                return Err(self.expire_refresh(&username).await);
            }
            Err(err) => {
                debug!(%username, error = %err, "stored refresh token rejected");
                return Err(self.expire_refresh(&username).await);
            }
        }
        let pair = self.issuer.issue_pair(&user).map_err(token_failure)?;
        self.refresh_tokens
            .store(&username, &pair.refresh_token, &stored.context)
            .await?;
        debug!(
            %username,
            previous = %fingerprint(&stored.token),
            current = %fingerprint(&pair.refresh_token),
            "refresh token rotated"
        );
        Ok(IssuedSession {
            access_token: pair.access_token,
            user,
        })
    }

    async fn logout(&self, username: &Username) -> Result<(), Error> {
        self.refresh_tokens.delete(username).await?;
        info!(%username, "user logged out");
        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<User, Error> {
        if access_token.trim().is_empty() {
            return Err(Error::unauthorized(ACCESS_TOKEN_REQUIRED));
        }
        let claims = self
            .issuer
            .verify(access_token, TokenKind::Access)
            .map_err(|_| Error::forbidden(INVALID_ACCESS_TOKEN))?;
        let user_id =
            UserId::new(&claims.sub).map_err(|_| Error::forbidden(INVALID_ACCESS_TOKEN))?;
        self.users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| Error::unauthorized(USER_NOT_FOUND))
    }
}
