//! Reqwest-backed Vault client.
//!
//! Every request carries an `X-Vault-Token`. With AppRole auth the token is
//! fetched on demand and reused until five minutes before its lease ends; the
//! lease lock is held across the login so concurrent callers share one
//! in-flight login instead of racing.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::config::{VaultAuth, VaultConfig};
use super::dto::{
    AppRoleLoginRequest, AuthResponse, KvReadResponse, KvWriteOptions, KvWriteRequest,
    ListResponse, StoredTokenDto, TokenMetadataDto,
};
use crate::domain::ports::{
    RefreshTokenStore, RefreshTokenStoreError, SecretStoreHealth, SecretStoreProbe,
    SecretStoreStatus, StoredRefreshToken,
};
use crate::domain::{LoginContext, Username, fingerprint};

const TOKEN_HEADER: &str = "X-Vault-Token";
const RENEWAL_BUFFER_SECS: i64 = 300;

/// Errors raised by Vault requests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    /// Vault could not be reached or timed out.
    #[error("vault transport error: {0}")]
    Transport(String),
    /// AppRole login was rejected or returned an unusable lease.
    #[error("vault authentication failed: {0}")]
    Auth(String),
    /// Vault answered with a non-success status.
    #[error("vault returned status {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Start of the response body.
        message: String,
    },
    /// The response body did not match the expected shape.
    #[error("vault response could not be decoded: {0}")]
    Decode(String),
    /// The caller supplied an unusable argument.
    #[error("{0}")]
    InvalidArgument(String),
}

impl From<VaultError> for RefreshTokenStoreError {
    fn from(value: VaultError) -> Self {
        match &value {
            VaultError::Transport(_) | VaultError::Auth(_) => Self::unavailable(value.to_string()),
            VaultError::Status { status, .. } if *status == 503 => {
                Self::unavailable(value.to_string())
            }
            _ => Self::backend(value.to_string()),
        }
    }
}

/// Token bookkeeping without the token itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMetadata {
    /// When the token was stored.
    pub created_at: DateTime<Utc>,
    /// When the token was last read with a touch.
    pub last_used: DateTime<Utc>,
    /// Client address recorded at login.
    pub ip_address: Option<String>,
    /// Client user agent recorded at login.
    pub user_agent: Option<String>,
}

/// Snapshot of the client's own Vault token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenInfo {
    /// Whether a token is held.
    pub has_token: bool,
    /// Lease expiry; `None` for a fixed token or before the first login.
    pub token_expiry: Option<DateTime<Utc>>,
    /// Whether the lease is inside the renewal buffer.
    pub is_expiring_soon: bool,
}

struct Lease {
    token: Zeroizing<String>,
    expires_at: DateTime<Utc>,
}

struct Inner {
    http: Client,
    config: VaultConfig,
    clock: Arc<dyn Clock>,
    lease: Mutex<Option<Lease>>,
}

/// Cheaply cloneable Vault client.
#[derive(Clone)]
pub struct VaultClient {
    inner: Arc<Inner>,
}

impl VaultClient {
    /// Build a client for `config`.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(config: VaultConfig, clock: Arc<dyn Clock>) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            inner: Arc::new(Inner {
                http,
                config,
                clock,
                lease: Mutex::new(None),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/v1/{}", self.inner.config.address(), path.trim_start_matches('/'))
    }

    fn secret_path(&self, username: &Username) -> String {
        format!("{}/{}", self.inner.config.kv_path(), username)
    }

    async fn valid_token(&self) -> Result<Zeroizing<String>, VaultError> {
        let (role_id, secret_id) = match self.inner.config.auth() {
            VaultAuth::Token(token) => return Ok(token.clone()),
            VaultAuth::AppRole { role_id, secret_id } => (role_id, secret_id),
        };
        let mut lease = self.inner.lease.lock().await;
        let now = self.inner.clock.utc();
        if let Some(current) = lease.as_ref() {
            if now + Duration::seconds(RENEWAL_BUFFER_SECS) < current.expires_at {
                return Ok(current.token.clone());
            }
        }
        let fresh = self.login(role_id, secret_id, now).await?;
        let token = fresh.token.clone();
        *lease = Some(fresh);
        Ok(token)
    }

    async fn login(
        &self,
        role_id: &str,
        secret_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Lease, VaultError> {
        let response = self
            .inner
            .http
            .post(self.url("auth/approle/login"))
            .json(&AppRoleLoginRequest { role_id, secret_id })
            .send()
            .await
            .map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "vault approle login rejected");
            return Err(VaultError::Auth(format!("status {}: {}", status.as_u16(), body)));
        }
        let auth: AuthResponse = response
            .json()
            .await
            .map_err(|err| VaultError::Auth(format!("malformed login response: {err}")))?;
        info!(lease_seconds = auth.auth.lease_duration, "authenticated with vault via approle");
        Ok(Lease {
            token: Zeroizing::new(auth.auth.client_token),
            expires_at: now + Duration::seconds(auth.auth.lease_duration),
        })
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, VaultError> {
        let token = self.valid_token().await?;
        Ok(self
            .inner
            .http
            .request(method, self.url(path))
            .header(TOKEN_HEADER, token.as_str()))
    }

    async fn put_secret(
        &self,
        username: &Username,
        data: &StoredTokenDto,
        cas: Option<u64>,
    ) -> Result<(), VaultError> {
        let response = self
            .request(Method::PUT, &self.secret_path(username))
            .await?
            .json(&KvWriteRequest {
                data,
                options: cas.map(|version| KvWriteOptions { cas: version }),
            })
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(response).await.map(|_| ())
    }

    async fn read_secret(&self, username: &Username) -> Result<Option<StoredTokenDto>, VaultError> {
        Ok(self.read_versioned(username).await?.map(|(stored, _)| stored))
    }

    async fn read_versioned(
        &self,
        username: &Username,
    ) -> Result<Option<(StoredTokenDto, Option<u64>)>, VaultError> {
        let response = self
            .request(Method::GET, &self.secret_path(username))
            .await?
            .send()
            .await
            .map_err(map_transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body: KvReadResponse = decode(ensure_success(response).await?).await?;
        Ok(body.data.and_then(|data| {
            let version = data.metadata.and_then(|meta| meta.version);
            data.data.map(|stored| (stored, version))
        }))
    }

    /// Store `token` for `username` with fresh timestamps and the login
    /// context as metadata.
    pub async fn store_refresh_token(
        &self,
        username: &Username,
        token: &str,
        context: &LoginContext,
    ) -> Result<(), VaultError> {
        if token.is_empty() {
            return Err(VaultError::InvalidArgument(
                "refresh token must not be empty".to_owned(),
            ));
        }
        let now = self.inner.clock.utc();
        let data = StoredTokenDto {
            refresh_token: token.to_owned(),
            created_at: now,
            last_used: now,
            metadata: TokenMetadataDto {
                ip_address: context.ip_address.clone(),
                user_agent: context.user_agent.clone(),
            },
        };
        self.put_secret(username, &data, None).await?;
        info!(%username, token = %fingerprint(token), "refresh token stored in vault");
        Ok(())
    }

    /// Fetch the stored token for `username`.
    ///
    /// With `touch_last_used` the secret is rewritten with a fresh
    /// `last_used` in a background task; failures there are only logged.
    /// The rewrite is a check-and-set against the version just read, so a
    /// token rotated or deleted in the meantime is never restored. Secrets
    /// read without a version are not touched.
    pub async fn get_refresh_token(
        &self,
        username: &Username,
        touch_last_used: bool,
    ) -> Result<Option<StoredRefreshToken>, VaultError> {
        let Some((stored, version)) = self.read_versioned(username).await? else {
            return Ok(None);
        };
        if let (true, Some(read_version)) = (touch_last_used, version) {
            let client = self.clone();
            let owner = username.clone();
            let mut touched = stored.clone();
            touched.last_used = self.inner.clock.utc();
            tokio::spawn(async move {
                if let Err(err) = client.put_secret(&owner, &touched, Some(read_version)).await {
                    debug!(username = %owner, error = %err, "refresh token last_used not updated");
                }
            });
        }
        Ok(Some(StoredRefreshToken {
            token: stored.refresh_token,
            context: LoginContext {
                ip_address: stored.metadata.ip_address,
                user_agent: stored.metadata.user_agent,
            },
            created_at: Some(stored.created_at),
            last_used: Some(stored.last_used),
        }))
    }

    /// Timestamps and metadata for `username` without the token.
    pub async fn token_metadata(
        &self,
        username: &Username,
    ) -> Result<Option<TokenMetadata>, VaultError> {
        Ok(self.read_secret(username).await?.map(|stored| TokenMetadata {
            created_at: stored.created_at,
            last_used: stored.last_used,
            ip_address: stored.metadata.ip_address,
            user_agent: stored.metadata.user_agent,
        }))
    }

    /// Delete the token for `username`. A missing secret counts as deleted.
    ///
    /// Removes the metadata entry, so every version goes and the version
    /// counter resets; a pending check-and-set write cannot revive it.
    pub async fn delete_refresh_token(&self, username: &Username) -> Result<(), VaultError> {
        let path = format!("{}/{}", self.inner.config.metadata_path(), username);
        let response = self
            .request(Method::DELETE, &path)
            .await?
            .send()
            .await
            .map_err(map_transport_error)?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%username, "no refresh token to delete");
            return Ok(());
        }
        ensure_success(response).await?;
        info!(%username, "refresh token deleted from vault");
        Ok(())
    }

    /// Usernames that currently hold a token.
    pub async fn list_usernames(&self) -> Result<Vec<String>, VaultError> {
        let response = self
            .request(Method::GET, &self.inner.config.metadata_path())
            .await?
            .query(&[("list", "true")])
            .send()
            .await
            .map_err(map_transport_error)?;
        // Vault answers 404 for a path with no keys.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let body: ListResponse = decode(ensure_success(response).await?).await?;
        Ok(body.data.keys)
    }

    /// Delete tokens whose `last_used` is older than `max_age_hours`.
    ///
    /// Failures for individual users are logged and skipped. Returns the
    /// number of tokens removed.
    pub async fn cleanup_expired(&self, max_age_hours: i64) -> Result<usize, VaultError> {
        if max_age_hours <= 0 {
            return Err(VaultError::InvalidArgument(
                "max_age_hours must be a positive number".to_owned(),
            ));
        }
        let cutoff = self.inner.clock.utc() - Duration::hours(max_age_hours);
        let mut removed = 0;
        for key in self.list_usernames().await? {
            let Ok(username) = Username::new(key.clone()) else {
                warn!(key, "skipping vault key that is not a username");
                continue;
            };
            match self.token_metadata(&username).await {
                Ok(Some(metadata)) if metadata.last_used < cutoff => {
                    match self.delete_refresh_token(&username).await {
                        Ok(()) => removed += 1,
                        Err(err) => warn!(%username, error = %err, "failed to remove stale token"),
                    }
                }
                Ok(_) => {}
                Err(err) => warn!(%username, error = %err, "failed to inspect token"),
            }
        }
        info!(removed, max_age_hours, "refresh token cleanup finished");
        Ok(removed)
    }

    /// Lease state of the client's own Vault token.
    pub async fn token_info(&self) -> TokenInfo {
        if matches!(self.inner.config.auth(), VaultAuth::Token(_)) {
            return TokenInfo {
                has_token: true,
                token_expiry: None,
                is_expiring_soon: false,
            };
        }
        let lease = self.inner.lease.lock().await;
        let now = self.inner.clock.utc();
        lease.as_ref().map_or(
            TokenInfo {
                has_token: false,
                token_expiry: None,
                is_expiring_soon: false,
            },
            |current| TokenInfo {
                has_token: true,
                token_expiry: Some(current.expires_at),
                is_expiring_soon: current.expires_at - now
                    < Duration::seconds(RENEWAL_BUFFER_SECS),
            },
        )
    }

    /// Probe `/v1/sys/health` and `/v1/auth/token/lookup-self`.
    pub async fn health(&self) -> SecretStoreHealth {
        let timestamp = self.inner.clock.utc();
        match self.probe().await {
            Ok(store_status) => SecretStoreHealth {
                status: SecretStoreStatus::Healthy,
                store_status: Some(store_status),
                authenticated: true,
                error: None,
                timestamp,
            },
            Err(err) => {
                warn!(error = %err, "vault health check failed");
                SecretStoreHealth {
                    status: SecretStoreStatus::Unhealthy,
                    store_status: None,
                    authenticated: false,
                    error: Some(err.to_string()),
                    timestamp,
                }
            }
        }
    }

    async fn probe(&self) -> Result<serde_json::Value, VaultError> {
        let token = self.valid_token().await?;
        let health = self
            .inner
            .http
            .get(self.url("sys/health"))
            .send()
            .await
            .map_err(map_transport_error)?;
        let status: serde_json::Value = decode(ensure_success(health).await?).await?;
        let lookup = self
            .inner
            .http
            .get(self.url("auth/token/lookup-self"))
            .header(TOKEN_HEADER, token.as_str())
            .send()
            .await
            .map_err(map_transport_error)?;
        ensure_success(lookup).await?;
        Ok(status)
    }
}

fn map_transport_error(error: reqwest::Error) -> VaultError {
    VaultError::Transport(error.to_string())
}

async fn ensure_success(response: Response) -> Result<Response, VaultError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(VaultError::Status {
        status: status.as_u16(),
        message: body.chars().take(160).collect(),
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, VaultError> {
    response
        .json()
        .await
        .map_err(|err| VaultError::Decode(err.to_string()))
}

#[async_trait]
impl RefreshTokenStore for VaultClient {
    async fn store(
        &self,
        username: &Username,
        token: &str,
        context: &LoginContext,
    ) -> Result<(), RefreshTokenStoreError> {
        Ok(self.store_refresh_token(username, token, context).await?)
    }

    async fn get(
        &self,
        username: &Username,
    ) -> Result<Option<StoredRefreshToken>, RefreshTokenStoreError> {
        // Callers rewrite or delete the token straight after reading it.
        Ok(self.get_refresh_token(username, false).await?)
    }

    async fn delete(&self, username: &Username) -> Result<(), RefreshTokenStoreError> {
        Ok(self.delete_refresh_token(username).await?)
    }
}

#[async_trait]
impl SecretStoreProbe for VaultClient {
    async fn check(&self) -> SecretStoreHealth {
        self.health().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(VaultError::Transport("refused".into()), true)]
    #[case(VaultError::Auth("denied".into()), true)]
    #[case(VaultError::Status { status: 503, message: "sealed".into() }, true)]
    #[case(VaultError::Status { status: 403, message: "denied".into() }, false)]
    #[case(VaultError::Decode("eof".into()), false)]
    fn outages_map_to_unavailable(#[case] error: VaultError, #[case] unavailable: bool) {
        let mapped = RefreshTokenStoreError::from(error);
        assert_eq!(
            matches!(mapped, RefreshTokenStoreError::Unavailable { .. }),
            unavailable
        );
    }
}
