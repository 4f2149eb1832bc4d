//! Refresh token storage in the `users` table.
//!
//! Used when no secret store is configured. The token and its login
//! context live in nullable columns on the user's row; deleting clears them.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use mockable::Clock;

use crate::domain::ports::{RefreshTokenStore, RefreshTokenStoreError, StoredRefreshToken};
use crate::domain::{LoginContext, Username};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{RefreshTokenRow, RefreshTokenUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed refresh token store.
#[derive(Clone)]
pub struct DieselRefreshTokenStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselRefreshTokenStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    async fn write(
        &self,
        username: &Username,
        update: RefreshTokenUpdate<'_>,
    ) -> Result<usize, RefreshTokenStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.filter(users::username.eq(username.as_ref())))
            .set(&update)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)
    }
}

fn map_pool_error(error: PoolError) -> RefreshTokenStoreError {
    RefreshTokenStoreError::unavailable(error.into_message())
}

fn map_diesel_error(error: diesel::result::Error) -> RefreshTokenStoreError {
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => RefreshTokenStoreError::unavailable(message),
        DieselFailure::UniqueViolation(_) => RefreshTokenStoreError::backend("unexpected conflict"),
        DieselFailure::Query(message) => RefreshTokenStoreError::backend(message),
    }
}

fn row_to_stored(row: RefreshTokenRow) -> Option<StoredRefreshToken> {
    let RefreshTokenRow {
        refresh_token,
        refresh_token_ip,
        refresh_token_user_agent,
        refresh_token_issued_at,
        refresh_token_last_used,
    } = row;
    refresh_token.map(|token| StoredRefreshToken {
        token,
        context: LoginContext {
            ip_address: refresh_token_ip,
            user_agent: refresh_token_user_agent,
        },
        created_at: refresh_token_issued_at,
        last_used: refresh_token_last_used,
    })
}

#[async_trait]
impl RefreshTokenStore for DieselRefreshTokenStore {
    async fn store(
        &self,
        username: &Username,
        token: &str,
        context: &LoginContext,
    ) -> Result<(), RefreshTokenStoreError> {
        let now = self.clock.utc();
        let updated = self
            .write(
                username,
                RefreshTokenUpdate {
                    refresh_token: Some(token),
                    refresh_token_ip: context.ip_address.as_deref(),
                    refresh_token_user_agent: context.user_agent.as_deref(),
                    refresh_token_issued_at: Some(now),
                    refresh_token_last_used: Some(now),
                },
            )
            .await?;
        if updated == 0 {
            return Err(RefreshTokenStoreError::backend(format!(
                "no user named {username}"
            )));
        }
        Ok(())
    }

    async fn get(
        &self,
        username: &Username,
    ) -> Result<Option<StoredRefreshToken>, RefreshTokenStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username.as_ref()))
            .select(RefreshTokenRow::as_select())
            .first::<RefreshTokenRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.and_then(row_to_stored))
    }

    async fn delete(&self, username: &Username) -> Result<(), RefreshTokenStoreError> {
        self.write(
            username,
            RefreshTokenUpdate {
                refresh_token: None,
                refresh_token_ip: None,
                refresh_token_user_agent: None,
                refresh_token_issued_at: None,
                refresh_token_last_used: None,
            },
        )
        .await
        .map(|_| ())
    }
}
