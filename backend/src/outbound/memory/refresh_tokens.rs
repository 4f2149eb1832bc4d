//! In-memory `RefreshTokenStore`.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::ports::{RefreshTokenStore, RefreshTokenStoreError, StoredRefreshToken};
use crate::domain::{LoginContext, Username};

/// Tokens keyed by username.
pub struct InMemoryRefreshTokenStore {
    tokens: RwLock<HashMap<Username, StoredRefreshToken>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRefreshTokenStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tokens: RwLock::new(HashMap::new()),
            clock,
        }
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn store(
        &self,
        username: &Username,
        token: &str,
        context: &LoginContext,
    ) -> Result<(), RefreshTokenStoreError> {
        let now = self.clock.utc();
        self.tokens.write().await.insert(
            username.clone(),
            StoredRefreshToken {
                token: token.to_owned(),
                context: context.clone(),
                created_at: Some(now),
                last_used: Some(now),
            },
        );
        Ok(())
    }

    async fn get(
        &self,
        username: &Username,
    ) -> Result<Option<StoredRefreshToken>, RefreshTokenStoreError> {
        let mut tokens = self.tokens.write().await;
        let now = self.clock.utc();
        Ok(tokens.get_mut(username).map(|stored| {
            stored.last_used = Some(now);
            stored.clone()
        }))
    }

    async fn delete(&self, username: &Username) -> Result<(), RefreshTokenStoreError> {
        self.tokens.write().await.remove(username);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockable::DefaultClock;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn store_replaces_and_delete_is_idempotent() {
        let store = InMemoryRefreshTokenStore::new(Arc::new(DefaultClock));
        let username = Username::new("ada").expect("username");
        store
            .store(&username, "one", &LoginContext::default())
            .await
            .expect("store");
        store
            .store(&username, "two", &LoginContext::default())
            .await
            .expect("store");
        let stored = store.get(&username).await.expect("get").expect("present");
        assert_eq!(stored.token, "two");
        store.delete(&username).await.expect("delete");
        store.delete(&username).await.expect("delete again");
        assert!(store.get(&username).await.expect("get").is_none());
    }
}
