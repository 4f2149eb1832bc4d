//! In-memory `UserRepository`.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::RwLock;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, NewUser, User, UserId, Username};

/// Users kept in a vector; lookups are linear scans.
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryUserRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            clock,
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: NewUser) -> Result<User, UserPersistenceError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(UserPersistenceError::duplicate("email"));
        }
        if users.iter().any(|u| u.username == user.username) {
            return Err(UserPersistenceError::duplicate("username"));
        }
        let stored = User::from_new(user, self.clock.utc());
        users.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.users.read().await.iter().find(|u| &u.id == id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| &u.email == email)
            .cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| &u.username == username)
            .cloned())
    }
}
