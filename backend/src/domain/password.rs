//! Password hashing with bcrypt.
//!
//! Both operations run on the blocking pool.

use tokio::task;
use zeroize::Zeroizing;

use crate::domain::user::PasswordHash;
use crate::domain::Error;

/// Work factor used for stored passwords.
pub const DEFAULT_COST: u32 = 12;
/// Lowest work factor bcrypt accepts.
pub const MIN_COST: u32 = 4;

/// Hashes and verifies passwords.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl PasswordHasher {
    /// Use a custom cost. Tests use [`MIN_COST`] to stay fast.
    #[must_use]
    pub const fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    /// Hash `password` with a fresh salt.
    pub async fn hash(&self, password: &str) -> Result<PasswordHash, Error> {
        let cost = self.cost;
        let secret = Zeroizing::new(password.to_owned());
        let joined = task::spawn_blocking(move || bcrypt::hash(secret.as_str(), cost)).await;
        match joined {
            Ok(Ok(hash)) => Ok(PasswordHash::new(hash)),
            Ok(Err(err)) => Err(hashing_failure(&err.to_string())),
            Err(err) => Err(hashing_failure(&err.to_string())),
        }
    }

    /// Check `password` against a stored hash. Malformed hashes never match.
    pub async fn verify(&self, password: &str, hash: &PasswordHash) -> Result<bool, Error> {
        let secret = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        let joined =
            task::spawn_blocking(move || bcrypt::verify(secret.as_str(), &encoded)).await;
        match joined {
            Ok(Ok(matches)) => Ok(matches),
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "stored password hash could not be parsed");
                Ok(false)
            }
            Err(err) => Err(hashing_failure(&err.to_string())),
        }
    }
}

fn hashing_failure(detail: &str) -> Error {
    tracing::error!(error = %detail, "password hashing failed");
    Error::internal("password hashing failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> PasswordHasher {
        PasswordHasher::with_cost(MIN_COST)
    }

    #[rstest]
    #[tokio::test]
    async fn verifies_matching_password(hasher: PasswordHasher) {
        let hash = hasher.hash("correct horse").await.expect("hash");
        assert!(hash.as_str().starts_with("$2"));
        assert!(hasher.verify("correct horse", &hash).await.expect("verify"));
        assert!(!hasher.verify("wrong horse", &hash).await.expect("verify"));
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_hash_never_matches(hasher: PasswordHasher) {
        let hash = PasswordHash::new("plaintext");
        assert!(!hasher.verify("plaintext", &hash).await.expect("verify"));
    }
}
