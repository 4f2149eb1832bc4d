//! Port for probing the secret store behind refresh token storage.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Outcome of a secret store health probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SecretStoreStatus {
    /// Reachable and accepting our credentials.
    Healthy,
    /// Unreachable, sealed or refusing our credentials.
    Unhealthy,
}

/// Health report returned by `GET /health/secrets`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreHealth {
    /// Overall verdict.
    pub status: SecretStoreStatus,
    /// Raw status payload reported by the store, when reachable.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub store_status: Option<serde_json::Value>,
    /// Whether the client holds a usable token.
    pub authenticated: bool,
    /// Failure detail when unhealthy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the check ran.
    pub timestamp: DateTime<Utc>,
}

impl SecretStoreHealth {
    /// Whether the probe succeeded.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == SecretStoreStatus::Healthy
    }
}

/// Connectivity and authentication probe for the secret store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStoreProbe: Send + Sync {
    /// Check reachability and that the client's credentials are accepted.
    async fn check(&self) -> SecretStoreHealth;
}
