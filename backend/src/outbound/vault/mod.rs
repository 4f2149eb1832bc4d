//! HashiCorp Vault adapter for refresh token storage.
//!
//! Tokens live in a KV v2 engine, one secret per username. The client
//! authenticates with AppRole (or a fixed token in development), keeps the
//! lease cached and implements [`RefreshTokenStore`] and
//! [`SecretStoreProbe`].
//!
//! [`RefreshTokenStore`]: crate::domain::ports::RefreshTokenStore
//! [`SecretStoreProbe`]: crate::domain::ports::SecretStoreProbe

mod cleanup;
mod client;
mod config;
mod dto;

pub use cleanup::{DEFAULT_CLEANUP_INTERVAL, DEFAULT_MAX_TOKEN_AGE_HOURS, spawn_cleanup};
pub use client::{TokenInfo, TokenMetadata, VaultClient, VaultError};
pub use config::{DEFAULT_KV_PATH, DEFAULT_VAULT_ADDRESS, VaultAuth, VaultConfig, VaultConfigError};
