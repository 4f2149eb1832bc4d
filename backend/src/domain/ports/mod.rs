//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `RecordRepository`, `RefreshTokenStore`,
//! `SecretStoreProbe`) are implemented by outbound adapters. Driving ports
//! (`AuthSessionService`, `RecordsCommand`, `RecordsQuery`) are implemented
//! by domain services and called by inbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_session;
mod record_repository;
mod records_command;
mod records_query;
mod refresh_token_store;
mod secret_store_health;
mod user_repository;

#[cfg(test)]
pub use auth_session::MockAuthSessionService;
pub use auth_session::{AuthSessionService, IssuedSession};
#[cfg(test)]
pub use record_repository::MockRecordRepository;
pub use record_repository::{RecordPersistenceError, RecordRepository};
#[cfg(test)]
pub use records_command::MockRecordsCommand;
pub use records_command::RecordsCommand;
#[cfg(test)]
pub use records_query::MockRecordsQuery;
pub use records_query::RecordsQuery;
#[cfg(test)]
pub use refresh_token_store::MockRefreshTokenStore;
pub use refresh_token_store::{RefreshTokenStore, RefreshTokenStoreError, StoredRefreshToken};
#[cfg(test)]
pub use secret_store_health::MockSecretStoreProbe;
pub use secret_store_health::{SecretStoreHealth, SecretStoreProbe, SecretStoreStatus};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
mod tests;
