//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL users and fallback refresh token storage via
//!   Diesel.
//! - **documents**: MongoDB record versions.
//! - **vault**: HashiCorp Vault refresh token storage.
//! - **memory**: process-local adapters for development and tests.
//!
//! Adapters are thin translators that convert between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod documents;
pub mod memory;
pub mod persistence;
pub mod vault;
