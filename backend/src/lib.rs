//! recordkeeper: JWT sessions and append-only record versioning behind a
//! server-rendered document shell.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the types,
//! services and ports; [`inbound`] adapts HTTP requests onto the driving
//! ports; [`outbound`] implements the driven ports for PostgreSQL, MongoDB,
//! Vault and memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
