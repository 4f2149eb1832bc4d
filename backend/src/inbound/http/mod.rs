//! HTTP inbound adapter exposing the REST endpoints.
//!
//! Handlers depend on the driving ports bundled in [`state::HttpState`];
//! every failure is rendered through the domain error envelope.

pub mod access_token;
pub mod auth;
pub mod error;
pub mod health;
pub mod records;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
