//! Shared HTTP adapter state.
//!
//! Handlers receive this via `web::Data` and depend only on driving ports,
//! so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AuthSessionService, RecordsCommand, RecordsQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Registration, login and token lifecycle.
    pub auth: Arc<dyn AuthSessionService>,
    /// Record writes.
    pub records: Arc<dyn RecordsCommand>,
    /// Record reads.
    pub records_query: Arc<dyn RecordsQuery>,
}

impl HttpState {
    /// Bundle the driving ports.
    #[must_use]
    pub const fn new(
        auth: Arc<dyn AuthSessionService>,
        records: Arc<dyn RecordsCommand>,
        records_query: Arc<dyn RecordsQuery>,
    ) -> Self {
        Self {
            auth,
            records,
            records_query,
        }
    }
}
