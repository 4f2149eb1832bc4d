//! Port for the append-only record store.
//!
//! Every read returns versions ordered by `created_at` descending; adapters
//! are expected to push that ordering into the store's query.

use async_trait::async_trait;

use crate::domain::{NewRecord, Record, RecordId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by record store adapters.
    pub enum RecordPersistenceError {
        /// The document store could not be reached.
        Connection { message: String } => "record store connection failed: {message}",
        /// Query or insert failed during execution.
        Query { message: String } => "record store query failed: {message}",
        /// A stored document could not be decoded into a record.
        Decode { message: String } => "stored record is malformed: {message}",
    }
}

/// Record version storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordRepository: Send + Sync {
    /// Append a version and return it with its storage id.
    async fn insert(&self, record: NewRecord) -> Result<Record, RecordPersistenceError>;

    /// Every version of every record, newest first.
    async fn list_all(&self) -> Result<Vec<Record>, RecordPersistenceError>;

    /// Newest version of `record_id`, if any.
    async fn find_latest(
        &self,
        record_id: &RecordId,
    ) -> Result<Option<Record>, RecordPersistenceError>;

    /// Every version of `record_id`, newest first.
    async fn find_history(
        &self,
        record_id: &RecordId,
    ) -> Result<Vec<Record>, RecordPersistenceError>;
}

impl From<RecordPersistenceError> for crate::domain::Error {
    fn from(value: RecordPersistenceError) -> Self {
        tracing::error!(error = %value, "record store failure");
        match value {
            RecordPersistenceError::Connection { .. } => {
                Self::service_unavailable("record store unavailable")
            }
            RecordPersistenceError::Query { .. } | RecordPersistenceError::Decode { .. } => {
                Self::internal("record store error")
            }
        }
    }
}
