//! Driving port for appending record versions.

use async_trait::async_trait;

use crate::domain::{Error, Record, RecordDraft};

/// Record mutation use-case.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordsCommand: Send + Sync {
    /// Append a version described by `draft` and return the stored record.
    async fn append(&self, draft: RecordDraft) -> Result<Record, Error>;
}
