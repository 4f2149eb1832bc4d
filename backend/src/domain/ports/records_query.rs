//! Driving port for reading record versions.

use async_trait::async_trait;

use crate::domain::{Error, Record, RecordId, RecordView};

/// Record read use-cases.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecordsQuery: Send + Sync {
    /// All versions, or the newest per record when `view` is
    /// [`RecordView::Latest`]. Always newest first.
    async fn list(&self, view: RecordView) -> Result<Vec<Record>, Error>;

    /// Newest version of `record_id`.
    async fn latest(&self, record_id: &RecordId) -> Result<Record, Error>;

    /// Every version of `record_id`, newest first. Never empty on success.
    async fn history(&self, record_id: &RecordId) -> Result<Vec<Record>, Error>;
}
