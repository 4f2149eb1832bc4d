//! Record versioning service implementing [`RecordsCommand`] and
//! [`RecordsQuery`].

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::ports::{RecordRepository, RecordsCommand, RecordsQuery};
use crate::domain::{
    Error, HISTORY_NOT_FOUND, NewRecord, RECORD_NOT_FOUND, Record, RecordDraft, RecordId,
    RecordType, RecordView, latest_versions, sort_newest_first,
};

/// Service over a [`RecordRepository`].
#[derive(Clone)]
pub struct RecordsService<R: ?Sized> {
    repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> RecordsService<R> {
    /// Create a service stamping versions with `clock`.
    #[must_use]
    pub fn new(repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }
}

#[async_trait]
impl<R> RecordsCommand for RecordsService<R>
where
    R: RecordRepository + ?Sized,
{
    async fn append(&self, draft: RecordDraft) -> Result<Record, Error> {
        let now = self.clock.utc();
        let new_record = match draft {
            RecordDraft::New { description } => NewRecord {
                record_id: RecordId::generate(now),
                record_type: RecordType::New,
                description,
                created_at: now,
            },
            RecordDraft::Updated {
                record_id,
                description,
            } => {
                if self.repo.find_latest(&record_id).await?.is_none() {
                    return Err(Error::not_found(RECORD_NOT_FOUND));
                }
                NewRecord {
                    record_id,
                    record_type: RecordType::Updated,
                    description,
                    created_at: now,
                }
            }
        };
        let stored = self.repo.insert(new_record).await?;
        info!(
            record_id = %stored.record_id,
            version = %stored.id,
            record_type = stored.record_type.as_str(),
            "record version appended"
        );
        Ok(stored)
    }
}

#[async_trait]
impl<R> RecordsQuery for RecordsService<R>
where
    R: RecordRepository + ?Sized,
{
    async fn list(&self, view: RecordView) -> Result<Vec<Record>, Error> {
        let mut records = self.repo.list_all().await?;
        Ok(match view {
            RecordView::All => {
                sort_newest_first(&mut records);
                records
            }
            RecordView::Latest => latest_versions(records),
        })
    }

    async fn latest(&self, record_id: &RecordId) -> Result<Record, Error> {
        self.repo
            .find_latest(record_id)
            .await?
            .ok_or_else(|| Error::not_found(RECORD_NOT_FOUND))
    }

    async fn history(&self, record_id: &RecordId) -> Result<Vec<Record>, Error> {
        let mut records = self.repo.find_history(record_id).await?;
        if records.is_empty() {
            return Err(Error::not_found(HISTORY_NOT_FOUND));
        }
        sort_newest_first(&mut records);
        Ok(records)
    }
}

#[cfg(test)]
mod tests;
