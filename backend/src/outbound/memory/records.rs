//! In-memory `RecordRepository`.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{RecordPersistenceError, RecordRepository};
use crate::domain::{NewRecord, Record, RecordId, sort_newest_first};

/// Append-only vector of record versions.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    records: RwLock<Vec<Record>>,
}

impl InMemoryRecordRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    async fn matching(&self, record_id: &RecordId) -> Vec<Record> {
        let mut versions: Vec<Record> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| &r.record_id == record_id)
            .cloned()
            .collect();
        sort_newest_first(&mut versions);
        versions
    }
}

#[async_trait]
impl RecordRepository for InMemoryRecordRepository {
    async fn insert(&self, record: NewRecord) -> Result<Record, RecordPersistenceError> {
        let stored = Record {
            id: RecordId::generate(record.created_at),
            record_id: record.record_id,
            record_type: record.record_type,
            description: record.description,
            created_at: record.created_at,
        };
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<Record>, RecordPersistenceError> {
        let mut all = self.records.read().await.clone();
        sort_newest_first(&mut all);
        Ok(all)
    }

    async fn find_latest(
        &self,
        record_id: &RecordId,
    ) -> Result<Option<Record>, RecordPersistenceError> {
        Ok(self.matching(record_id).await.into_iter().next())
    }

    async fn find_history(
        &self,
        record_id: &RecordId,
    ) -> Result<Vec<Record>, RecordPersistenceError> {
        Ok(self.matching(record_id).await)
    }
}
