//! MongoDB-backed `RecordRepository`.
//!
//! Versions are never updated in place. Ordering is pushed into the query via
//! `sort({ createdAt: -1, _id: -1 })`, served by the `(recordId, createdAt
//! desc)` index. The `_id` key orders versions stamped in the same
//! millisecond the same way the service does.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, Document, doc};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::{Collection, Database, IndexModel};
use tracing::debug;

use crate::domain::ports::{RecordPersistenceError, RecordRepository};
use crate::domain::{NewRecord, Record, RecordId};

use super::connection::DocumentStoreError;
use super::record_document::RecordDocument;

/// Collection holding record versions.
pub const RECORDS_COLLECTION: &str = "records";

/// Record repository over the `records` collection.
#[derive(Clone)]
pub struct MongoRecordRepository {
    collection: Collection<RecordDocument>,
}

impl MongoRecordRepository {
    /// Wrap the `records` collection of `db`.
    #[must_use]
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(RECORDS_COLLECTION),
        }
    }

    /// Create the history index if it is missing.
    pub async fn ensure_indexes(&self) -> Result<(), DocumentStoreError> {
        let index = IndexModel::builder()
            .keys(doc! { "recordId": 1, "createdAt": -1 })
            .build();
        self.collection
            .create_index(index)
            .await
            .map(|_| ())
            .map_err(|err| DocumentStoreError::Index(err.to_string()))
    }
}

fn newest_first() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

fn by_record(record_id: &RecordId) -> Document {
    doc! { "recordId": record_id.as_ref() }
}

fn map_mongo_error(error: MongoError) -> RecordPersistenceError {
    match error.kind.as_ref() {
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => {
            RecordPersistenceError::connection(error.to_string())
        }
        _ => RecordPersistenceError::query(error.to_string()),
    }
}

fn decode_all(documents: Vec<RecordDocument>) -> Result<Vec<Record>, RecordPersistenceError> {
    documents.into_iter().map(RecordDocument::into_record).collect()
}

#[async_trait]
impl RecordRepository for MongoRecordRepository {
    async fn insert(&self, record: NewRecord) -> Result<Record, RecordPersistenceError> {
        let mut document = RecordDocument::from_new(&record);
        let result = self
            .collection
            .insert_one(&document)
            .await
            .map_err(map_mongo_error)?;
        let Bson::ObjectId(id) = result.inserted_id else {
            return Err(RecordPersistenceError::decode(
                "insert returned a non-ObjectId _id",
            ));
        };
        debug!(record_id = %record.record_id, id = %id, "record version inserted");
        document.id = Some(id);
        document.into_record()
    }

    async fn list_all(&self) -> Result<Vec<Record>, RecordPersistenceError> {
        let documents: Vec<RecordDocument> = self
            .collection
            .find(doc! {})
            .sort(newest_first())
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;
        decode_all(documents)
    }

    async fn find_latest(
        &self,
        record_id: &RecordId,
    ) -> Result<Option<Record>, RecordPersistenceError> {
        let document = self
            .collection
            .find_one(by_record(record_id))
            .sort(newest_first())
            .await
            .map_err(map_mongo_error)?;
        document.map(RecordDocument::into_record).transpose()
    }

    async fn find_history(
        &self,
        record_id: &RecordId,
    ) -> Result<Vec<Record>, RecordPersistenceError> {
        let documents: Vec<RecordDocument> = self
            .collection
            .find(by_record(record_id))
            .sort(newest_first())
            .await
            .map_err(map_mongo_error)?
            .try_collect()
            .await
            .map_err(map_mongo_error)?;
        decode_all(documents)
    }
}
