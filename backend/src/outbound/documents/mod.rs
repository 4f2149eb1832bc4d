//! MongoDB adapters for the append-only record store.

mod connection;
mod mongo_record_repository;
mod record_document;

pub use connection::{DocumentStoreError, connect};
pub use mongo_record_repository::{MongoRecordRepository, RECORDS_COLLECTION};
