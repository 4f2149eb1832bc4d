//! Document store connection bootstrap.

use mongodb::bson::doc;
use mongodb::{Client, Database};
use tracing::info;

/// Errors raised while connecting to the document store.
#[derive(Debug, thiserror::Error)]
pub enum DocumentStoreError {
    /// The URI could not be parsed or resolved.
    #[error("invalid document store URI: {0}")]
    Uri(String),
    /// The server did not answer the initial ping.
    #[error("document store ping failed: {0}")]
    Ping(String),
    /// Index creation failed.
    #[error("failed to prepare collection indexes: {0}")]
    Index(String),
}

/// Connect to `uri`, select `database` and ping it.
///
/// A failed ping aborts startup rather than deferring the error to the first
/// request.
pub async fn connect(uri: &str, database: &str) -> Result<Database, DocumentStoreError> {
    let client = Client::with_uri_str(uri)
        .await
        .map_err(|err| DocumentStoreError::Uri(err.to_string()))?;
    let db = client.database(database);
    db.run_command(doc! { "ping": 1 })
        .await
        .map_err(|err| DocumentStoreError::Ping(err.to_string()))?;
    info!(database, "connected to document store");
    Ok(db)
}
