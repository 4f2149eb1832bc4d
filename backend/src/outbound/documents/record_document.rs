//! BSON shape of a stored record version.

use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};

use crate::domain::ports::RecordPersistenceError;
use crate::domain::{NewRecord, Record, RecordId, RecordType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RecordDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    /// Stored as the 24-hex string, the form existing collections hold.
    pub record_id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn record_id(raw: &str) -> Result<RecordId, RecordPersistenceError> {
    raw.parse()
        .map_err(|err: crate::domain::RecordValidationError| {
            RecordPersistenceError::decode(err.to_string())
        })
}

impl RecordDocument {
    /// Build the document for `record`. BSON dates carry milliseconds, so
    /// the timestamp is truncated here to keep the echoed record faithful.
    #[must_use]
    pub fn from_new(record: &NewRecord) -> Self {
        let created_at = mongodb::bson::DateTime::from_chrono(record.created_at).to_chrono();
        Self {
            id: None,
            record_id: record.record_id.as_ref().to_owned(),
            record_type: record.record_type.as_str().to_owned(),
            description: record.description.clone(),
            created_at,
        }
    }

    pub fn into_record(self) -> Result<Record, RecordPersistenceError> {
        let id = self
            .id
            .ok_or_else(|| RecordPersistenceError::decode("document has no _id"))?;
        let record_type: RecordType = self
            .record_type
            .parse()
            .map_err(|_| RecordPersistenceError::decode(format!("unknown type {}", self.record_type)))?;
        Ok(Record {
            id: record_id(&id.to_hex())?,
            record_id: record_id(&self.record_id)?,
            record_type,
            description: self.description,
            created_at: self.created_at,
        })
    }
}
