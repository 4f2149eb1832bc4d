//! Append-only record versions.
//!
//! A logical record is identified by a [`RecordId`]. Every change appends a
//! new [`Record`] version; nothing is updated in place. The latest version is
//! the one with the greatest `created_at`, and the history is every version
//! ordered newest first.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Length of a record or document id in hex characters.
pub const OBJECT_ID_HEX_LEN: usize = 24;
const OBJECT_ID_BYTES: usize = 12;

/// Message returned when a path id is not a valid record id.
pub const INVALID_RECORD_ID: &str = "Invalid record ID";
/// Message returned when the latest version of a record is missing.
pub const RECORD_NOT_FOUND: &str = "Record not found";
/// Message returned when a record has no history.
pub const HISTORY_NOT_FOUND: &str = "Records not found by id";

/// Validation errors for record payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordValidationError {
    /// The id is not 24 hex characters.
    #[error("Invalid record ID")]
    InvalidId,
    /// No `type` was supplied.
    #[error("type is required")]
    MissingType,
    /// `type` is neither `NEW` nor `UPDATED`.
    #[error("type must be NEW or UPDATED")]
    UnknownType,
    /// An `UPDATED` version did not name its record.
    #[error("recordId is required for UPDATED records")]
    MissingRecordId,
}

/// 24-character lower-case hex identifier, compatible with document-store
/// object ids.
///
/// # Examples
/// ```
/// use recordkeeper::domain::RecordId;
///
/// let id: RecordId = "65F0A1B2C3D4E5F60718293A".parse().expect("valid id");
/// assert_eq!(id.as_ref(), "65f0a1b2c3d4e5f60718293a");
/// assert!("xyz".parse::<RecordId>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "65f0a1b2c3d4e5f60718293a")]
pub struct RecordId(String);

impl RecordId {
    /// Allocate a new id: four big-endian timestamp bytes followed by eight
    /// random bytes, hex encoded.
    #[must_use]
    #[expect(
        clippy::big_endian_bytes,
        reason = "object ids lead with a big-endian timestamp so they sort by creation"
    )]
    pub fn generate(now: DateTime<Utc>) -> Self {
        let seconds = u32::try_from(now.timestamp()).unwrap_or(u32::MAX);
        let random = Uuid::new_v4();
        let mut bytes = Vec::with_capacity(OBJECT_ID_BYTES);
        bytes.extend_from_slice(&seconds.to_be_bytes());
        bytes.extend_from_slice(random.as_bytes().get(..8).unwrap_or_default());
        Self(hex::encode(bytes))
    }
}

impl FromStr for RecordId {
    type Err = RecordValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.len() == OBJECT_ID_HEX_LEN && raw.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(raw.to_ascii_lowercase()))
        } else {
            Err(RecordValidationError::InvalidId)
        }
    }
}

impl TryFrom<String> for RecordId {
    type Error = RecordValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RecordId> for String {
    fn from(value: RecordId) -> Self {
        value.0
    }
}

impl AsRef<str> for RecordId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Kind of change a version represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    /// First version of a new logical record.
    New,
    /// Later version of an existing record.
    Updated,
}

impl RecordType {
    /// Wire name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "NEW",
            Self::Updated => "UPDATED",
        }
    }
}

impl FromStr for RecordType {
    type Err = RecordValidationError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim() {
            "" => Err(RecordValidationError::MissingType),
            "NEW" => Ok(Self::New),
            "UPDATED" => Ok(Self::Updated),
            _ => Err(RecordValidationError::UnknownType),
        }
    }
}

/// A stored record version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Storage id of this version.
    #[serde(rename = "_id")]
    pub id: RecordId,
    /// Logical record this version belongs to.
    pub record_id: RecordId,
    /// Whether this version opened the record or changed it.
    #[serde(rename = "type")]
    pub record_type: RecordType,
    /// Free-form text carried by this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the version was stored.
    pub created_at: DateTime<Utc>,
}

/// A version about to be appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    /// Logical record the version joins.
    pub record_id: RecordId,
    /// Kind of change.
    pub record_type: RecordType,
    /// Free-form text.
    pub description: Option<String>,
    /// Stamp assigned by the service.
    pub created_at: DateTime<Utc>,
}

/// Validated append request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordDraft {
    /// Start a new logical record.
    New {
        /// Text of the first version.
        description: Option<String>,
    },
    /// Append a version to an existing record.
    Updated {
        /// Record receiving the version.
        record_id: RecordId,
        /// Text of the new version.
        description: Option<String>,
    },
}

impl RecordDraft {
    /// Validate raw request fields.
    ///
    /// # Examples
    /// ```
    /// use recordkeeper::domain::{RecordDraft, RecordValidationError};
    ///
    /// assert!(RecordDraft::try_from_parts(Some("NEW"), None, None).is_ok());
    /// assert_eq!(
    ///     RecordDraft::try_from_parts(Some("UPDATED"), None, None),
    ///     Err(RecordValidationError::MissingRecordId),
    /// );
    /// ```
    pub fn try_from_parts(
        record_type: Option<&str>,
        record_id: Option<&str>,
        description: Option<&str>,
    ) -> Result<Self, RecordValidationError> {
        let kind: RecordType = record_type
            .ok_or(RecordValidationError::MissingType)?
            .parse()?;
        let text = description.map(str::to_owned);
        match kind {
            RecordType::New => Ok(Self::New { description: text }),
            RecordType::Updated => {
                let target = record_id
                    .filter(|raw| !raw.trim().is_empty())
                    .ok_or(RecordValidationError::MissingRecordId)?
                    .trim()
                    .parse()?;
                Ok(Self::Updated {
                    record_id: target,
                    description: text,
                })
            }
        }
    }
}

/// Which projection of the record collection to return.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RecordView {
    /// Every version, newest first.
    #[default]
    All,
    /// Only the newest version of each logical record.
    Latest,
}

/// Sort versions newest first; ties keep storage-id order for stability.
pub fn sort_newest_first(records: &mut [Record]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.as_ref().cmp(a.id.as_ref()))
    });
}

/// Collapse versions to the newest per logical record, newest first.
#[must_use]
pub fn latest_versions(mut records: Vec<Record>) -> Vec<Record> {
    sort_newest_first(&mut records);
    let mut seen = HashSet::new();
    records.retain(|record| seen.insert(record.record_id.clone()));
    records
}
