//! Wire payloads for the Vault HTTP API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub(super) struct AppRoleLoginRequest<'a> {
    pub role_id: &'a str,
    pub secret_id: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthResponse {
    pub auth: AuthData,
}

#[derive(Debug, Deserialize)]
pub(super) struct AuthData {
    pub client_token: String,
    pub lease_duration: i64,
}

/// Secret body stored per username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct StoredTokenDto {
    pub refresh_token: String,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
    #[serde(default)]
    pub metadata: TokenMetadataDto,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(super) struct TokenMetadataDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct KvWriteRequest<'a> {
    pub data: &'a StoredTokenDto,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<KvWriteOptions>,
}

/// Check-and-set guard: the write only lands on this exact version.
#[derive(Debug, Serialize)]
pub(super) struct KvWriteOptions {
    pub cas: u64,
}

#[derive(Debug, Deserialize)]
pub(super) struct KvReadResponse {
    pub data: Option<KvReadData>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KvReadData {
    pub data: Option<StoredTokenDto>,
    #[serde(default)]
    pub metadata: Option<KvVersionMetadata>,
}

#[derive(Debug, Deserialize)]
pub(super) struct KvVersionMetadata {
    pub version: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListResponse {
    pub data: ListData,
}

#[derive(Debug, Deserialize)]
pub(super) struct ListData {
    #[serde(default)]
    pub keys: Vec<String>,
}
