//! Internal Diesel row structs. Never exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::users;

/// Row struct for reading user identity columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for new users.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
}

/// Refresh token columns.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct RefreshTokenRow {
    pub refresh_token: Option<String>,
    pub refresh_token_ip: Option<String>,
    pub refresh_token_user_agent: Option<String>,
    pub refresh_token_issued_at: Option<DateTime<Utc>>,
    pub refresh_token_last_used: Option<DateTime<Utc>>,
}

/// Changeset writing (or clearing) the refresh token columns.
///
/// `None` fields are written as SQL `NULL`.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct RefreshTokenUpdate<'a> {
    pub refresh_token: Option<&'a str>,
    pub refresh_token_ip: Option<&'a str>,
    pub refresh_token_user_agent: Option<&'a str>,
    pub refresh_token_issued_at: Option<DateTime<Utc>>,
    pub refresh_token_last_used: Option<DateTime<Utc>>,
}
