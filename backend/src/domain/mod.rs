//! Domain primitives, services and ports.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic error payload.
//! - `User`, `UserId`, `EmailAddress`, `Username`: user identity.
//! - `LoginCredentials`, `Registration`, `LoginContext`: validated auth input.
//! - `TokenIssuer`: HS256 access and refresh tokens.
//! - `Record`, `RecordId`, `RecordDraft`: append-only record versions.
//! - `AuthService`, `RecordsService`: driving port implementations.

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod password;
pub mod ports;
pub mod records;
pub mod records_service;
pub mod tokens;
pub mod trace_id;
pub mod user;
pub mod username;

pub use self::auth::{
    CREDENTIALS_REQUIRED, LoginContext, LoginCredentials, LoginValidationError, Registration,
};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::password::PasswordHasher;
pub use self::records::{
    HISTORY_NOT_FOUND, INVALID_RECORD_ID, NewRecord, RECORD_NOT_FOUND, Record, RecordDraft,
    RecordId, RecordType, RecordValidationError, RecordView, latest_versions, sort_newest_first,
};
pub use self::records_service::RecordsService;
pub use self::tokens::{
    TokenClaims, TokenError, TokenIssuer, TokenKind, TokenPair, TokenSecrets, fingerprint,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, NewUser, PasswordHash, User, UserId, UserProfile, UserValidationError, Username,
};
pub use self::username::{username_base, username_candidates};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use recordkeeper::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
