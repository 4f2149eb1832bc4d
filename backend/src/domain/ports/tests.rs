//! Port error to domain error mapping.

use super::*;
use crate::domain::{Error, ErrorCode};
use rstest::rstest;

#[rstest]
#[case(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[case(UserPersistenceError::duplicate("email"), ErrorCode::Conflict)]
fn user_errors_map_to_codes(#[case] error: UserPersistenceError, #[case] expected: ErrorCode) {
    assert_eq!(Error::from(error).code(), expected);
}

#[rstest]
fn duplicate_users_surface_the_registration_message() {
    let err = Error::from(UserPersistenceError::duplicate("username"));
    assert_eq!(err.message(), "User already exists");
}

#[rstest]
#[case(RecordPersistenceError::connection("timeout"), ErrorCode::ServiceUnavailable)]
#[case(RecordPersistenceError::query("bad filter"), ErrorCode::InternalError)]
#[case(RecordPersistenceError::decode("missing type"), ErrorCode::InternalError)]
fn record_errors_map_to_codes(
    #[case] error: RecordPersistenceError,
    #[case] expected: ErrorCode,
) {
    assert_eq!(Error::from(error).code(), expected);
}

#[rstest]
#[case(RefreshTokenStoreError::unavailable("sealed"), ErrorCode::ServiceUnavailable)]
#[case(RefreshTokenStoreError::backend("403"), ErrorCode::InternalError)]
fn token_store_errors_map_to_codes(
    #[case] error: RefreshTokenStoreError,
    #[case] expected: ErrorCode,
) {
    assert_eq!(Error::from(error).code(), expected);
}

#[rstest]
fn internal_details_do_not_leak_into_messages() {
    let err = Error::from(UserPersistenceError::query("relation \"users\" does not exist"));
    assert!(!err.message().contains("relation"));
}
