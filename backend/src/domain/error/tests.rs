//! Regression coverage for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
#[case("")]
#[case("   ")]
fn blank_messages_are_rejected(#[case] message: &str) {
    let err = Error::try_new(ErrorCode::InternalError, message).expect_err("blank message");
    assert_eq!(err, ErrorValidationError::EmptyMessage);
}

#[rstest]
fn serialises_camel_case_and_omits_empty_fields() {
    let err = Error::conflict("User already exists");
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(value, json!({ "code": "conflict", "message": "User already exists" }));
}

#[rstest]
fn round_trips_trace_id_and_details() {
    let err = Error::invalid_request("bad")
        .with_trace_id("abc")
        .with_details(json!({ "field": "email" }));
    let value = serde_json::to_value(&err).expect("serialise error");
    assert_eq!(value.get("traceId"), Some(&json!("abc")));

    let decoded: Error = serde_json::from_value(value).expect("deserialise error");
    assert_eq!(decoded, err);
}

#[rstest]
fn deserialising_blank_message_fails() {
    let result = serde_json::from_value::<Error>(json!({ "code": "not_found", "message": " " }));
    assert!(result.is_err());
}

#[tokio::test]
async fn captures_trace_id_in_scope() {
    let trace_id: TraceId = "00000000-0000-0000-0000-000000000000"
        .parse()
        .expect("valid uuid");
    let err = TraceId::scope(trace_id, async { Error::internal("boom") }).await;
    assert_eq!(err.trace_id(), Some("00000000-0000-0000-0000-000000000000"));
}
