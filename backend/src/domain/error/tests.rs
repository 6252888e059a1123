//! Tests for the domain error payload.

use super::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn invalid_request_constructor_sets_code() {
    let err = DomainError::invalid_request("bad");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = DomainError::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(DomainErrorValidationError::EmptyMessage)));
}

#[rstest]
#[case(DomainError::conflict("x"), ErrorCode::Conflict)]
#[case(DomainError::invariant("x"), ErrorCode::InvariantViolation)]
#[case(DomainError::data_integrity("x"), ErrorCode::DataIntegrity)]
#[case(DomainError::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(DomainError::cancelled(), ErrorCode::Cancelled)]
#[case(DomainError::trip_unavailable(), ErrorCode::Forbidden)]
fn constructors_set_expected_codes(#[case] err: DomainError, #[case] expected: ErrorCode) {
    assert_eq!(err.code(), expected);
}

#[rstest]
fn serialises_with_snake_case_code_and_details() {
    let err = DomainError::conflict("version mismatch")
        .with_details(json!({"code": "version_mismatch"}));
    let value = serde_json::to_value(&err).expect("serialise error");

    assert_eq!(
        value,
        json!({
            "code": "conflict",
            "message": "version mismatch",
            "details": {"code": "version_mismatch"},
        })
    );
}

#[rstest]
fn deserialising_blank_message_fails() {
    let result: Result<DomainError, _> =
        serde_json::from_value(json!({"code": "not_found", "message": " "}));
    assert!(result.is_err());
}

#[rstest]
fn id_validation_errors_become_invalid_requests() {
    let err: DomainError = IdValidationError::Blank { kind: "trip id" }.into();
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(err.message().contains("trip id"));
}
