//! Assertions over the structured error reply.
//!
//! Works on the serialized JSON so tests check the contract channels see,
//! without depending on engine types.

use serde_json::Value;

/// Assert that `error` (the `error` object of a reply) carries `expected_code`
/// and the fields every error reply must have.
pub fn assert_error_contract(
    error: &Value,
    expected_code: &str,
    expected_detail_contains: Option<&str>,
) {
    let obj = error
        .as_object()
        .unwrap_or_else(|| panic!("error reply should be a JSON object, got {error}"));

    assert_eq!(
        obj.get("code").and_then(Value::as_str),
        Some(expected_code),
        "unexpected error code in {error}"
    );

    let category = obj.get("category").and_then(Value::as_str);
    assert!(
        matches!(category, Some("validation" | "domain" | "infrastructure")),
        "category missing or unknown in {error}"
    );
    assert!(
        obj.get("retryable").map(Value::is_boolean).unwrap_or(false),
        "retryable flag missing in {error}"
    );

    let trace_id = obj.get("trace_id").and_then(Value::as_str).unwrap_or("");
    assert!(!trace_id.is_empty(), "trace_id missing in {error}");
    assert_ne!(trace_id, "unknown", "trace_id was not propagated in {error}");

    if let Some(expected_detail) = expected_detail_contains {
        let message = obj.get("message").and_then(Value::as_str).unwrap_or("");
        assert!(
            message.contains(expected_detail),
            "Expected message to contain '{expected_detail}', but got '{message}'"
        );
    }
}
