//! Tests for `EventNormalizer` across the payload shapes producers send.

use std::collections::HashSet;

use chrono::{TimeZone, Utc};
use serde_json::json;

use push_common::error::ValidationError;
use push_common::types::UserId;

use crate::EventNormalizer;

fn normalizer() -> EventNormalizer {
    EventNormalizer::new()
}

// ───────────────────────────── defaults ──────────────────────────────

#[test]
fn test_generates_unique_event_ids() {
    let raw = json!({"user_id": 1, "payload": {"title": "hi"}});
    let ids: HashSet<String> = (0..200)
        .map(|_| normalizer().normalize(&raw).unwrap().event_id)
        .collect();
    assert_eq!(ids.len(), 200);
}

#[test]
fn test_empty_or_null_event_id_is_regenerated() {
    for raw in [
        json!({"user_id": 1, "event_id": ""}),
        json!({"user_id": 1, "event_id": null}),
    ] {
        let event = normalizer().normalize(&raw).unwrap();
        assert!(uuid::Uuid::parse_str(&event.event_id).is_ok());
    }
}

#[test]
fn test_existing_event_id_is_kept() {
    let raw = json!({"user_id": 1, "event_id": "evt-123"});
    assert_eq!(normalizer().normalize(&raw).unwrap().event_id, "evt-123");
}

#[test]
fn test_created_at_defaults_within_call_window() {
    let raw = json!({"user_id": 1});
    let before = Utc::now();
    let event = normalizer().normalize(&raw).unwrap();
    let after = Utc::now();
    assert!(event.created_at >= before);
    assert!(event.created_at <= after);
}

#[test]
fn test_created_at_uses_injected_clock() {
    let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    let event = normalizer().normalize_at(&json!({"user_id": 1}), now).unwrap();
    assert_eq!(event.created_at, now);
}

#[test]
fn test_created_at_parsed_and_converted_to_utc() {
    let raw = json!({"user_id": 1, "created_at": "2025-06-01T14:00:00+02:00"});
    let event = normalizer().normalize(&raw).unwrap();
    assert_eq!(event.created_at, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
}

#[test]
fn test_created_at_without_offset_read_as_utc() {
    let expected = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
    for ts in ["2025-06-01T12:00:00", "2025-06-01 12:00:00"] {
        let event = normalizer()
            .normalize(&json!({"user_id": 1, "created_at": ts}))
            .unwrap();
        assert_eq!(event.created_at, expected);
    }

    let event = normalizer()
        .normalize(&json!({"user_id": 1, "created_at": "2025-06-01T12:00:00.123456"}))
        .unwrap();
    assert_eq!(event.created_at, expected + chrono::Duration::microseconds(123_456));
}

#[test]
fn test_created_at_space_separated_with_offset() {
    let raw = json!({"user_id": 1, "created_at": "2025-06-01 12:00:00+00:00"});
    let event = normalizer().normalize(&raw).unwrap();
    assert_eq!(event.created_at, Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
}

#[test]
fn test_bad_created_at_rejected() {
    let raw = json!({"user_id": 1, "created_at": "last tuesday"});
    assert!(matches!(
        normalizer().normalize(&raw),
        Err(ValidationError::InvalidTimestamp(_))
    ));

    let raw = json!({"user_id": 1, "created_at": 1700000000});
    assert!(matches!(
        normalizer().normalize(&raw),
        Err(ValidationError::InvalidType { field: "created_at", .. })
    ));
}

// ───────────────────────────── user_id ──────────────────────────────

#[test]
fn test_user_id_numeric_string_coerced() {
    let event = normalizer().normalize(&json!({"user_id": "123"})).unwrap();
    assert_eq!(event.user_id, UserId::Numeric(123));
}

#[test]
fn test_user_id_padded_string_coerced() {
    let event = normalizer().normalize(&json!({"user_id": " 42 "})).unwrap();
    assert_eq!(event.user_id, UserId::Numeric(42));
}

#[test]
fn test_user_id_non_numeric_string_kept() {
    let event = normalizer().normalize(&json!({"user_id": "abc"})).unwrap();
    assert_eq!(event.user_id, UserId::Unparsed("abc".to_string()));
}

#[test]
fn test_user_id_integer_kept() {
    let event = normalizer().normalize(&json!({"user_id": 77})).unwrap();
    assert_eq!(event.user_id, UserId::Numeric(77));
}

#[test]
fn test_user_id_missing_rejected() {
    assert_eq!(
        normalizer().normalize(&json!({"payload": {}})).unwrap_err(),
        ValidationError::MissingField("user_id")
    );
    assert_eq!(
        normalizer().normalize(&json!({"user_id": null})).unwrap_err(),
        ValidationError::MissingField("user_id")
    );
}

#[test]
fn test_user_id_wrong_type_rejected() {
    for user_id in [json!(true), json!(1.5), json!([1]), json!({"id": 1})] {
        let err = normalizer()
            .normalize(&json!({"user_id": user_id}))
            .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidType { field: "user_id", .. }));
    }
}

// ───────────────────────────── template / payload ──────────────────────────────

#[test]
fn test_template_and_payload_preserved_independently() {
    let raw = json!({
        "user_id": 5,
        "template_id": "welcome_v1",
        "payload": {"title": "Hello", "data": {"link": "https://example.com"}},
    });
    let event = normalizer().normalize(&raw).unwrap();
    assert_eq!(event.template_id.as_deref(), Some("welcome_v1"));
    let payload = event.payload.unwrap();
    assert_eq!(payload["title"], json!("Hello"));
    assert_eq!(payload["data"]["link"], json!("https://example.com"));
}

#[test]
fn test_neither_template_nor_payload_accepted() {
    let event = normalizer().normalize(&json!({"user_id": 5})).unwrap();
    assert!(event.template_id.is_none());
    assert!(event.payload.is_none());
    assert!(!event.is_actionable());
}

#[test]
fn test_template_code_alias() {
    let raw = json!({
        "user_id": 5,
        "template_code": "welcome_v1",
        "variables": {"name": "User"},
        "language": "en",
    });
    let event = normalizer().normalize(&raw).unwrap();
    assert_eq!(event.template_id.as_deref(), Some("welcome_v1"));
    assert_eq!(event.variables.unwrap()["name"], json!("User"));
    assert_eq!(event.language.as_deref(), Some("en"));
}

#[test]
fn test_template_id_takes_precedence_over_alias() {
    let raw = json!({"user_id": 5, "template_id": "new", "template_code": "old"});
    let event = normalizer().normalize(&raw).unwrap();
    assert_eq!(event.template_id.as_deref(), Some("new"));
}

#[test]
fn test_payload_must_be_object() {
    let err = normalizer()
        .normalize(&json!({"user_id": 5, "payload": "text"}))
        .unwrap_err();
    assert_eq!(
        err,
        ValidationError::InvalidType {
            field: "payload",
            expected: "an object"
        }
    );
}

#[test]
fn test_non_object_rejected() {
    assert_eq!(
        normalizer().normalize(&json!([1, 2])).unwrap_err(),
        ValidationError::NotAnObject
    );
}

// ───────────────────────────── raw bodies / idempotence ──────────────────────────────

#[test]
fn test_normalize_slice() {
    let body = br#"{"user_id": "9", "payload": {"body": "x"}}"#;
    let event = normalizer().normalize_slice(body).unwrap();
    assert_eq!(event.user_id, UserId::Numeric(9));

    assert!(matches!(
        normalizer().normalize_slice(b"not json"),
        Err(ValidationError::Malformed(_))
    ));
}

#[test]
fn test_renormalizing_canonical_event_is_stable() {
    let raw = json!({"user_id": "123", "template_code": "t", "variables": {"a": 1}});
    let first = normalizer().normalize(&raw).unwrap();
    let second = normalizer()
        .normalize(&serde_json::to_value(&first).unwrap())
        .unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_renormalizing_unparsed_user_id_is_stable() {
    let first = normalizer().normalize(&json!({"user_id": "abc"})).unwrap();
    let second = normalizer()
        .normalize(&serde_json::to_value(&first).unwrap())
        .unwrap();
    assert_eq!(first, second);
}
