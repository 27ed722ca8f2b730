//! Event normalization — turns any accepted producer payload into a canonical
//! `NotificationEvent`.
//!
//! Producers have sent several shapes over time (`user_id` as number or
//! string, `template_code` instead of `template_id`, missing `event_id` or
//! `created_at`). Normalization fills defaults and coerces types so every
//! consumer sees one representation, and rejects input that cannot be
//! reconciled. It performs no I/O.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use push_common::error::ValidationError;
use push_common::types::{Document, NotificationEvent, UserId};

#[cfg(test)]
mod normalizer_tests;

/// Stateless normalizer for inbound notification events.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Normalize a decoded JSON value, stamping missing `created_at` with the current instant.
    pub fn normalize(&self, raw: &Value) -> Result<NotificationEvent, ValidationError> {
        self.normalize_at(raw, Utc::now())
    }

    /// Normalize a raw queue message body.
    pub fn normalize_slice(&self, body: &[u8]) -> Result<NotificationEvent, ValidationError> {
        let raw: Value =
            serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        self.normalize(&raw)
    }

    /// Normalize with an explicit clock value for the `created_at` default.
    pub fn normalize_at(
        &self,
        raw: &Value,
        now: DateTime<Utc>,
    ) -> Result<NotificationEvent, ValidationError> {
        let obj = raw.as_object().ok_or(ValidationError::NotAnObject)?;

        let event_id = match optional_str(obj, "event_id")? {
            Some(id) if !id.trim().is_empty() => id.to_string(),
            _ => Uuid::new_v4().to_string(),
        };

        let created_at = match field(obj, "created_at") {
            None => now,
            Some(Value::String(ts)) => {
                parse_timestamp(ts).ok_or_else(|| ValidationError::InvalidTimestamp(ts.clone()))?
            }
            Some(_) => {
                return Err(ValidationError::InvalidType {
                    field: "created_at",
                    expected: "an ISO-8601 string",
                });
            }
        };

        let user_id = coerce_user_id(field(obj, "user_id"))?;

        // Older producers name the template `template_code`.
        let template_id = match optional_str(obj, "template_id")? {
            Some(id) => Some(id.to_string()),
            None => optional_str(obj, "template_code")?.map(str::to_string),
        };

        Ok(NotificationEvent {
            event_id,
            user_id,
            template_id,
            payload: optional_document(obj, "payload")?,
            variables: optional_document(obj, "variables")?,
            language: optional_str(obj, "language")?.map(str::to_string),
            created_at,
        })
    }
}

/// ISO-8601 formats without an offset, read as UTC.
const NAIVE_TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp. Offset-qualified values are converted to
/// UTC; values without an offset are taken to be UTC already.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Look up a field, treating an explicit `null` the same as absence.
fn field<'a>(obj: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    obj.get(name).filter(|v| !v.is_null())
}

fn optional_str<'a>(
    obj: &'a Map<String, Value>,
    name: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match field(obj, name) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.as_str())),
        Some(_) => Err(ValidationError::InvalidType {
            field: name,
            expected: "a string",
        }),
    }
}

fn optional_document(
    obj: &Map<String, Value>,
    name: &'static str,
) -> Result<Option<Document>, ValidationError> {
    match field(obj, name) {
        None => Ok(None),
        Some(Value::Object(map)) => Ok(Some(
            map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        )),
        Some(_) => Err(ValidationError::InvalidType {
            field: name,
            expected: "an object",
        }),
    }
}

/// Integers pass through, numeric strings are parsed, other strings are kept
/// as `Unparsed` with a warning. Every other JSON type is rejected.
fn coerce_user_id(value: Option<&Value>) -> Result<UserId, ValidationError> {
    match value {
        None => Err(ValidationError::MissingField("user_id")),
        Some(Value::Number(n)) => n.as_i64().map(UserId::Numeric).ok_or(
            ValidationError::InvalidType {
                field: "user_id",
                expected: "an integer or numeric string",
            },
        ),
        Some(Value::String(raw)) => match raw.trim().parse::<i64>() {
            Ok(id) => Ok(UserId::Numeric(id)),
            Err(_) => {
                tracing::warn!(user_id = %raw, "user_id is not numeric, keeping raw value");
                Ok(UserId::Unparsed(raw.clone()))
            }
        },
        Some(_) => Err(ValidationError::InvalidType {
            field: "user_id",
            expected: "an integer or numeric string",
        }),
    }
}
