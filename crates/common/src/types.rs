use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, key-ordered structured content (inline payloads, template variables).
pub type Document = BTreeMap<String, serde_json::Value>;

/// Identity of a notification recipient.
///
/// Producers send either an integer or a numeric string. A string that does
/// not parse is kept as `Unparsed` so downstream code has to decide what to
/// do with it instead of receiving a silently mistyped value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Unparsed(String),
}

impl UserId {
    /// The integer identity, if the producer sent one.
    pub fn as_numeric(&self) -> Option<i64> {
        match self {
            UserId::Numeric(id) => Some(*id),
            UserId::Unparsed(_) => None,
        }
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        UserId::Numeric(id)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Numeric(id) => write!(f, "{}", id),
            UserId::Unparsed(raw) => write!(f, "{}", raw),
        }
    }
}

/// The canonical unit of work on the push queue.
///
/// At least one of `template_id` or `payload` should be present for the
/// event to be deliverable; this is not enforced at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    /// Unique ID for tracking the notification
    pub event_id: String,
    /// Recipient
    pub user_id: UserId,
    /// Template reference, rendered with `variables`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Inline rendering content, used when no template is referenced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Document>,
    /// Template variables
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Document>,
    /// Template language (e.g. "en")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Whether the event carries anything a delivery worker can render.
    pub fn is_actionable(&self) -> bool {
        self.template_id.is_some() || self.payload.is_some()
    }
}

/// Validity metadata stored per device token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenValidation {
    /// Device push token (FCM/APNs)
    pub token: String,
    pub is_valid: bool,
    pub last_validated: Option<DateTime<Utc>>,
}

impl TokenValidation {
    /// Decode the fields of a token metadata hash.
    ///
    /// `is_valid` is written as `True` by existing tooling; `true` and `1`
    /// are accepted as well. Anything else, or a missing field, reads as invalid.
    pub fn from_fields(token: &str, fields: &BTreeMap<String, String>) -> Self {
        let is_valid = fields
            .get("is_valid")
            .map(|v| matches!(v.trim(), "True" | "true" | "1"))
            .unwrap_or(false);
        let last_validated = fields
            .get("last_validated")
            .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
            .map(|ts| ts.with_timezone(&Utc));

        Self {
            token: token.to_string(),
            is_valid,
            last_validated,
        }
    }
}

/// Connectivity report produced by the surrounding service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub service: String,
    pub status: String,
    pub rabbit_connected: bool,
    pub redis_connected: bool,
    pub timestamp: DateTime<Utc>,
}

impl HealthStatus {
    pub fn new(rabbit_connected: bool, redis_connected: bool) -> Self {
        let status = if rabbit_connected && redis_connected {
            "healthy"
        } else {
            "degraded"
        };
        Self {
            service: "Push Service".to_string(),
            status: status.to_string(),
            rabbit_connected,
            redis_connected,
            timestamp: Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.rabbit_connected && self.redis_connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_untagged() {
        assert_eq!(serde_json::to_value(UserId::Numeric(7)).unwrap(), serde_json::json!(7));
        assert_eq!(
            serde_json::to_value(UserId::Unparsed("abc".into())).unwrap(),
            serde_json::json!("abc")
        );
        assert_eq!(UserId::Numeric(7).as_numeric(), Some(7));
        assert_eq!(UserId::Unparsed("abc".into()).as_numeric(), None);
    }

    #[test]
    fn test_token_validation_from_fields() {
        let mut fields = BTreeMap::new();
        fields.insert("is_valid".to_string(), "True".to_string());
        fields.insert(
            "last_validated".to_string(),
            "2025-01-02T03:04:05+00:00".to_string(),
        );
        let meta = TokenValidation::from_fields("T1", &fields);
        assert!(meta.is_valid);
        assert_eq!(
            meta.last_validated.unwrap().to_rfc3339(),
            "2025-01-02T03:04:05+00:00"
        );

        fields.insert("is_valid".to_string(), "False".to_string());
        fields.insert("last_validated".to_string(), "yesterday".to_string());
        let meta = TokenValidation::from_fields("T1", &fields);
        assert!(!meta.is_valid);
        assert!(meta.last_validated.is_none());
    }

    #[test]
    fn test_health_status() {
        assert_eq!(HealthStatus::new(true, true).status, "healthy");
        let degraded = HealthStatus::new(true, false);
        assert_eq!(degraded.status, "degraded");
        assert!(!degraded.is_healthy());
    }
}
