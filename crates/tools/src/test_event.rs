//! Sample events for exercising the push consumer end to end.

use chrono::Utc;
use serde_json::{Value, json};

/// Inputs for a sample event.
#[derive(Debug, Clone, Default)]
pub struct SampleEvent {
    pub user_id: i64,
    pub event_id: Option<String>,
    /// Template code; when set the event is template-based instead of inline.
    pub template: Option<String>,
    pub title: String,
    pub message: String,
}

impl SampleEvent {
    /// Build the wire-format event a producer would enqueue.
    pub fn to_wire(&self) -> Value {
        let mut event = json!({
            "user_id": self.user_id,
            "created_at": Utc::now().to_rfc3339(),
        });
        if let Some(event_id) = &self.event_id {
            event["event_id"] = json!(event_id);
        }

        match &self.template {
            Some(code) => {
                event["template_code"] = json!(code);
                event["variables"] = json!({
                    "name": "User",
                    "platform": "iOS",
                    "link": "https://example.com",
                });
                event["language"] = json!("en");
            }
            None => {
                event["payload"] = json!({
                    "title": self.title,
                    "body": self.message,
                    "data": {"link": "https://example.com/test"},
                });
            }
        }
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use push_normalizer::EventNormalizer;

    fn sample() -> SampleEvent {
        SampleEvent {
            user_id: 123,
            title: "Test Notification".into(),
            message: "Hello".into(),
            ..SampleEvent::default()
        }
    }

    #[test]
    fn test_inline_sample_normalizes() {
        let event = EventNormalizer::new().normalize(&sample().to_wire()).unwrap();
        assert_eq!(event.user_id.as_numeric(), Some(123));
        assert!(event.template_id.is_none());
        assert_eq!(event.payload.unwrap()["body"], json!("Hello"));
    }

    #[test]
    fn test_template_sample_normalizes() {
        let sample = SampleEvent {
            template: Some("welcome_v1".into()),
            event_id: Some("evt-1".into()),
            ..sample()
        };
        let event = EventNormalizer::new().normalize(&sample.to_wire()).unwrap();
        assert_eq!(event.event_id, "evt-1");
        assert_eq!(event.template_id.as_deref(), Some("welcome_v1"));
        assert_eq!(event.language.as_deref(), Some("en"));
        assert!(event.payload.is_none());
    }
}
