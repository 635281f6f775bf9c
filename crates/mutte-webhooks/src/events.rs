use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WebhookEventType {
    Sent,
    Failed,
}

impl WebhookEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookEventType::Sent => "sent",
            WebhookEventType::Failed => "failed",
        }
    }
}

/// Payload posted to a tenant's webhook after a send reaches a
/// terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event: WebhookEventType,
    pub tenant_id: Uuid,
    pub email_log_id: i32,
    pub to: Vec<String>,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookEvent {
    pub fn sent(tenant_id: Uuid, email_log_id: i32, to: Vec<String>, subject: String) -> Self {
        Self {
            event: WebhookEventType::Sent,
            tenant_id,
            email_log_id,
            to,
            subject,
            timestamp: Utc::now(),
            error: None,
        }
    }

    pub fn failed(
        tenant_id: Uuid,
        email_log_id: i32,
        to: Vec<String>,
        subject: String,
        error: String,
    ) -> Self {
        Self {
            event: WebhookEventType::Failed,
            tenant_id,
            email_log_id,
            to,
            subject,
            timestamp: Utc::now(),
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_camel_case() {
        let event = WebhookEvent::sent(
            Uuid::nil(),
            7,
            vec!["a@b.c".to_string()],
            "Hello".to_string(),
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "sent");
        assert_eq!(json["tenantId"], Uuid::nil().to_string());
        assert_eq!(json["emailLogId"], 7);
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_failed_event_carries_error() {
        let event = WebhookEvent::failed(
            Uuid::nil(),
            7,
            vec!["a@b.c".to_string()],
            "Hello".to_string(),
            "delivery rejected (550): mailbox unavailable".to_string(),
        );
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "failed");
        assert_eq!(
            json["error"],
            "delivery rejected (550): mailbox unavailable"
        );
    }
}
