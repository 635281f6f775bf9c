//! Wire types for the send and log endpoints

use mutte_entities::email_logs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

/// Accepts either a single address or a list of addresses.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(addr) => vec![addr],
            OneOrMany::Many(addrs) => addrs,
        }
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentBody {
    pub filename: String,
    #[schema(example = "application/pdf")]
    pub content_type: String,
    /// Base64-encoded file content
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequestBody {
    /// Sender address; defaults to the tenant's configured `fromEmail`
    pub from: Option<String>,
    pub to: Option<OneOrMany>,
    pub cc: Option<OneOrMany>,
    pub bcc: Option<OneOrMany>,
    pub subject: Option<String>,
    pub html_body: Option<String>,
    pub text_body: Option<String>,
    pub attachments: Option<Vec<AttachmentBody>>,
    /// `{{placeholder}}` substitutions applied to subject and bodies
    pub variables: Option<HashMap<String, serde_json::Value>>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailResponseBody {
    pub success: bool,
    #[schema(example = "Email sent successfully")]
    pub message: String,
    pub message_id: String,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListEmailsQuery {
    /// 1-based page number
    pub page: Option<u64>,
    /// Page size, capped at 100
    pub per_page: Option<u64>,
    /// Filter by status: sending, sent or failed
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailLogResponse {
    pub id: i32,
    pub tenant_id: Uuid,
    pub to: Vec<String>,
    pub subject: String,
    pub status: String,
    pub error_message: Option<String>,
    pub provider_message_id: Option<String>,
    pub sent_at: Option<String>,
    pub created_at: String,
}

impl From<&email_logs::Model> for EmailLogResponse {
    fn from(model: &email_logs::Model) -> Self {
        Self {
            id: model.id,
            tenant_id: model.tenant_id,
            to: model
                .to_address
                .split(", ")
                .map(str::to_string)
                .collect(),
            subject: model.subject.clone(),
            status: model.status.clone(),
            error_message: model.error_message.clone(),
            provider_message_id: model.provider_message_id.clone(),
            sent_at: model.sent_at.map(|t| t.to_rfc3339()),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedEmailsResponse {
    pub data: Vec<EmailLogResponse>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_or_many_deserializes_both_shapes() {
        let one: OneOrMany = serde_json::from_str("\"a@b.c\"").unwrap();
        assert_eq!(one.into_vec(), vec!["a@b.c".to_string()]);

        let many: OneOrMany = serde_json::from_str("[\"a@b.c\", \"d@e.f\"]").unwrap();
        assert_eq!(
            many.into_vec(),
            vec!["a@b.c".to_string(), "d@e.f".to_string()]
        );
    }
}
