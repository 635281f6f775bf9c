//! Request and response bodies for tenant administration

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantRequest {
    #[schema(example = "acme")]
    pub name: String,
    #[schema(example = "smtp.acme.example")]
    pub smtp_host: String,
    #[schema(example = "587")]
    pub smtp_port: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    #[serde(default)]
    pub smtp_secure: bool,
    #[schema(example = "noreply@acme.example")]
    pub from_email: String,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTenantRequest {
    pub name: Option<String>,
    pub smtp_host: Option<String>,
    pub smtp_port: Option<String>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_secure: Option<bool>,
    pub from_email: Option<String>,
    /// Set to an empty string to clear the webhook URL
    pub webhook_url: Option<String>,
}

/// Tenant as exposed to the administrator.
///
/// The SMTP username and password are never echoed back.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantResponse {
    pub id: Uuid,
    pub name: String,
    pub api_key: String,
    pub smtp_host: String,
    pub smtp_port: String,
    pub smtp_user: String,
    pub smtp_pass: String,
    pub smtp_secure: bool,
    pub from_email: String,
    pub webhook_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}
