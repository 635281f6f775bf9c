//! Send and log handlers

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use mutte_core::ApiError;
use mutte_entities::EmailStatus;
use mutte_smtp::Attachment;
use mutte_tenants::AuthenticatedTenant;
use std::sync::Arc;
use tracing::error;

use super::types::{
    EmailLogResponse, ListEmailsQuery, PaginatedEmailsResponse, SendEmailRequestBody,
    SendEmailResponseBody,
};
use crate::services::{EmailService, ListEmailsOptions, SendRequest};

const MISSING_FIELDS: &str = "Missing required fields: to, subject, htmlBody";

/// Configure send and log routes. All of them sit behind the API key
/// middleware.
pub fn routes() -> Router<Arc<EmailService>> {
    Router::new()
        .route("/send", post(send_email))
        .route("/emails", get(list_emails))
        .route("/emails/{id}", get(get_email))
}

/// Relay an email through the tenant's SMTP server
#[utoipa::path(
    tag = "Emails",
    post,
    path = "/send",
    request_body = SendEmailRequestBody,
    responses(
        (status = 200, description = "Email sent", body = SendEmailResponseBody),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Delivery failed")
    ),
    security(("api_key" = []))
)]
pub async fn send_email(
    AuthenticatedTenant(tenant): AuthenticatedTenant,
    State(service): State<Arc<EmailService>>,
    Json(body): Json<SendEmailRequestBody>,
) -> Result<impl IntoResponse, ApiError> {
    let to = body.to.map(|v| v.into_vec()).unwrap_or_default();
    let subject = body.subject.unwrap_or_default();
    let html_body = body.html_body.unwrap_or_default();

    if to.is_empty() || subject.is_empty() || html_body.is_empty() {
        return Err(ApiError::Validation(MISSING_FIELDS.to_string()));
    }

    let mut attachments = Vec::new();
    for attachment in body.attachments.unwrap_or_default() {
        let content = BASE64
            .decode(&attachment.content)
            .map_err(|_| ApiError::Validation("Invalid attachment content".to_string()))?;
        attachments.push(Attachment {
            filename: attachment.filename,
            content_type: attachment.content_type,
            content,
        });
    }

    let request = SendRequest {
        from: body.from,
        to,
        cc: body.cc.map(|v| v.into_vec()).unwrap_or_default(),
        bcc: body.bcc.map(|v| v.into_vec()).unwrap_or_default(),
        subject,
        html_body,
        text_body: body.text_body,
        attachments,
        variables: body.variables,
    };

    let outcome = service.send(&tenant, request).await.map_err(|e| {
        error!(tenant_id = %tenant.id, error = %e, "send request failed");
        ApiError::from(e)
    })?;

    Ok(Json(SendEmailResponseBody {
        success: true,
        message: "Email sent successfully".to_string(),
        message_id: outcome.message_id,
    }))
}

/// List the tenant's email log
#[utoipa::path(
    tag = "Emails",
    get,
    path = "/emails",
    params(ListEmailsQuery),
    responses(
        (status = 200, description = "Paginated log entries", body = PaginatedEmailsResponse),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Missing or invalid API key"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = []))
)]
pub async fn list_emails(
    AuthenticatedTenant(tenant): AuthenticatedTenant,
    State(service): State<Arc<EmailService>>,
    Query(query): Query<ListEmailsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match &query.status {
        Some(raw) => Some(
            raw.parse::<EmailStatus>()
                .map_err(|_| ApiError::Validation("Invalid status filter".to_string()))?,
        ),
        None => None,
    };

    let page = service
        .logs()
        .list_for_tenant(
            tenant.id,
            &ListEmailsOptions {
                status,
                page: query.page.unwrap_or(1),
                per_page: query.per_page.unwrap_or(20),
            },
        )
        .await
        .map_err(|e| {
            error!(tenant_id = %tenant.id, error = %e, "failed to list email logs");
            ApiError::Internal("Internal server error".to_string())
        })?;

    Ok(Json(PaginatedEmailsResponse {
        data: page.items.iter().map(EmailLogResponse::from).collect(),
        total: page.total,
        page: page.page,
        per_page: page.per_page,
    }))
}

/// Fetch one email log entry
#[utoipa::path(
    tag = "Emails",
    get,
    path = "/emails/{id}",
    params(("id" = i32, Path, description = "Email log ID")),
    responses(
        (status = 200, description = "The log entry", body = EmailLogResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 404, description = "Email log not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = []))
)]
pub async fn get_email(
    AuthenticatedTenant(tenant): AuthenticatedTenant,
    State(service): State<Arc<EmailService>>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let log = service
        .logs()
        .get_for_tenant(tenant.id, id)
        .await
        .map_err(|e| {
            error!(tenant_id = %tenant.id, error = %e, "failed to load email log");
            ApiError::Internal("Internal server error".to_string())
        })?
        .ok_or_else(|| ApiError::NotFound("Email log not found".to_string()))?;

    Ok(Json(EmailLogResponse::from(&log)))
}
