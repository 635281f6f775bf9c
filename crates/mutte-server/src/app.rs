//! Application state and router assembly

use axum::{middleware, routing::get, Json, Router};
use mutte_core::{AppConfig, EncryptionService};
use mutte_database::DbConnection;
use mutte_email::services::{EmailLogService, EmailService};
use mutte_smtp::{Dispatcher, RetryPolicy, TransportFactory};
use mutte_tenants::{require_admin_key, require_api_key, AdminKey, TenantService};
use mutte_webhooks::WebhookNotifier;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

pub struct AppState {
    pub tenants: Arc<TenantService>,
    pub email: Arc<EmailService>,
    pub admin_key: Arc<AdminKey>,
}

pub fn build_state(
    db: Arc<DbConnection>,
    config: &AppConfig,
    factory: Arc<dyn TransportFactory>,
) -> anyhow::Result<AppState> {
    let encryption = Arc::new(EncryptionService::new(&config.encryption_key)?);
    let tenants = Arc::new(TenantService::new(Arc::clone(&db), encryption));

    let dispatcher = Dispatcher::new(
        factory,
        RetryPolicy::new(config.retry.max_attempts, config.retry.base_delay_ms),
    );
    let notifier = Arc::new(WebhookNotifier::new(config.webhook_signing_secret.clone()));
    let email = Arc::new(EmailService::new(
        EmailLogService::new(db),
        Arc::clone(&tenants),
        dispatcher,
        notifier,
        config.default_webhook_url.clone(),
    ));

    Ok(AppState {
        tenants,
        email,
        admin_key: Arc::new(AdminKey(config.admin_api_key.clone())),
    })
}

pub fn build_router(state: &AppState) -> Router {
    let email_routes = mutte_email::handlers::routes()
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.tenants),
            require_api_key,
        ))
        .with_state(Arc::clone(&state.email));

    let tenant_routes = mutte_tenants::handlers::routes()
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state.admin_key),
            require_admin_key,
        ))
        .with_state(Arc::clone(&state.tenants));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(health))
        .nest("/tenants", tenant_routes)
        .merge(email_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MuTTE",
        description = "Multi-tenant transactional email relay"
    ),
    paths(
        mutte_email::handlers::emails::send_email,
        mutte_email::handlers::emails::list_emails,
        mutte_email::handlers::emails::get_email,
        mutte_tenants::handlers::create_tenant,
        mutte_tenants::handlers::list_tenants,
        mutte_tenants::handlers::get_tenant,
        mutte_tenants::handlers::update_tenant,
        mutte_tenants::handlers::delete_tenant,
    ),
    components(schemas(
        mutte_email::handlers::types::SendEmailRequestBody,
        mutte_email::handlers::types::SendEmailResponseBody,
        mutte_email::handlers::types::AttachmentBody,
        mutte_email::handlers::types::OneOrMany,
        mutte_email::handlers::types::EmailLogResponse,
        mutte_email::handlers::types::PaginatedEmailsResponse,
        mutte_tenants::types::CreateTenantRequest,
        mutte_tenants::types::UpdateTenantRequest,
        mutte_tenants::types::TenantResponse,
    )),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
        );
        components.add_security_scheme(
            "admin_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-admin-key"))),
        );
    }
}
