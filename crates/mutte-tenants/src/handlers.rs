//! Tenant administration handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use mutte_core::ApiError;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use crate::service::TenantService;
use crate::types::{CreateTenantRequest, TenantResponse, UpdateTenantRequest};

/// Configure tenant administration routes
pub fn routes() -> Router<Arc<TenantService>> {
    Router::new()
        .route("/", post(create_tenant).get(list_tenants))
        .route(
            "/{id}",
            get(get_tenant).put(update_tenant).delete(delete_tenant),
        )
}

/// Register a new tenant
#[utoipa::path(
    tag = "Tenants",
    post,
    path = "/tenants",
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant created", body = TenantResponse),
        (status = 400, description = "Missing required fields"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Tenant name already taken"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_key" = []))
)]
pub async fn create_tenant(
    State(tenants): State<Arc<TenantService>>,
    Json(request): Json<CreateTenantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = tenants.create(&request).await.map_err(log_error)?;
    let response = tenants.to_response(&tenant).map_err(log_error)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// List all tenants
#[utoipa::path(
    tag = "Tenants",
    get,
    path = "/tenants",
    responses(
        (status = 200, description = "All registered tenants", body = [TenantResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_key" = []))
)]
pub async fn list_tenants(
    State(tenants): State<Arc<TenantService>>,
) -> Result<impl IntoResponse, ApiError> {
    let all = tenants.list().await.map_err(log_error)?;
    let responses = all
        .iter()
        .map(|tenant| tenants.to_response(tenant))
        .collect::<Result<Vec<_>, _>>()
        .map_err(log_error)?;
    Ok(Json(responses))
}

/// Fetch a single tenant
#[utoipa::path(
    tag = "Tenants",
    get,
    path = "/tenants/{id}",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 200, description = "The tenant", body = TenantResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tenant not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_key" = []))
)]
pub async fn get_tenant(
    State(tenants): State<Arc<TenantService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = tenants.get(id).await.map_err(log_error)?;
    let response = tenants.to_response(&tenant).map_err(log_error)?;
    Ok(Json(response))
}

/// Update a tenant's configuration
#[utoipa::path(
    tag = "Tenants",
    put,
    path = "/tenants/{id}",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Updated tenant", body = TenantResponse),
        (status = 400, description = "Invalid update"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tenant not found"),
        (status = 409, description = "Tenant name already taken"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_key" = []))
)]
pub async fn update_tenant(
    State(tenants): State<Arc<TenantService>>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateTenantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let tenant = tenants.update(id, &request).await.map_err(log_error)?;
    let response = tenants.to_response(&tenant).map_err(log_error)?;
    Ok(Json(response))
}

/// Delete a tenant and its email logs
#[utoipa::path(
    tag = "Tenants",
    delete,
    path = "/tenants/{id}",
    params(("id" = Uuid, Path, description = "Tenant ID")),
    responses(
        (status = 204, description = "Tenant deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Tenant not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("admin_key" = []))
)]
pub async fn delete_tenant(
    State(tenants): State<Arc<TenantService>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    tenants.delete(id).await.map_err(log_error)?;
    Ok(StatusCode::NO_CONTENT)
}

fn log_error(e: crate::errors::TenantError) -> ApiError {
    if matches!(
        e,
        crate::errors::TenantError::Database(_) | crate::errors::TenantError::Crypto(_)
    ) {
        error!(error = %e, "tenant operation failed");
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{require_api_key, AuthenticatedTenant};
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use mutte_core::EncryptionService;
    use mutte_database::test_utils::TestDatabase;
    use tower::ServiceExt;

    async fn setup() -> anyhow::Result<(TestDatabase, Arc<TenantService>)> {
        let test_db = TestDatabase::with_migrations().await?;
        let encryption = Arc::new(
            EncryptionService::new(&EncryptionService::generate_key()).unwrap(),
        );
        let service = Arc::new(TenantService::new(test_db.connection_arc(), encryption));
        Ok((test_db, service))
    }

    fn admin_router(service: Arc<TenantService>) -> Router {
        routes().with_state(service)
    }

    fn create_body() -> serde_json::Value {
        serde_json::json!({
            "name": "acme",
            "smtpHost": "smtp.example.com",
            "smtpPort": "587",
            "smtpUser": "mailer",
            "smtpPass": "hunter2",
            "smtpSecure": false,
            "fromEmail": "noreply@example.com"
        })
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_create_tenant_masks_secrets() -> anyhow::Result<()> {
        let (_db, service) = setup().await?;
        let app = admin_router(service);

        let response = app
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(create_body().to_string()))?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = json_body(response).await;
        assert_eq!(json["name"], "acme");
        assert_eq!(json["smtpUser"], "***");
        assert_eq!(json["smtpPass"], "***");
        assert!(json["apiKey"].as_str().unwrap().starts_with("matte_"));

        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_name_returns_conflict() -> anyhow::Result<()> {
        let (_db, service) = setup().await?;

        let first = admin_router(Arc::clone(&service))
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(create_body().to_string()))?,
            )
            .await?;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = admin_router(service)
            .oneshot(
                Request::post("/")
                    .header("content-type", "application/json")
                    .body(Body::from(create_body().to_string()))?,
            )
            .await?;
        assert_eq!(second.status(), StatusCode::CONFLICT);
        let json = json_body(second).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Tenant with this name already exists");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_unknown_tenant_returns_not_found() -> anyhow::Result<()> {
        let (_db, service) = setup().await?;
        let app = admin_router(service);

        let response = app
            .oneshot(
                Request::get(format!("/{}", Uuid::new_v4()).as_str()).body(Body::empty())?,
            )
            .await?;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let json = json_body(response).await;
        assert_eq!(json["success"], false);

        Ok(())
    }

    #[tokio::test]
    async fn test_api_key_middleware_resolves_tenant() -> anyhow::Result<()> {
        let (_db, service) = setup().await?;
        let tenant = service
            .create(&serde_json::from_value(create_body()).unwrap())
            .await?;

        let app = Router::new()
            .route(
                "/whoami",
                get(|AuthenticatedTenant(tenant): AuthenticatedTenant| async move {
                    tenant.name.clone()
                }),
            )
            .layer(axum::middleware::from_fn_with_state(
                Arc::clone(&service),
                require_api_key,
            ));

        // No key
        let response = app
            .clone()
            .oneshot(Request::get("/whoami").body(Body::empty())?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["error"], "API key is required");

        // Wrong key
        let response = app
            .clone()
            .oneshot(
                Request::get("/whoami")
                    .header("x-api-key", "matte_bogus")
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let json = json_body(response).await;
        assert_eq!(json["error"], "Invalid API key");

        // Valid key
        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header("x-api-key", tenant.api_key.as_str())
                    .body(Body::empty())?,
            )
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await?.to_bytes();
        assert_eq!(&bytes[..], b"acme");

        Ok(())
    }
}
