//! API key authentication for send endpoints and admin routes

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use mutte_core::ApiError;
use mutte_entities::tenants;
use std::sync::Arc;
use tracing::warn;

use crate::service::TenantService;

pub const API_KEY_HEADER: &str = "x-api-key";
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Resolves the caller's API key to a tenant and stashes it in the
/// request extensions. Runs before any handler that sends or reads mail.
pub async fn require_api_key(
    State(tenants): State<Arc<TenantService>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let api_key = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("API key is required".to_string()))?
        .to_string();

    let tenant = tenants
        .find_by_api_key(&api_key)
        .await
        .map_err(|e| {
            warn!(error = %e, "API key lookup failed");
            ApiError::Internal("Internal server error".to_string())
        })?
        .ok_or_else(|| ApiError::Unauthorized("Invalid API key".to_string()))?;

    request.extensions_mut().insert(tenant);
    Ok(next.run(request).await)
}

/// The tenant resolved by [`require_api_key`].
pub struct AuthenticatedTenant(pub tenants::Model);

impl<S> FromRequestParts<S> for AuthenticatedTenant
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<tenants::Model>()
            .cloned()
            .map(AuthenticatedTenant)
            .ok_or_else(|| ApiError::Unauthorized("API key is required".to_string()))
    }
}

/// Shared secret protecting the tenant administration routes.
#[derive(Clone)]
pub struct AdminKey(pub String);

pub async fn require_admin_key(
    State(admin_key): State<Arc<AdminKey>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let provided = request
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Admin key is required".to_string()))?;

    if provided != admin_key.0 {
        return Err(ApiError::Unauthorized("Invalid admin key".to_string()));
    }

    Ok(next.run(request).await)
}
