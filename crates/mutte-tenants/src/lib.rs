//! Tenant management: registration, credential storage and API key auth.

pub mod auth;
pub mod errors;
pub mod handlers;
pub mod service;
pub mod types;

pub use auth::{require_admin_key, require_api_key, AdminKey, AuthenticatedTenant};
pub use errors::TenantError;
pub use service::TenantService;
