use mutte_core::{ApiError, CryptoError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TenantError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Tenant not found")]
    NotFound,

    #[error("Tenant with this name already exists")]
    NameTaken(String),

    #[error("Encryption error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Invalid SMTP port: {0}")]
    InvalidPort(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<TenantError> for ApiError {
    fn from(err: TenantError) -> Self {
        match err {
            TenantError::NotFound => ApiError::NotFound("Tenant not found".to_string()),
            TenantError::NameTaken(_) => {
                ApiError::Conflict("Tenant with this name already exists".to_string())
            }
            TenantError::Validation(msg) => ApiError::Validation(msg),
            TenantError::InvalidPort(_) => {
                ApiError::Validation("Invalid SMTP port".to_string())
            }
            TenantError::Database(_) | TenantError::Crypto(_) => {
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}
