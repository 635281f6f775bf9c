use mutte_core::ApiError;
use mutte_smtp::DispatchError;
use mutte_tenants::TenantError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Failed to prepare SMTP credentials: {0}")]
    Credentials(#[from] TenantError),

    #[error("{0}")]
    Dispatch(#[from] DispatchError),

    #[error("Failed to record delivery outcome: {0}")]
    LogPersistence(String),
}

impl From<SendError> for ApiError {
    fn from(err: SendError) -> Self {
        match err {
            SendError::Validation(msg) => ApiError::Validation(msg),
            SendError::Database(_) | SendError::LogPersistence(_) => {
                ApiError::Internal("Internal server error".to_string())
            }
            SendError::Credentials(_) | SendError::Dispatch(_) => {
                ApiError::Internal("Failed to send email".to_string())
            }
        }
    }
}
