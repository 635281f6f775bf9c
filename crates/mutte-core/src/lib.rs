//! Core utilities and types shared across all MuTTE crates

pub mod config;
pub mod error;
pub mod secrets;
pub mod template;
mod encryption;

// Re-export commonly used types
pub use config::{AppConfig, RetryConfig};
pub use encryption::{CryptoError, EncryptionService};
pub use error::{ApiError, ApiResult};
pub use secrets::{EnvSecretsProvider, SecretsCache, SecretsProvider};
pub use template::render;

// Re-export external dependencies
pub use anyhow;
pub use async_trait;
pub use serde;
pub use serde_json;
pub use thiserror;
pub use tokio;
pub use tracing;
