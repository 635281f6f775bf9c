//! Application configuration, resolved through the secrets cache at startup.

use crate::secrets::SecretsCache;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Retry behavior for the SMTP dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum delivery attempts per send request.
    pub max_attempts: u32,
    /// Base backoff delay; attempt n waits `base * 2^(n-1)`.
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

/// Process-wide configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    /// Master key for credential encryption; 32 bytes or 64 hex characters.
    pub encryption_key: String,
    /// Shared secret guarding the tenant admin routes.
    pub admin_api_key: String,
    /// Optional HMAC key for webhook signatures.
    pub webhook_signing_secret: Option<String>,
    /// Fallback webhook URL for tenants without one configured.
    pub default_webhook_url: Option<String>,
    pub retry: RetryConfig,
    pub smtp_timeout_secs: u64,
}

impl AppConfig {
    /// Loads configuration, failing fast on missing required values.
    pub async fn load(secrets: &SecretsCache) -> Result<Self> {
        let database_url = secrets
            .get("DATABASE_URL")
            .await
            .ok_or_else(|| anyhow!("DATABASE_URL is required"))?;
        let encryption_key = secrets
            .get("ENCRYPTION_KEY")
            .await
            .ok_or_else(|| anyhow!("ENCRYPTION_KEY is required"))?;
        let admin_api_key = secrets
            .get("ADMIN_API_KEY")
            .await
            .ok_or_else(|| anyhow!("ADMIN_API_KEY is required"))?;

        Ok(Self {
            port: parse_or(secrets.get("PORT").await, 3000)?,
            database_url,
            encryption_key,
            admin_api_key,
            webhook_signing_secret: secrets.get("WEBHOOK_SIGNING_SECRET").await,
            default_webhook_url: secrets.get("TENANT_DEFAULT_WEBHOOK").await,
            retry: RetryConfig {
                max_attempts: parse_or(secrets.get("RETRY_MAX_ATTEMPTS").await, 3)?,
                base_delay_ms: parse_or(secrets.get("RETRY_BASE_DELAY_MS").await, 500)?,
            },
            smtp_timeout_secs: parse_or(secrets.get("SMTP_TIMEOUT_SECS").await, 30)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .parse()
            .map_err(|e| anyhow!("invalid config value '{}': {}", raw, e)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::SecretsProvider;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct MapProvider(HashMap<String, String>);

    #[async_trait]
    impl SecretsProvider for MapProvider {
        async fn fetch(&self, name: &str) -> Option<String> {
            self.0.get(name).cloned()
        }
    }

    fn cache_with(pairs: &[(&str, &str)]) -> SecretsCache {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SecretsCache::new(Box::new(MapProvider(map)), Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_load_with_defaults() {
        let cache = cache_with(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ENCRYPTION_KEY", "12345678901234567890123456789012"),
            ("ADMIN_API_KEY", "dev-admin-key"),
        ]);

        let config = AppConfig::load(&cache).await.unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 500);
        assert_eq!(config.smtp_timeout_secs, 30);
        assert!(config.webhook_signing_secret.is_none());
        assert!(config.default_webhook_url.is_none());
    }

    #[tokio::test]
    async fn test_load_with_overrides() {
        let cache = cache_with(&[
            ("DATABASE_URL", "postgresql://localhost/mutte"),
            ("ENCRYPTION_KEY", "12345678901234567890123456789012"),
            ("ADMIN_API_KEY", "dev-admin-key"),
            ("PORT", "8080"),
            ("RETRY_MAX_ATTEMPTS", "5"),
            ("RETRY_BASE_DELAY_MS", "250"),
            ("WEBHOOK_SIGNING_SECRET", "whsec"),
            ("TENANT_DEFAULT_WEBHOOK", "https://hooks.example.com/all"),
        ]);

        let config = AppConfig::load(&cache).await.unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.webhook_signing_secret.as_deref(), Some("whsec"));
        assert_eq!(
            config.default_webhook_url.as_deref(),
            Some("https://hooks.example.com/all")
        );
    }

    #[tokio::test]
    async fn test_load_missing_required_fails() {
        let cache = cache_with(&[("DATABASE_URL", "sqlite::memory:")]);
        let err = AppConfig::load(&cache).await.unwrap_err();
        assert!(err.to_string().contains("ENCRYPTION_KEY"));
    }

    #[tokio::test]
    async fn test_load_rejects_malformed_numbers() {
        let cache = cache_with(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("ENCRYPTION_KEY", "12345678901234567890123456789012"),
            ("ADMIN_API_KEY", "dev-admin-key"),
            ("PORT", "not-a-port"),
        ]);
        assert!(AppConfig::load(&cache).await.is_err());
    }
}
