//! Pluggable secret resolution with a TTL'd in-process cache.
//!
//! Configuration values (database URL, encryption key, webhook signing
//! secret) are read through this capability so the backing store can change
//! without touching the send pipeline.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Source of named secrets.
#[async_trait]
pub trait SecretsProvider: Send + Sync {
    /// Returns the secret value, or `None` when the name is not defined.
    async fn fetch(&self, name: &str) -> Option<String>;
}

/// Provider backed by process environment variables.
#[derive(Debug, Default)]
pub struct EnvSecretsProvider;

#[async_trait]
impl SecretsProvider for EnvSecretsProvider {
    async fn fetch(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

struct CachedSecret {
    value: Option<String>,
    expires_at: Instant,
}

/// Caches provider lookups for a fixed TTL.
///
/// Negative results are cached too, so a missing secret does not hammer the
/// provider on every config read.
pub struct SecretsCache {
    provider: Box<dyn SecretsProvider>,
    ttl: Duration,
    entries: RwLock<HashMap<String, CachedSecret>>,
}

impl SecretsCache {
    pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

    pub fn new(provider: Box<dyn SecretsProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Cache over the process environment with the default TTL.
    pub fn from_env() -> Self {
        Self::new(Box::new(EnvSecretsProvider), Self::DEFAULT_TTL)
    }

    /// Looks up a secret, consulting the provider only on miss or expiry.
    pub async fn get(&self, name: &str) -> Option<String> {
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(name) {
                if entry.expires_at > Instant::now() {
                    return entry.value.clone();
                }
            }
        }

        let value = self.provider.fetch(name).await;
        debug!(secret = name, found = value.is_some(), "secret fetched");

        let mut entries = self.entries.write().await;
        entries.insert(
            name.to_string(),
            CachedSecret {
                value: value.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        value
    }

    /// Drops all cached entries.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }
}
