//! Moka in-memory cache provider.
//!
//! High-performance concurrent in-memory cache. Per-entry TTLs are tracked
//! alongside the value; expired entries read as misses and are invalidated
//! on access.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use moka::future::Cache;
use sci_domain::error::Result;
use sci_domain::ports::providers::CacheProvider;
use sci_domain::registry::cache::{CacheProviderConfig, CacheProviderEntry, CACHE_PROVIDERS};
use sci_domain::value_objects::CacheEntryConfig;

const DEFAULT_MAX_SIZE: usize = 10_000;

#[derive(Clone)]
struct CachedValue {
    json: String,
    expires_at: Option<Instant>,
}

/// Moka-based in-memory cache provider.
#[derive(Clone)]
pub struct MokaCacheProvider {
    cache: Cache<String, CachedValue>,
    max_size: usize,
}

impl MokaCacheProvider {
    /// Create a provider with the given entry capacity.
    #[must_use]
    pub fn new(max_size: usize) -> Self {
        Self {
            cache: Cache::builder().max_capacity(max_size as u64).build(),
            max_size,
        }
    }
}

impl Default for MokaCacheProvider {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SIZE)
    }
}

impl std::fmt::Debug for MokaCacheProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaCacheProvider")
            .field("max_size", &self.max_size)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

#[async_trait]
impl CacheProvider for MokaCacheProvider {
    async fn get_json(&self, key: &str) -> Result<Option<String>> {
        if let Some(cached) = self.cache.get(key).await {
            if cached
                .expires_at
                .is_some_and(|expires_at| Instant::now() >= expires_at)
            {
                self.cache.invalidate(key).await;
                return Ok(None);
            }
            return Ok(Some(cached.json));
        }
        Ok(None)
    }

    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()> {
        let expires_at = config.ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        self.cache
            .insert(
                key.to_owned(),
                CachedValue {
                    json: value.to_owned(),
                    expires_at,
                },
            )
            .await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let existed = self.cache.contains_key(key);
        self.cache.invalidate(key).await;
        Ok(existed)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.cache.contains_key(key))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    fn provider_name(&self) -> &str {
        "moka"
    }
}

fn moka_factory(
    config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    Ok(Arc::new(MokaCacheProvider::new(
        config.max_size.unwrap_or(DEFAULT_MAX_SIZE),
    )))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static MOKA_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "moka",
    description: "Moka high-performance in-memory cache",
    build: moka_factory,
};

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let cache = MokaCacheProvider::default();
        cache
            .set_json("k", "\"v\"", CacheEntryConfig::default())
            .await
            .expect("set");
        assert_eq!(
            cache.get_json("k").await.expect("get").as_deref(),
            Some("\"v\"")
        );
    }

    #[tokio::test]
    async fn expired_entries_read_as_misses() {
        let cache = MokaCacheProvider::default();
        let config = CacheEntryConfig {
            ttl: Some(Duration::ZERO),
            namespace: None,
        };
        cache.set_json("k", "\"v\"", config).await.expect("set");
        assert_eq!(cache.get_json("k").await.expect("get"), None);
    }

    #[tokio::test]
    async fn delete_reports_prior_existence() {
        let cache = MokaCacheProvider::default();
        cache
            .set_json("k", "\"v\"", CacheEntryConfig::default())
            .await
            .expect("set");
        assert!(cache.delete("k").await.expect("delete"));
        assert!(!cache.delete("k").await.expect("second delete"));
    }
}
