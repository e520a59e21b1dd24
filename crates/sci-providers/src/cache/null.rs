//! Always-miss cache provider.
//!
//! Selected when caching is disabled in configuration. Every read misses
//! and every write is a no-op; `ping` fails so that the cache layer settles
//! into its disabled mode at startup.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::CacheProvider;
use sci_domain::registry::cache::{CacheProviderConfig, CacheProviderEntry, CACHE_PROVIDERS};
use sci_domain::value_objects::CacheEntryConfig;

/// Cache provider that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullCacheProvider;

#[async_trait]
impl CacheProvider for NullCacheProvider {
    async fn get_json(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &str, _config: CacheEntryConfig) -> Result<()> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Ok(false)
    }

    async fn ping(&self) -> Result<()> {
        Err(Error::cache("Null cache has no backend"))
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

fn null_factory(
    _config: &CacheProviderConfig,
) -> std::result::Result<Arc<dyn CacheProvider>, String> {
    Ok(Arc::new(NullCacheProvider))
}

#[linkme::distributed_slice(CACHE_PROVIDERS)]
static NULL_PROVIDER: CacheProviderEntry = CacheProviderEntry {
    name: "null",
    description: "Always-miss cache for disabled configurations",
    build: null_factory,
};
