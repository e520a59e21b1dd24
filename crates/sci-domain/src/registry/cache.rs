//! Cache Provider Registry

use std::collections::HashMap;

/// Configuration for cache provider creation
#[derive(Debug, Clone, Default)]
pub struct CacheProviderConfig {
    /// Provider name (e.g., "redis", "moka", "null")
    pub provider: String,
    /// Backend host
    pub host: Option<String>,
    /// Backend port
    pub port: Option<u16>,
    /// Default TTL in seconds
    pub ttl_secs: Option<u64>,
    /// Maximum entries for in-memory backends
    pub max_size: Option<usize>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(CacheProviderConfig {
    /// Set the backend host
    host: with_host(into String),
    /// Set the backend port
    port: with_port(u16),
    /// Set the default TTL in seconds
    ttl_secs: with_ttl_secs(u64),
    /// Set the maximum entry count
    max_size: with_max_size(usize),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::CacheProvider,
    config_type: CacheProviderConfig,
    entry_type: CacheProviderEntry,
    slice_name: CACHE_PROVIDERS,
    resolve_fn: resolve_cache_provider,
    list_fn: list_cache_providers
);
