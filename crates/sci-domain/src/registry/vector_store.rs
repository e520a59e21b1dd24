//! Vector Store Provider Registry

use std::collections::HashMap;

/// Configuration for vector store provider creation
#[derive(Debug, Clone, Default)]
pub struct VectorStoreProviderConfig {
    /// Provider name (e.g., "qdrant", "memory")
    pub provider: String,
    /// Store endpoint URL
    pub url: Option<String>,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(VectorStoreProviderConfig {
    /// Set the endpoint URL
    url: with_url(into String),
    /// Set the API key
    api_key: with_api_key(into String),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::VectorStoreProvider,
    config_type: VectorStoreProviderConfig,
    entry_type: VectorStoreProviderEntry,
    slice_name: VECTOR_STORE_PROVIDERS,
    resolve_fn: resolve_vector_store_provider,
    list_fn: list_vector_store_providers
);
