//! LLM Provider Registry

use std::collections::HashMap;

/// Configuration for LLM provider creation.
///
/// Carries the symbolic model ids for all three tiers; single-model
/// providers (ollama) serve every tier from `fast_model`.
#[derive(Debug, Clone, Default)]
pub struct LlmProviderConfig {
    /// Provider name (e.g., "ollama", "openai", "electronhub", "null")
    pub provider: String,
    /// Fast-tier model id
    pub fast_model: Option<String>,
    /// Complex-tier model id
    pub complex_model: Option<String>,
    /// Alternative complex-tier model id
    pub complex_alt_model: Option<String>,
    /// API key for authentication
    pub api_key: Option<String>,
    /// Base URL for the provider API
    pub base_url: Option<String>,
    /// Additional provider-specific configuration
    pub extra: HashMap<String, String>,
}

crate::impl_config_builder!(LlmProviderConfig {
    /// Set the fast-tier model
    fast_model: with_fast_model(into String),
    /// Set the complex-tier model
    complex_model: with_complex_model(into String),
    /// Set the alternative complex-tier model
    complex_alt_model: with_complex_alt_model(into String),
    /// Set the API key
    api_key: with_api_key(into String),
    /// Set the base URL for the API
    base_url: with_base_url(into String),
});

crate::impl_registry!(
    provider_trait: crate::ports::providers::LlmProvider,
    config_type: LlmProviderConfig,
    entry_type: LlmProviderEntry,
    slice_name: LLM_PROVIDERS,
    resolve_fn: resolve_llm_provider,
    list_fn: list_llm_providers
);
