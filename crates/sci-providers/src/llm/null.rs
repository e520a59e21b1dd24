//! Echo completion provider for tests and dry runs.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::Result;
use sci_domain::ports::providers::{LlmKind, LlmProvider};
use sci_domain::registry::llm::{LlmProviderConfig, LlmProviderEntry, LLM_PROVIDERS};

/// Completion provider that summarizes its prompt instead of calling a
/// model. Keeps end-to-end flows runnable without any backend.
pub struct NullLlmProvider;

#[async_trait]
impl LlmProvider for NullLlmProvider {
    async fn complete(&self, prompt: &str, _kind: LlmKind) -> Result<String> {
        // Echo the prompt head so callers can see what reached the model.
        Ok(sci_domain::utils::truncate_chars(prompt, 400))
    }

    fn model_for(&self, _kind: LlmKind) -> &str {
        "null"
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

fn null_llm_factory(
    _config: &LlmProviderConfig,
) -> std::result::Result<Arc<dyn LlmProvider>, String> {
    Ok(Arc::new(NullLlmProvider))
}

#[linkme::distributed_slice(LLM_PROVIDERS)]
static NULL_LLM: LlmProviderEntry = LlmProviderEntry {
    name: "null",
    description: "Echo provider for tests and dry runs",
    build: null_llm_factory,
};
