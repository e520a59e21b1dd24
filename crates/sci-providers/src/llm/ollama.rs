//! Ollama completion provider.
//!
//! A single local model serves every tier; the tier still selects the
//! request deadline.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::{LlmKind, LlmProvider};
use sci_domain::registry::llm::{LlmProviderConfig, LlmProviderEntry, LLM_PROVIDERS};
use serde::Deserialize;
use serde_json::json;

use super::complete_with_deadline;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1:latest";

#[derive(Debug, Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Completion provider backed by a local Ollama daemon.
pub struct OllamaLlmProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OllamaLlmProvider {
    /// Create a provider against the given daemon URL and model.
    #[must_use]
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
        }
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({ "model": self.model, "prompt": prompt, "stream": false }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Ollama generate request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::llm(format!(
                "Ollama generate returned {}",
                response.status()
            )));
        }

        let body: OllamaGenerateResponse = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed Ollama response", e))?;
        Ok(body.response)
    }
}

#[async_trait]
impl LlmProvider for OllamaLlmProvider {
    async fn complete(&self, prompt: &str, kind: LlmKind) -> Result<String> {
        complete_with_deadline(&self.model, kind, || self.generate(prompt)).await
    }

    fn model_for(&self, _kind: LlmKind) -> &str {
        &self.model
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

fn ollama_llm_factory(
    config: &LlmProviderConfig,
) -> std::result::Result<Arc<dyn LlmProvider>, String> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    let model = config
        .fast_model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
    Ok(Arc::new(OllamaLlmProvider::new(base_url, model)))
}

#[linkme::distributed_slice(LLM_PROVIDERS)]
static OLLAMA_LLM: LlmProviderEntry = LlmProviderEntry {
    name: "ollama",
    description: "Ollama local completion models",
    build: ollama_llm_factory,
};
