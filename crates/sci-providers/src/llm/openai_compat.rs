//! OpenAI-compatible chat completion provider.
//!
//! Serves both the OpenAI API and ElectronHub, which speaks the same chat
//! protocol from a different base URL with per-tier model ids.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::{LlmKind, LlmProvider};
use sci_domain::registry::llm::{LlmProviderConfig, LlmProviderEntry, LLM_PROVIDERS};
use serde::Deserialize;
use serde_json::json;

use super::complete_with_deadline;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_FAST_MODEL: &str = "gpt-4o-mini";
const DEFAULT_COMPLEX_MODEL: &str = "gpt-4o";

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

/// Chat-completions provider for OpenAI-compatible endpoints.
pub struct OpenAiCompatLlmProvider {
    client: reqwest::Client,
    name: &'static str,
    base_url: String,
    api_key: String,
    fast_model: String,
    complex_model: String,
    complex_alt_model: String,
}

impl OpenAiCompatLlmProvider {
    /// Create a provider with per-tier model ids.
    #[must_use]
    pub fn new(
        name: &'static str,
        base_url: String,
        api_key: String,
        fast_model: String,
        complex_model: String,
        complex_alt_model: String,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            name,
            base_url,
            api_key,
            fast_model,
            complex_model,
            complex_alt_model,
        }
    }

    async fn chat(&self, model: &str, prompt: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": model,
                "messages": [{ "role": "user", "content": prompt }],
            }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("Chat completion request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::llm(format!(
                "Chat completions returned {}",
                response.status()
            )));
        }

        let body: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed chat completion response", e))?;
        body.choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| Error::llm("Chat completion returned no choices"))
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatLlmProvider {
    async fn complete(&self, prompt: &str, kind: LlmKind) -> Result<String> {
        let model = self.model_for(kind).to_owned();
        complete_with_deadline(&model, kind, || self.chat(&model, prompt)).await
    }

    fn model_for(&self, kind: LlmKind) -> &str {
        match kind {
            LlmKind::Fast => &self.fast_model,
            LlmKind::Complex => &self.complex_model,
            LlmKind::ComplexAlt => &self.complex_alt_model,
        }
    }

    fn provider_name(&self) -> &str {
        self.name
    }
}

fn openai_llm_factory(
    config: &LlmProviderConfig,
) -> std::result::Result<Arc<dyn LlmProvider>, String> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| "OpenAI LLM provider requires an API key".to_owned())?;
    let fast = config
        .fast_model
        .clone()
        .unwrap_or_else(|| DEFAULT_FAST_MODEL.to_owned());
    let complex = config
        .complex_model
        .clone()
        .unwrap_or_else(|| DEFAULT_COMPLEX_MODEL.to_owned());
    let complex_alt = config.complex_alt_model.clone().unwrap_or_else(|| complex.clone());
    Ok(Arc::new(OpenAiCompatLlmProvider::new(
        "openai",
        config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_BASE_URL.to_owned()),
        api_key,
        fast,
        complex,
        complex_alt,
    )))
}

fn electronhub_llm_factory(
    config: &LlmProviderConfig,
) -> std::result::Result<Arc<dyn LlmProvider>, String> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| "ElectronHub LLM provider requires an API key".to_owned())?;
    let base_url = config
        .base_url
        .clone()
        .ok_or_else(|| "ElectronHub LLM provider requires a base URL".to_owned())?;
    let fast = config
        .fast_model
        .clone()
        .ok_or_else(|| "ElectronHub LLM provider requires fast_model".to_owned())?;
    let complex = config
        .complex_model
        .clone()
        .ok_or_else(|| "ElectronHub LLM provider requires complex_model".to_owned())?;
    let complex_alt = config.complex_alt_model.clone().unwrap_or_else(|| complex.clone());
    Ok(Arc::new(OpenAiCompatLlmProvider::new(
        "electronhub",
        base_url,
        api_key,
        fast,
        complex,
        complex_alt,
    )))
}

#[linkme::distributed_slice(LLM_PROVIDERS)]
static OPENAI_LLM: LlmProviderEntry = LlmProviderEntry {
    name: "openai",
    description: "OpenAI chat completions",
    build: openai_llm_factory,
};

#[linkme::distributed_slice(LLM_PROVIDERS)]
static ELECTRONHUB_LLM: LlmProviderEntry = LlmProviderEntry {
    name: "electronhub",
    description: "ElectronHub OpenAI-compatible gateway with per-tier models",
    build: electronhub_llm_factory,
};
