//! OpenAI embedding provider.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::EmbeddingProvider;
use sci_domain::registry::embedding::{
    EmbeddingProviderConfig, EmbeddingProviderEntry, EMBEDDING_PROVIDERS,
};
use sci_domain::value_objects::Embedding;
use serde::Deserialize;
use serde_json::json;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "text-embedding-3-small";
/// text-embedding-3-small output dimensionality.
const DEFAULT_DIMENSIONS: usize = 1536;

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

/// Embedding provider backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbeddingProvider {
    /// Create a provider with the given credentials and model.
    #[must_use]
    pub fn new(base_url: String, api_key: String, model: String, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key,
            model,
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&json!({ "model": self.model, "input": texts }))
            .send()
            .await
            .map_err(|e| Error::network_with_source("OpenAI embeddings request failed", e))?;

        if !response.status().is_success() {
            return Err(Error::embedding(format!(
                "OpenAI embeddings returned {}",
                response.status()
            )));
        }

        let mut body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::network_with_source("Malformed OpenAI response", e))?;

        // The API may return entries out of order; index restores it.
        body.data.sort_by_key(|d| d.index);
        Ok(body
            .data
            .into_iter()
            .map(|d| Embedding::new(d.embedding, self.model.clone()))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "openai"
    }
}

fn openai_embedding_factory(
    config: &EmbeddingProviderConfig,
) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| "OpenAI embedding provider requires an API key".to_owned())?;
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
    let dimensions = config.dimensions.unwrap_or(DEFAULT_DIMENSIONS);
    Ok(Arc::new(OpenAiEmbeddingProvider::new(
        base_url, api_key, model, dimensions,
    )))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static OPENAI_EMBEDDING: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "openai",
    description: "OpenAI embeddings API",
    build: openai_embedding_factory,
};
