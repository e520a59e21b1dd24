//! Ollama embedding provider.
//!
//! Talks to a local Ollama daemon over its native embeddings API. One
//! request per text; Ollama has no batch endpoint.

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

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "nomic-embed-text";
/// nomic-embed-text output dimensionality.
const DEFAULT_DIMENSIONS: usize = 768;

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedding provider backed by a local Ollama daemon.
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    /// Create a provider against the given daemon URL and model.
    #[must_use]
    pub fn new(base_url: String, model: String, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            model,
            dimensions,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            let response = self
                .client
                .post(format!("{}/api/embeddings", self.base_url))
                .json(&json!({ "model": self.model, "prompt": text }))
                .send()
                .await
                .map_err(|e| Error::network_with_source("Ollama embeddings request failed", e))?;

            if !response.status().is_success() {
                return Err(Error::embedding(format!(
                    "Ollama embeddings returned {}",
                    response.status()
                )));
            }

            let body: OllamaEmbeddingResponse = response
                .json()
                .await
                .map_err(|e| Error::network_with_source("Malformed Ollama response", e))?;
            embeddings.push(Embedding::new(body.embedding, self.model.clone()));
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "ollama"
    }
}

fn ollama_embedding_factory(
    config: &EmbeddingProviderConfig,
) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    let base_url = config
        .base_url
        .clone()
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
    let model = config
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_MODEL.to_owned());
    let dimensions = config.dimensions.unwrap_or(DEFAULT_DIMENSIONS);
    Ok(Arc::new(OllamaEmbeddingProvider::new(
        base_url, model, dimensions,
    )))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static OLLAMA_EMBEDDING: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "ollama",
    description: "Ollama local embedding models",
    build: ollama_embedding_factory,
};
