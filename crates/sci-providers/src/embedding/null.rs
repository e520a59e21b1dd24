//! Deterministic hash-based embedder.
//!
//! Maps each text to a fixed-dimension vector derived from token hashes.
//! Identical texts embed identically and sharing tokens moves vectors
//! closer, which is enough for tests and offline smoke runs. Not a
//! semantic model.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::Result;
use sci_domain::ports::providers::EmbeddingProvider;
use sci_domain::registry::embedding::{
    EmbeddingProviderConfig, EmbeddingProviderEntry, EMBEDDING_PROVIDERS,
};
use sci_domain::value_objects::Embedding;

const DEFAULT_DIMENSIONS: usize = 64;

/// Deterministic embedding provider with no external dependencies.
pub struct NullEmbeddingProvider {
    dimensions: usize,
}

impl NullEmbeddingProvider {
    /// Create a provider emitting vectors of the given dimensionality.
    #[must_use]
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for token in text.split_whitespace() {
            let bucket = fxhash(token) as usize % self.dimensions;
            vector[bucket] += 1.0;
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

impl Default for NullEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

#[async_trait]
impl EmbeddingProvider for NullEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        Ok(texts
            .iter()
            .map(|t| Embedding::new(self.embed_text(t), "null"))
            .collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn provider_name(&self) -> &str {
        "null"
    }
}

/// FNV-1a, enough to spread tokens across buckets deterministically.
fn fxhash(token: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in token.bytes() {
        hash ^= u64::from(byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

fn null_embedding_factory(
    config: &EmbeddingProviderConfig,
) -> std::result::Result<Arc<dyn EmbeddingProvider>, String> {
    Ok(Arc::new(NullEmbeddingProvider::new(
        config.dimensions.unwrap_or(DEFAULT_DIMENSIONS),
    )))
}

#[linkme::distributed_slice(EMBEDDING_PROVIDERS)]
static NULL_EMBEDDING: EmbeddingProviderEntry = EmbeddingProviderEntry {
    name: "null",
    description: "Deterministic hash-based embedder for tests and offline use",
    build: null_embedding_factory,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_texts_embed_identically() {
        let provider = NullEmbeddingProvider::default();
        let a = provider.embed("fn main() {}").await.expect("embed");
        let b = provider.embed("fn main() {}").await.expect("embed");
        assert_eq!(a.vector, b.vector);
    }

    #[tokio::test]
    async fn shared_tokens_increase_similarity() {
        let provider = NullEmbeddingProvider::default();
        let base = provider.embed("parse json config file").await.expect("embed");
        let close = provider.embed("parse json config").await.expect("embed");
        let far = provider.embed("websocket transport frame").await.expect("embed");

        let dot = |a: &[f32], b: &[f32]| -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() };
        assert!(dot(&base.vector, &close.vector) > dot(&base.vector, &far.vector));
    }

    #[tokio::test]
    async fn vectors_are_unit_norm() {
        let provider = NullEmbeddingProvider::new(32);
        let e = provider.embed("some text").await.expect("embed");
        let norm: f32 = e.vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
        assert_eq!(e.dimensions, 32);
    }
}
