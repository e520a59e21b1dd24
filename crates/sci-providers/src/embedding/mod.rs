//! Embedding providers.

/// Deterministic hash-based embedder for tests and offline use
pub mod null;
/// Ollama local embedding API
pub mod ollama;
/// OpenAI embeddings API
pub mod openai;

pub use null::NullEmbeddingProvider;
pub use ollama::OllamaEmbeddingProvider;
pub use openai::OpenAiEmbeddingProvider;
