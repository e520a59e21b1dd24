//! # Provider Layer
//!
//! Concrete implementations of the domain's provider ports. Every provider
//! registers itself into the linkme registry slices declared in
//! `sci-domain`; infrastructure resolves them by name from configuration.
//!
//! | Family | Providers |
//! |--------|-----------|
//! | Embedding | `ollama`, `openai`, `null` |
//! | LLM | `ollama`, `openai`, `electronhub`, `null` |
//! | Vector store | `qdrant`, `memory` |
//! | Cache | `redis`, `moka`, `null` |
//! | Readers | `directory`, `url`, `github`, `web`, `conversation` |
//!
//! The graph store has a single in-process implementation constructed
//! directly by the infrastructure layer.

/// Cache providers
pub mod cache;
/// Embedding providers
pub mod embedding;
/// In-process property-graph store
pub mod graph;
/// Completion providers
pub mod llm;
/// Document readers
pub mod readers;
/// Vector store providers
pub mod vector_store;

pub use cache::{MokaCacheProvider, NullCacheProvider, RedisCacheProvider};
pub use embedding::{NullEmbeddingProvider, OllamaEmbeddingProvider, OpenAiEmbeddingProvider};
pub use graph::MemoryGraphStore;
pub use llm::{NullLlmProvider, OllamaLlmProvider, OpenAiCompatLlmProvider};
pub use readers::{
    ConversationReader, DirectoryReader, GitHubReader, UrlReader, WebCrawlReader,
};
pub use vector_store::{MemoryVectorStoreProvider, QdrantVectorStoreProvider};
