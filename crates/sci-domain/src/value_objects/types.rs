//! Retrieval and reporting value types.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default TTL for cached values when none is configured.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 3600;

/// A dense vector produced by an embedding provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    /// The vector components
    pub vector: Vec<f32>,
    /// Model that produced the vector
    pub model: String,
    /// Dimensionality of the vector
    pub dimensions: usize,
}

impl Embedding {
    /// Create an embedding, deriving the dimension count from the vector.
    pub fn new(vector: Vec<f32>, model: impl Into<String>) -> Self {
        let dimensions = vector.len();
        Self {
            vector,
            model: model.into(),
            dimensions,
        }
    }
}

/// A point to upsert into the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorPoint {
    /// Stable point id (derived from the node id)
    pub id: String,
    /// Dense vector
    pub vector: Vec<f32>,
    /// Arbitrary payload stored with the point
    pub payload: HashMap<String, serde_json::Value>,
}

/// A single similarity hit returned by the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the matching node
    pub node_id: String,
    /// Source file or URL of the chunk
    pub file_path: String,
    /// Chunk text
    pub content: String,
    /// Similarity score, passed through from the retriever unchanged
    pub score: f32,
}

/// A numbered source citation attached to an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// 1-based citation rank
    pub rank: usize,
    /// Source file of the cited chunk
    pub file: String,
    /// Similarity score of the cited chunk
    pub score: f32,
    /// At most 200 characters of the cited text
    pub preview: String,
}

/// An answer together with the source nodes that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitedAnswer {
    /// Synthesized answer text
    pub answer: String,
    /// Source citations, ranked from 1
    pub citations: Vec<Citation>,
}

/// Outcome of a component existence check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExistenceReport {
    /// Whether the component was found with sufficient confidence
    pub exists: bool,
    /// Retriever confidence in `[0, 1]`
    pub confidence: f32,
    /// Up to 500 characters of supporting context
    pub context: String,
    /// Source file of the best match, when one was found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Outcome of an indexing run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexOutcome {
    /// Number of documents ingested
    pub indexed: usize,
    /// Number of nodes written to the store
    pub nodes: usize,
    /// Resolved index mode of the collection
    pub mode: crate::entities::IndexMode,
    /// Target collection name
    pub collection: String,
}

/// Outcome of an incremental refresh.
///
/// `refreshed + unchanged` always equals the number of input documents;
/// refresh never deletes stored documents that were not supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Number of input documents
    pub total: usize,
    /// Documents inserted or updated
    pub refreshed: usize,
    /// Documents whose stored content was already identical
    pub unchanged: usize,
    /// Target collection name
    pub collection: String,
}

/// Per-entry options for cache writes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntryConfig {
    /// Time to live; `None` means the backend default
    pub ttl: Option<Duration>,
    /// Namespace the key belongs to
    pub namespace: Option<String>,
}

impl CacheEntryConfig {
    /// Config with the default TTL and no namespace.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ttl: Some(Duration::from_secs(DEFAULT_CACHE_TTL_SECS)),
            namespace: None,
        }
    }

    /// Override the TTL in seconds.
    #[must_use]
    pub fn with_ttl_secs(mut self, secs: u64) -> Self {
        self.ttl = Some(Duration::from_secs(secs));
        self
    }

    /// Place the entry in a namespace.
    #[must_use]
    pub fn with_namespace<S: Into<String>>(mut self, namespace: S) -> Self {
        self.namespace = Some(namespace.into());
        self
    }
}

impl Default for CacheEntryConfig {
    fn default() -> Self {
        Self::new()
    }
}
