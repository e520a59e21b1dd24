//! External Provider Ports

#![allow(missing_docs)]

use std::collections::HashMap;

use async_trait::async_trait;

use crate::entities::{Document, GraphExport, GraphTriplet};
use crate::error::Result;
use crate::value_objects::{CacheEntryConfig, CollectionId, Embedding, SearchResult, VectorPoint};

// ============================================================================
// Embedding
// ============================================================================

/// Text-to-vector conversion provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Embedding> {
        let embeddings = self.embed_batch(&[text.to_owned()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| crate::error::Error::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Embedding>>;
    fn dimensions(&self) -> usize;
    fn provider_name(&self) -> &str;

    async fn health_check(&self) -> Result<()> {
        self.embed("health check").await?;
        Ok(())
    }
}

// ============================================================================
// LLM
// ============================================================================

/// Which completion model a request should be served by.
///
/// `Fast` answers retrieval synthesis and simple lookups; `Complex` handles
/// reasoning-heavy work (routing, decomposition, graph extraction);
/// `ComplexAlt` is the fallback reasoning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmKind {
    Fast,
    Complex,
    ComplexAlt,
}

impl LlmKind {
    /// Request deadline for this model tier.
    #[must_use]
    pub fn timeout(self) -> std::time::Duration {
        let secs = match self {
            Self::Fast => 60,
            Self::Complex => 120,
            Self::ComplexAlt => 90,
        };
        std::time::Duration::from_secs(secs)
    }
}

/// Text completion provider.
///
/// One interface serves all model tiers; the provider maps the kind to a
/// concrete model id and its per-tier deadline.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    async fn complete(&self, prompt: &str, kind: LlmKind) -> Result<String>;
    fn model_for(&self, kind: LlmKind) -> &str;
    fn provider_name(&self) -> &str;
}

// ============================================================================
// Vector Store
// ============================================================================

/// Vector similarity store client.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    async fn collection_exists(&self, collection: &CollectionId) -> Result<bool>;
    async fn create_collection(&self, collection: &CollectionId, dimensions: usize) -> Result<()>;
    async fn delete_collection(&self, collection: &CollectionId) -> Result<()>;
    async fn list_collections(&self) -> Result<Vec<String>>;
    async fn upsert_points(&self, collection: &CollectionId, points: &[VectorPoint]) -> Result<()>;
    async fn search_points(
        &self,
        collection: &CollectionId,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>>;
    async fn point_count(&self, collection: &CollectionId) -> Result<u64>;

    /// Stream stored payloads, `limit` at most. Used by refresh to recover
    /// document content hashes when the ingestion cache is unavailable.
    async fn scroll_payloads(
        &self,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<Vec<HashMap<String, serde_json::Value>>>;

    fn provider_name(&self) -> &str;

    async fn health_check(&self) -> Result<()> {
        self.list_collections().await?;
        Ok(())
    }
}

// ============================================================================
// Cache
// ============================================================================

/// Key-value cache backend.
#[async_trait]
pub trait CacheProvider: Send + Sync + std::fmt::Debug {
    async fn get_json(&self, key: &str) -> Result<Option<String>>;
    async fn set_json(&self, key: &str, value: &str, config: CacheEntryConfig) -> Result<()>;
    async fn delete(&self, key: &str) -> Result<bool>;
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Connectivity probe used once at startup to decide cache degradation.
    async fn ping(&self) -> Result<()>;

    fn provider_name(&self) -> &str;
}

// ============================================================================
// Graph Store
// ============================================================================

/// Filter for triplet queries.
#[derive(Debug, Clone, Default)]
pub struct TripletFilter {
    /// Match triplets whose subject or object equals this label
    pub entity: Option<String>,
    /// Match triplets with this relation
    pub relation: Option<String>,
}

/// Property-graph store for extracted triplets.
///
/// The backend is pluggable; the in-process store keeps one graph per
/// collection behind a mutex-guarded map with atomic get-or-create.
#[async_trait]
pub trait GraphStore: Send + Sync {
    async fn upsert_triplets(
        &self,
        collection: &CollectionId,
        triplets: Vec<GraphTriplet>,
    ) -> Result<()>;
    async fn triplets(
        &self,
        collection: &CollectionId,
        filter: Option<&TripletFilter>,
    ) -> Result<Vec<GraphTriplet>>;
    async fn clear(&self, collection: &CollectionId) -> Result<()>;

    /// Mermaid rendering of the collection's graph.
    async fn visualize(&self, collection: &CollectionId) -> Result<String>;

    /// Adjacency-list export of the collection's graph.
    async fn export(&self, collection: &CollectionId) -> Result<GraphExport>;

    fn provider_name(&self) -> &str;
}

// ============================================================================
// Document Readers
// ============================================================================

/// A source of documents.
///
/// Readers return an empty sequence when there is nothing to load, and fail
/// with a read error only on unreachable sources or malformed structure.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn load(&self) -> Result<Vec<Document>>;
    fn reader_name(&self) -> &str;
}
