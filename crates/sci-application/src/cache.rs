//! Query-result and ingestion caches with key derivation.
//!
//! Both layers share one KV backend. If the backend is unreachable at
//! startup the cache degrades to disabled: every get is a miss, every put
//! returns false, nothing errors. The degradation is logged once and never
//! retried in-process.

use std::sync::Arc;
use std::time::Duration;

use sci_domain::ports::providers::CacheProvider;
use sci_domain::value_objects::{CacheEntryConfig, CollectionId, QueryFingerprint};
use tracing::{debug, warn};

/// Whether the cache backend is in use, decided once at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Backend reachable; reads and writes go through
    On,
    /// Backend disabled or unreachable; all reads miss, all writes no-op
    Off,
}

/// Query-result cache keyed by [`QueryFingerprint`].
#[derive(Debug, Clone)]
pub struct QueryCache {
    provider: Arc<dyn CacheProvider>,
    mode: CacheMode,
    ttl: Duration,
}

impl QueryCache {
    /// Probe the backend once and build the cache layer.
    ///
    /// A failed ping or `enabled = false` selects [`CacheMode::Off`].
    pub async fn connect(provider: Arc<dyn CacheProvider>, ttl_secs: u64, enabled: bool) -> Self {
        let mode = if !enabled {
            CacheMode::Off
        } else {
            match provider.ping().await {
                Ok(()) => CacheMode::On,
                Err(e) => {
                    warn!(error = %e, "Cache backend unreachable, degrading to disabled");
                    CacheMode::Off
                }
            }
        };

        Self {
            provider,
            mode,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Build a cache layer with a known mode (used by the ingestion cache
    /// which shares the query cache's probe result).
    #[must_use]
    pub fn with_mode(provider: Arc<dyn CacheProvider>, ttl_secs: u64, mode: CacheMode) -> Self {
        Self {
            provider,
            mode,
            ttl: Duration::from_secs(ttl_secs),
        }
    }

    /// Current cache mode.
    #[must_use]
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Look up a cached result. Backend errors are treated as misses.
    pub async fn get(&self, query: &str, limit: usize, collection: &CollectionId) -> Option<String> {
        if self.mode == CacheMode::Off {
            return None;
        }
        let key = QueryFingerprint::compute(query, limit, collection);
        match self.provider.get_json(key.as_str()).await {
            Ok(hit) => hit,
            Err(e) => {
                debug!(error = %e, "Cache get failed, treating as miss");
                None
            }
        }
    }

    /// Store a result. Returns false when disabled or on backend failure.
    pub async fn put(
        &self,
        query: &str,
        limit: usize,
        collection: &CollectionId,
        value: &str,
    ) -> bool {
        if self.mode == CacheMode::Off {
            return false;
        }
        let key = QueryFingerprint::compute(query, limit, collection);
        let config = CacheEntryConfig::default().with_ttl_secs(self.ttl.as_secs());
        match self.provider.set_json(key.as_str(), value, config).await {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Cache put failed");
                false
            }
        }
    }

    /// Drop a cached result. Returns false when disabled or absent.
    pub async fn delete(&self, query: &str, limit: usize, collection: &CollectionId) -> bool {
        if self.mode == CacheMode::Off {
            return false;
        }
        let key = QueryFingerprint::compute(query, limit, collection);
        self.provider.delete(key.as_str()).await.unwrap_or(false)
    }
}

/// Ingestion cache: per-collection map of document id to content hash.
///
/// Lets refresh skip unchanged documents without scrolling the vector store.
#[derive(Debug, Clone)]
pub struct IngestionCache {
    provider: Arc<dyn CacheProvider>,
    mode: CacheMode,
}

impl IngestionCache {
    /// Build the ingestion cache sharing the query cache's probe result.
    #[must_use]
    pub fn new(provider: Arc<dyn CacheProvider>, mode: CacheMode) -> Self {
        Self { provider, mode }
    }

    /// Whether the backend is usable.
    #[must_use]
    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    fn key(collection: &CollectionId, doc_id: &str) -> String {
        format!("ingest:{collection}:{doc_id}")
    }

    /// Stored content hash for a document, if known.
    pub async fn get_hash(&self, collection: &CollectionId, doc_id: &str) -> Option<String> {
        if self.mode == CacheMode::Off {
            return None;
        }
        self.provider
            .get_json(&Self::key(collection, doc_id))
            .await
            .ok()
            .flatten()
    }

    /// Record the content hash for a document. Failures are non-fatal.
    pub async fn put_hash(&self, collection: &CollectionId, doc_id: &str, hash: &str) -> bool {
        if self.mode == CacheMode::Off {
            return false;
        }
        // Ingestion entries have no TTL: the hash is valid until overwritten.
        let config = CacheEntryConfig {
            ttl: None,
            namespace: Some(collection.to_string()),
        };
        match self
            .provider
            .set_json(&Self::key(collection, doc_id), hash, config)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Ingestion cache put failed");
                false
            }
        }
    }
}

