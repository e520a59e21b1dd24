//! Immutable value objects

/// Cache key derivation for query results
pub mod fingerprint;
/// Strong-typed identifiers
pub mod ids;
/// Retrieval and reporting value types
pub mod types;

pub use fingerprint::QueryFingerprint;
pub use ids::CollectionId;
pub use types::{
    CacheEntryConfig, Citation, CitedAnswer, Embedding, ExistenceReport, IndexOutcome,
    RefreshOutcome, SearchResult, VectorPoint, DEFAULT_CACHE_TTL_SECS,
};
