//! Vector store providers.

/// In-memory store for tests and offline use
pub mod memory;
/// Qdrant REST client
pub mod qdrant;

pub use memory::MemoryVectorStoreProvider;
pub use qdrant::QdrantVectorStoreProvider;
