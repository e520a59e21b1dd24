//! # Application Layer
//!
//! Use cases orchestrating the domain ports: the indexing pipeline, the
//! retrieval engine, the cache layers, analysis components, conversation
//! memory, documentation intelligence, and the refresh scheduler.
//!
//! Services receive every dependency through their constructors as
//! `Arc<dyn Port>`; nothing in this crate instantiates a backend directly.

/// Query and ingestion cache layers
pub mod cache;
/// Registered analysis/visualization/business components
pub mod components;
/// Conversation parsing and memory
pub mod conversation;
/// Documentation intelligence facade
pub mod doc_service;
/// Schema-constrained knowledge-graph extraction
pub mod graph_extractor;
/// Collection lifecycle over the vector and graph stores
pub mod index_store;
/// Ingest pipeline: read, split, embed, persist
pub mod indexing_service;
/// Periodic documentation refresh
pub mod refresh_scheduler;
/// Semantic query, existence, routing, and sub-question answering
pub mod retrieval_service;
/// Language-aware code splitting and sentence splitting
pub mod splitter;

pub use cache::{CacheMode, IngestionCache, QueryCache};
pub use conversation::{ConversationService, ParsedConversations};
pub use doc_service::DocService;
pub use graph_extractor::GraphExtractor;
pub use index_store::IndexStore;
pub use indexing_service::{IndexingOptions, IndexingService};
pub use refresh_scheduler::{RefreshScheduler, RefreshSchedulerConfig};
pub use retrieval_service::RetrievalService;
pub use splitter::Splitter;
