//! Core business entities with identity

/// Collection manifests and index modes
pub mod collection;
/// Source documents produced by readers
pub mod document;
/// Knowledge-graph triplets and extraction schemas
pub mod graph;
/// Splitter output chunks
pub mod node;

pub use collection::{CollectionManifest, CollectionStats, IndexMode};
pub use document::{Document, DocumentMetadata};
pub use graph::{
    BusinessEntity, BusinessRelation, CodeEntity, CodeRelation, GraphEdge, GraphExport, GraphNode,
    GraphSchema, GraphTriplet,
};
pub use node::Node;
