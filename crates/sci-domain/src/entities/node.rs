//! Splitter output chunks.

use serde::{Deserialize, Serialize};

use crate::entities::DocumentMetadata;

/// A chunk derived from a document.
///
/// Created by the splitter, owned by the index store after write. Node ids
/// are derived from the parent document id plus the chunk index, which keeps
/// repeated writes idempotent and lets refresh replace a document's chunks
/// deterministically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable chunk identifier: `"{doc_id}#{chunk_index}"`
    pub id: String,
    /// Identifier of the parent document
    pub doc_id: String,
    /// Chunk text
    pub text: String,
    /// Position of this chunk within the parent document
    pub chunk_index: usize,
    /// Metadata inherited from the parent document
    pub metadata: DocumentMetadata,
    /// Content hash of the parent document, for refresh delta detection
    pub doc_content_hash: String,
}

impl Node {
    /// Build the stable node id for a document chunk.
    #[must_use]
    pub fn make_id(doc_id: &str, chunk_index: usize) -> String {
        format!("{doc_id}#{chunk_index}")
    }
}

#[cfg(test)]
mod tests {
    use super::Node;

    #[test]
    fn node_ids_are_stable() {
        assert_eq!(Node::make_id("src/main.rs", 0), "src/main.rs#0");
        assert_eq!(Node::make_id("src/main.rs", 7), "src/main.rs#7");
    }
}
