//! Strong-typed identifiers.
//!
//! Collections are addressed by name in the vector store, so the identifier
//! wraps the (already prefixed) name rather than a UUID. The naming
//! conventions are `<prefix><project>` for code collections, `docs_<fw>` for
//! documentation frameworks, and `kg_<project>` for standalone knowledge
//! graphs.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Prefix for documentation framework collections.
pub const DOCS_COLLECTION_PREFIX: &str = "docs_";

/// Prefix for standalone knowledge-graph collections.
pub const KG_COLLECTION_PREFIX: &str = "kg_";

/// Strong-typed identifier for a collection.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[display("{_0}")]
#[serde(transparent)]
pub struct CollectionId(String);

impl CollectionId {
    /// Wrap an existing collection name.
    pub fn from_name(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Collection name for a project under the configured prefix.
    pub fn prefixed(prefix: &str, project: &str) -> Self {
        Self(format!("{prefix}{project}"))
    }

    /// Collection name for a documentation framework.
    pub fn docs(framework: &str) -> Self {
        Self(format!("{DOCS_COLLECTION_PREFIX}{framework}"))
    }

    /// Collection name for a standalone knowledge graph.
    pub fn knowledge_graph(project: &str) -> Self {
        Self(format!("{KG_COLLECTION_PREFIX}{project}"))
    }

    /// The underlying collection name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is a documentation framework collection.
    #[must_use]
    pub fn is_docs(&self) -> bool {
        self.0.starts_with(DOCS_COLLECTION_PREFIX)
    }

    /// The framework name, when this is a documentation collection.
    #[must_use]
    pub fn framework(&self) -> Option<&str> {
        self.0.strip_prefix(DOCS_COLLECTION_PREFIX)
    }

    /// Whether this collection holds conversation memory.
    #[must_use]
    pub fn is_conversation(&self) -> bool {
        self.0.contains("conversation") || self.0.contains("memory")
    }
}

impl From<String> for CollectionId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl From<&str> for CollectionId {
    fn from(name: &str) -> Self {
        Self(name.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn docs_collections_are_recognized() {
        let id = CollectionId::docs("react");
        assert_eq!(id.as_str(), "docs_react");
        assert!(id.is_docs());
        assert_eq!(id.framework(), Some("react"));
    }

    #[test]
    fn project_collections_are_not_docs() {
        let id = CollectionId::prefixed("sci_", "demo");
        assert_eq!(id.as_str(), "sci_demo");
        assert!(!id.is_docs());
        assert_eq!(id.framework(), None);
    }

    #[test]
    fn conversation_collections_are_recognized() {
        assert!(CollectionId::from_name("conversations").is_conversation());
        assert!(CollectionId::from_name("team_memory").is_conversation());
        assert!(!CollectionId::from_name("demo").is_conversation());
    }
}
