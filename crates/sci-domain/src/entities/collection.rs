//! Collection manifests and index modes.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which stores back a collection.
///
/// A collection's mode is immutable after creation; opening a collection in
/// a different mode is a conflict. `Auto` is a request-time value only and
/// is resolved to a concrete mode before the manifest is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    /// Dense-vector retrieval only
    Vector,
    /// Property-graph retrieval backed by a vector store
    Graph,
    /// Both vector and graph retrieval
    Hybrid,
    /// Resolve at creation time: graph for new collections, vector for
    /// existing collections without a graph store
    Auto,
}

impl IndexMode {
    /// Whether this mode maintains a graph store alongside the vectors.
    #[must_use]
    pub fn uses_graph(self) -> bool {
        matches!(self, Self::Graph | Self::Hybrid)
    }
}

impl fmt::Display for IndexMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Vector => "vector",
            Self::Graph => "graph",
            Self::Hybrid => "hybrid",
            Self::Auto => "auto",
        };
        f.write_str(s)
    }
}

impl FromStr for IndexMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            // "basic" was the historical spelling of vector mode
            "vector" | "basic" => Ok(Self::Vector),
            "graph" | "enterprise" => Ok(Self::Graph),
            "hybrid" => Ok(Self::Hybrid),
            "auto" => Ok(Self::Auto),
            other => Err(Error::invalid_argument(format!(
                "Unknown index mode '{other}'. Expected vector, graph, hybrid, or auto"
            ))),
        }
    }
}

/// Persisted description of a collection.
///
/// Written when the collection is created so that the resolved mode survives
/// restarts and subsequent opens are deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionManifest {
    /// Collection name (already prefixed)
    pub name: String,
    /// Resolved index mode; never `Auto`
    pub mode: IndexMode,
    /// Dimensionality of the stored vectors
    pub vector_dim: usize,
}

/// Point-in-time statistics for a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Number of stored points
    pub point_count: u64,
    /// Dimensionality of the stored vectors
    pub vector_dim: usize,
    /// The collection's persisted mode
    pub mode: IndexMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_round_trips_through_str() {
        for mode in [
            IndexMode::Vector,
            IndexMode::Graph,
            IndexMode::Hybrid,
            IndexMode::Auto,
        ] {
            assert_eq!(mode.to_string().parse::<IndexMode>().ok(), Some(mode));
        }
    }

    #[test]
    fn basic_is_an_alias_for_vector() {
        assert_eq!("basic".parse::<IndexMode>().ok(), Some(IndexMode::Vector));
    }

    #[test]
    fn unknown_mode_is_rejected() {
        assert!("turbo".parse::<IndexMode>().is_err());
    }

    #[test]
    fn graph_and_hybrid_use_graph_store() {
        assert!(IndexMode::Graph.uses_graph());
        assert!(IndexMode::Hybrid.uses_graph());
        assert!(!IndexMode::Vector.uses_graph());
    }
}
