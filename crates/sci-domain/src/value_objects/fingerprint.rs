//! Cache key derivation for query results.

use md5::{Digest, Md5};

use crate::value_objects::CollectionId;

/// The deterministic key under which a query result is cached.
///
/// Derived as `md5(query) || "|" || limit || "|" || collection` so that the
/// same question against the same collection with the same limit always maps
/// to the same cache slot, and nothing else does.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryFingerprint(String);

impl QueryFingerprint {
    /// Compute the fingerprint for a query against a collection.
    #[must_use]
    pub fn compute(query: &str, limit: usize, collection: &CollectionId) -> Self {
        let mut hasher = Md5::new();
        hasher.update(query.as_bytes());
        let digest = hex::encode(hasher.finalize());
        Self(format!("{digest}|{limit}|{collection}"))
    }

    /// The cache key string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for QueryFingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_inputs_produce_identical_keys() {
        let collection = CollectionId::from_name("demo");
        let a = QueryFingerprint::compute("how does auth work", 5, &collection);
        let b = QueryFingerprint::compute("how does auth work", 5, &collection);
        assert_eq!(a, b);
    }

    #[test]
    fn limit_and_collection_are_part_of_the_key() {
        let demo = CollectionId::from_name("demo");
        let docs = CollectionId::from_name("docs_react");
        let base = QueryFingerprint::compute("query", 5, &demo);
        assert_ne!(base, QueryFingerprint::compute("query", 3, &demo));
        assert_ne!(base, QueryFingerprint::compute("query", 5, &docs));
    }
}
