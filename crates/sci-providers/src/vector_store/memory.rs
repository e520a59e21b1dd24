//! In-memory vector store.
//!
//! Brute-force cosine search over process-local collections. Used by tests
//! and offline runs; also counts search calls so cache-hit behavior can be
//! asserted structurally.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::VectorStoreProvider;
use sci_domain::registry::vector_store::{
    VectorStoreProviderConfig, VectorStoreProviderEntry, VECTOR_STORE_PROVIDERS,
};
use sci_domain::value_objects::{CollectionId, SearchResult, VectorPoint};
use serde_json::Value;

use sci_application::index_store::payload_keys;

#[derive(Debug, Default)]
struct Collection {
    dimensions: usize,
    points: HashMap<String, (Vec<f32>, HashMap<String, Value>)>,
}

/// Process-local vector store with exact cosine search.
#[derive(Debug, Default)]
pub struct MemoryVectorStoreProvider {
    collections: Mutex<HashMap<String, Collection>>,
    search_calls: AtomicUsize,
}

impl MemoryVectorStoreProvider {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of similarity searches served so far.
    ///
    /// Lets tests verify that cache hits bypass the store entirely.
    #[must_use]
    pub fn search_call_count(&self) -> usize {
        self.search_calls.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Collection>> {
        // Mutex poisoning only happens when a holder panicked; propagating
        // the inner state is still sound for a test double.
        match self.collections.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    dot / (na * nb)
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStoreProvider {
    async fn collection_exists(&self, collection: &CollectionId) -> Result<bool> {
        Ok(self.lock().contains_key(collection.as_str()))
    }

    async fn create_collection(&self, collection: &CollectionId, dimensions: usize) -> Result<()> {
        self.lock()
            .entry(collection.to_string())
            .or_insert_with(|| Collection {
                dimensions,
                points: HashMap::new(),
            });
        Ok(())
    }

    async fn delete_collection(&self, collection: &CollectionId) -> Result<()> {
        self.lock().remove(collection.as_str());
        Ok(())
    }

    async fn list_collections(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn upsert_points(&self, collection: &CollectionId, points: &[VectorPoint]) -> Result<()> {
        let mut collections = self.lock();
        let entry = collections
            .get_mut(collection.as_str())
            .ok_or_else(|| Error::not_found(format!("collection '{collection}'")))?;

        for point in points {
            if point.vector.len() != entry.dimensions {
                return Err(Error::vector_store(format!(
                    "Vector dimension {} does not match collection dimension {}",
                    point.vector.len(),
                    entry.dimensions
                )));
            }
            entry
                .points
                .insert(point.id.clone(), (point.vector.clone(), point.payload.clone()));
        }
        Ok(())
    }

    async fn search_points(
        &self,
        collection: &CollectionId,
        query_vector: &[f32],
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        self.search_calls.fetch_add(1, Ordering::Relaxed);

        let collections = self.lock();
        let entry = collections
            .get(collection.as_str())
            .ok_or_else(|| Error::not_found(format!("collection '{collection}'")))?;

        let mut scored: Vec<SearchResult> = entry
            .points
            .values()
            .map(|(vector, payload)| {
                let str_field = |key: &str| {
                    payload
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_owned()
                };
                SearchResult {
                    node_id: str_field(payload_keys::NODE_ID),
                    file_path: str_field(payload_keys::FILE_PATH),
                    content: str_field(payload_keys::CONTENT),
                    score: cosine(query_vector, vector),
                }
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn point_count(&self, collection: &CollectionId) -> Result<u64> {
        let collections = self.lock();
        let entry = collections
            .get(collection.as_str())
            .ok_or_else(|| Error::not_found(format!("collection '{collection}'")))?;
        Ok(entry.points.len() as u64)
    }

    async fn scroll_payloads(
        &self,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<Vec<HashMap<String, Value>>> {
        let collections = self.lock();
        let entry = collections
            .get(collection.as_str())
            .ok_or_else(|| Error::not_found(format!("collection '{collection}'")))?;
        Ok(entry
            .points
            .values()
            .take(limit)
            .map(|(_, payload)| payload.clone())
            .collect())
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

fn memory_factory(
    _config: &VectorStoreProviderConfig,
) -> std::result::Result<Arc<dyn VectorStoreProvider>, String> {
    Ok(Arc::new(MemoryVectorStoreProvider::new()))
}

#[linkme::distributed_slice(VECTOR_STORE_PROVIDERS)]
static MEMORY_PROVIDER: VectorStoreProviderEntry = VectorStoreProviderEntry {
    name: "memory",
    description: "Process-local vector store with exact cosine search",
    build: memory_factory,
};

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn point(id: &str, vector: Vec<f32>) -> VectorPoint {
        VectorPoint {
            id: id.to_owned(),
            vector,
            payload: HashMap::from([
                (payload_keys::NODE_ID.to_owned(), json!(id)),
                (payload_keys::CONTENT.to_owned(), json!("text")),
                (payload_keys::FILE_PATH.to_owned(), json!("f.rs")),
            ]),
        }
    }

    #[tokio::test]
    async fn upsert_is_idempotent_by_point_id() {
        let store = MemoryVectorStoreProvider::new();
        let collection = CollectionId::from_name("demo");
        store.create_collection(&collection, 2).await.expect("create");

        let points = vec![point("a", vec![1.0, 0.0]), point("b", vec![0.0, 1.0])];
        store.upsert_points(&collection, &points).await.expect("write");
        store.upsert_points(&collection, &points).await.expect("rewrite");

        assert_eq!(store.point_count(&collection).await.expect("count"), 2);
    }

    #[tokio::test]
    async fn search_orders_by_score_then_id() {
        let store = MemoryVectorStoreProvider::new();
        let collection = CollectionId::from_name("demo");
        store.create_collection(&collection, 2).await.expect("create");
        store
            .upsert_points(
                &collection,
                &[
                    point("b", vec![1.0, 0.0]),
                    point("a", vec![1.0, 0.0]),
                    point("c", vec![0.0, 1.0]),
                ],
            )
            .await
            .expect("write");

        let results = store
            .search_points(&collection, &[1.0, 0.0], 3)
            .await
            .expect("search");
        assert_eq!(results.len(), 3);
        // Equal scores fall back to lexicographic node id.
        assert_eq!(results[0].node_id, "a");
        assert_eq!(results[1].node_id, "b");
        assert_eq!(results[2].node_id, "c");
    }

    #[tokio::test]
    async fn dimension_mismatch_is_rejected() {
        let store = MemoryVectorStoreProvider::new();
        let collection = CollectionId::from_name("demo");
        store.create_collection(&collection, 2).await.expect("create");

        let result = store
            .upsert_points(&collection, &[point("a", vec![1.0, 0.0, 0.0])])
            .await;
        assert!(matches!(result, Err(Error::VectorStore { .. })));
    }
}
