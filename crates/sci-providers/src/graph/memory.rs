//! In-process property-graph store.
//!
//! One triplet list per collection behind a mutex-guarded map; creation is
//! get-or-create atomic. Optionally persists each collection's triplets as
//! JSON so graphs survive restarts when a persist path is configured.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use petgraph::graph::DiGraph;
use sci_domain::entities::{GraphEdge, GraphExport, GraphNode, GraphTriplet};
use sci_domain::error::Result;
use sci_domain::ports::providers::{GraphStore, TripletFilter};
use sci_domain::value_objects::CollectionId;
use tracing::warn;

/// Process-local graph store keyed by collection.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    graphs: Mutex<HashMap<String, Vec<GraphTriplet>>>,
    persist_dir: Option<PathBuf>,
}

impl MemoryGraphStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store persisting each collection's triplets under `dir`.
    #[must_use]
    pub fn with_persist_dir(dir: PathBuf) -> Self {
        Self {
            graphs: Mutex::new(HashMap::new()),
            persist_dir: Some(dir),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<GraphTriplet>>> {
        match self.graphs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn persist(&self, collection: &CollectionId, triplets: &[GraphTriplet]) {
        let Some(dir) = &self.persist_dir else {
            return;
        };
        let path = dir.join(format!("{collection}.json"));
        let write = || -> std::io::Result<()> {
            std::fs::create_dir_all(dir)?;
            let json = serde_json::to_string(triplets).unwrap_or_default();
            std::fs::write(&path, json)
        };
        if let Err(e) = write() {
            warn!(collection = %collection, error = %e, "Graph persistence failed");
        }
    }

    fn matches(triplet: &GraphTriplet, filter: Option<&TripletFilter>) -> bool {
        let Some(filter) = filter else {
            return true;
        };
        if let Some(entity) = &filter.entity {
            if &triplet.subject != entity && &triplet.object != entity {
                return false;
            }
        }
        if let Some(relation) = &filter.relation {
            if &triplet.predicate != relation {
                return false;
            }
        }
        true
    }

    /// Label for a mermaid node: alphanumeric id plus display text.
    fn mermaid_id(label: &str) -> String {
        label
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .take(24)
            .collect()
    }
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn upsert_triplets(
        &self,
        collection: &CollectionId,
        triplets: Vec<GraphTriplet>,
    ) -> Result<()> {
        let snapshot = {
            let mut graphs = self.lock();
            let entry = graphs.entry(collection.to_string()).or_default();
            for triplet in triplets {
                if !entry.contains(&triplet) {
                    entry.push(triplet);
                }
            }
            entry.clone()
        };
        self.persist(collection, &snapshot);
        Ok(())
    }

    async fn triplets(
        &self,
        collection: &CollectionId,
        filter: Option<&TripletFilter>,
    ) -> Result<Vec<GraphTriplet>> {
        let graphs = self.lock();
        Ok(graphs
            .get(collection.as_str())
            .map(|triplets| {
                triplets
                    .iter()
                    .filter(|t| Self::matches(t, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn clear(&self, collection: &CollectionId) -> Result<()> {
        self.lock().remove(collection.as_str());
        if let Some(dir) = &self.persist_dir {
            let path = dir.join(format!("{collection}.json"));
            if let Err(e) = std::fs::remove_file(&path) {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(collection = %collection, error = %e, "Graph file removal failed");
                }
            }
        }
        Ok(())
    }

    async fn visualize(&self, collection: &CollectionId) -> Result<String> {
        let triplets = self.triplets(collection, None).await?;
        if triplets.is_empty() {
            return Ok("graph TD\n    empty[No graph data]".to_owned());
        }

        let mut lines = vec!["graph TD".to_owned()];
        for t in &triplets {
            lines.push(format!(
                "    {}[{}] -->|{}| {}[{}]",
                Self::mermaid_id(&t.subject),
                t.subject,
                t.predicate,
                Self::mermaid_id(&t.object),
                t.object,
            ));
        }
        Ok(lines.join("\n"))
    }

    async fn export(&self, collection: &CollectionId) -> Result<GraphExport> {
        let triplets = self.triplets(collection, None).await?;

        let mut graph: DiGraph<GraphNode, String> = DiGraph::new();
        let mut indices = HashMap::new();

        for t in &triplets {
            let subject = *indices.entry(t.subject.clone()).or_insert_with(|| {
                graph.add_node(GraphNode {
                    id: t.subject.clone(),
                    kind: t.subject_kind.clone(),
                })
            });
            let object = *indices.entry(t.object.clone()).or_insert_with(|| {
                graph.add_node(GraphNode {
                    id: t.object.clone(),
                    kind: t.object_kind.clone(),
                })
            });
            graph.add_edge(subject, object, t.predicate.clone());
        }

        let nodes = graph.node_weights().cloned().collect();
        let edges = graph
            .edge_indices()
            .filter_map(|e| {
                let (source, target) = graph.edge_endpoints(e)?;
                Some(GraphEdge {
                    source: graph[source].id.clone(),
                    target: graph[target].id.clone(),
                    relation: graph[e].clone(),
                })
            })
            .collect();

        Ok(GraphExport { nodes, edges })
    }

    fn provider_name(&self) -> &str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triplet(subject: &str, predicate: &str, object: &str) -> GraphTriplet {
        GraphTriplet {
            subject: subject.to_owned(),
            subject_kind: "Class".to_owned(),
            predicate: predicate.to_owned(),
            object: object.to_owned(),
            object_kind: "Function".to_owned(),
            source_node_id: "src/a.rs#0".to_owned(),
        }
    }

    #[tokio::test]
    async fn upsert_deduplicates_identical_triplets() {
        let store = MemoryGraphStore::new();
        let collection = CollectionId::from_name("kg_demo");
        let t = triplet("A", "calls", "b");
        store
            .upsert_triplets(&collection, vec![t.clone(), t.clone()])
            .await
            .expect("upsert");
        store
            .upsert_triplets(&collection, vec![t])
            .await
            .expect("upsert again");

        let stored = store.triplets(&collection, None).await.expect("read");
        assert_eq!(stored.len(), 1);
    }

    #[tokio::test]
    async fn filters_narrow_by_entity_and_relation() {
        let store = MemoryGraphStore::new();
        let collection = CollectionId::from_name("kg_demo");
        store
            .upsert_triplets(
                &collection,
                vec![triplet("A", "calls", "b"), triplet("C", "imports", "d")],
            )
            .await
            .expect("upsert");

        let by_entity = store
            .triplets(
                &collection,
                Some(&TripletFilter {
                    entity: Some("A".to_owned()),
                    relation: None,
                }),
            )
            .await
            .expect("filter");
        assert_eq!(by_entity.len(), 1);
        assert_eq!(by_entity[0].subject, "A");

        let by_relation = store
            .triplets(
                &collection,
                Some(&TripletFilter {
                    entity: None,
                    relation: Some("imports".to_owned()),
                }),
            )
            .await
            .expect("filter");
        assert_eq!(by_relation.len(), 1);
        assert_eq!(by_relation[0].predicate, "imports");
    }

    #[tokio::test]
    async fn export_deduplicates_entities() {
        let store = MemoryGraphStore::new();
        let collection = CollectionId::from_name("kg_demo");
        store
            .upsert_triplets(
                &collection,
                vec![triplet("A", "calls", "b"), triplet("A", "uses", "c")],
            )
            .await
            .expect("upsert");

        let export = store.export(&collection).await.expect("export");
        assert_eq!(export.nodes.len(), 3);
        assert_eq!(export.edges.len(), 2);
    }

    #[tokio::test]
    async fn visualize_emits_mermaid() {
        let store = MemoryGraphStore::new();
        let collection = CollectionId::from_name("kg_demo");
        store
            .upsert_triplets(&collection, vec![triplet("Auth Service", "calls", "login")])
            .await
            .expect("upsert");

        let mermaid = store.visualize(&collection).await.expect("visualize");
        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("-->|calls|"));
    }
}
