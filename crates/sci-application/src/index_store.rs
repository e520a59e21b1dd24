//! Collection lifecycle over the vector and graph stores.
//!
//! Owns create/open/write/delete/refresh/stats per collection and persists a
//! manifest `{name, mode, vector_dim}` so that the resolved index mode
//! survives restarts and subsequent opens are deterministic.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sci_domain::entities::{
    CollectionManifest, CollectionStats, Document, GraphSchema, IndexMode, Node,
};
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::{EmbeddingProvider, GraphStore, VectorStoreProvider};
use sci_domain::utils::point_id_for_node;
use sci_domain::value_objects::{CollectionId, RefreshOutcome, VectorPoint};
use serde_json::json;
use tracing::{info, warn};

use crate::cache::IngestionCache;
use crate::graph_extractor::GraphExtractor;
use crate::splitter::{Splitter, CODE_EXTENSIONS};

/// Payload keys stored with every point.
pub mod payload_keys {
    /// Stable node id
    pub const NODE_ID: &str = "node_id";
    /// Parent document id
    pub const DOC_ID: &str = "doc_id";
    /// Source file or URL
    pub const FILE_PATH: &str = "file_path";
    /// Chunk text
    pub const CONTENT: &str = "content";
    /// Chunk position within the document
    pub const CHUNK_INDEX: &str = "chunk_index";
    /// Content hash of the parent document
    pub const CONTENT_HASH: &str = "content_hash";
    /// Conversation role, when present
    pub const ROLE: &str = "role";
}

/// How many payloads refresh scrolls when the ingestion cache is cold.
const SCROLL_PAGE_LIMIT: usize = 10_000;

/// JSON-file persistence for collection manifests.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    dir: PathBuf,
}

impl ManifestStore {
    /// Store manifests under `<storage_root>/manifests`.
    #[must_use]
    pub fn new(storage_root: &Path) -> Self {
        Self {
            dir: storage_root.join("manifests"),
        }
    }

    fn path_for(&self, collection: &CollectionId) -> PathBuf {
        self.dir.join(format!("{collection}.json"))
    }

    /// Load a manifest, if the collection was created by this service.
    pub async fn load(&self, collection: &CollectionId) -> Result<Option<CollectionManifest>> {
        let path = self.path_for(collection);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a manifest, creating the directory on first use.
    pub async fn save(&self, manifest: &CollectionManifest) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(format!("{}.json", manifest.name));
        let content = serde_json::to_string_pretty(manifest)?;
        tokio::fs::write(&path, content).await?;
        Ok(())
    }

    /// Remove a manifest; absent files are fine.
    pub async fn remove(&self, collection: &CollectionId) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(collection)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Create/open/persist vector and graph indices keyed by collection.
pub struct IndexStore {
    vector_store: Arc<dyn VectorStoreProvider>,
    embedding: Arc<dyn EmbeddingProvider>,
    graph_store: Arc<dyn GraphStore>,
    extractor: Arc<GraphExtractor>,
    splitter: Arc<Splitter>,
    ingestion_cache: IngestionCache,
    manifests: ManifestStore,
}

impl IndexStore {
    /// Create an index store with injected dependencies.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        vector_store: Arc<dyn VectorStoreProvider>,
        embedding: Arc<dyn EmbeddingProvider>,
        graph_store: Arc<dyn GraphStore>,
        extractor: Arc<GraphExtractor>,
        splitter: Arc<Splitter>,
        ingestion_cache: IngestionCache,
        manifests: ManifestStore,
    ) -> Self {
        Self {
            vector_store,
            embedding,
            graph_store,
            extractor,
            splitter,
            ingestion_cache,
            manifests,
        }
    }

    /// The splitter used for document ingestion.
    #[must_use]
    pub fn splitter(&self) -> &Splitter {
        &self.splitter
    }

    /// The backing vector store.
    #[must_use]
    pub fn vector_store(&self) -> &Arc<dyn VectorStoreProvider> {
        &self.vector_store
    }

    /// The backing graph store.
    #[must_use]
    pub fn graph_store(&self) -> &Arc<dyn GraphStore> {
        &self.graph_store
    }

    /// Whether a collection exists in the vector store.
    pub async fn exists(&self, collection: &CollectionId) -> Result<bool> {
        self.vector_store.collection_exists(collection).await
    }

    /// Resolve a requested mode against existing state.
    ///
    /// `auto` maps to graph for a brand-new collection and to vector for an
    /// existing collection that has no graph store behind it.
    async fn resolve_mode(&self, collection: &CollectionId, mode: IndexMode) -> Result<IndexMode> {
        if mode != IndexMode::Auto {
            return Ok(mode);
        }
        if let Some(manifest) = self.manifests.load(collection).await? {
            return Ok(manifest.mode);
        }
        if self.exists(collection).await? {
            return Ok(IndexMode::Vector);
        }
        Ok(IndexMode::Graph)
    }

    /// Create a collection with the given mode, persisting its manifest.
    ///
    /// # Errors
    ///
    /// Fails with a conflict when the collection already exists under a
    /// different mode.
    pub async fn create(
        &self,
        collection: &CollectionId,
        mode: IndexMode,
    ) -> Result<CollectionManifest> {
        let resolved = self.resolve_mode(collection, mode).await?;

        if let Some(existing) = self.manifests.load(collection).await? {
            if existing.mode != resolved {
                return Err(Error::conflict(format!(
                    "Collection '{collection}' already exists with mode '{}', requested '{resolved}'",
                    existing.mode
                )));
            }
            return Ok(existing);
        }

        let dimensions = self.embedding.dimensions();
        if !self.exists(collection).await? {
            self.vector_store
                .create_collection(collection, dimensions)
                .await?;
        }

        let manifest = CollectionManifest {
            name: collection.to_string(),
            mode: resolved,
            vector_dim: dimensions,
        };
        self.manifests.save(&manifest).await?;
        info!(collection = %collection, mode = %resolved, "Collection created");
        Ok(manifest)
    }

    /// Open a collection for reading.
    ///
    /// # Errors
    ///
    /// Fails with not-found when the collection is absent.
    pub async fn open(&self, collection: &CollectionId) -> Result<CollectionManifest> {
        if let Some(manifest) = self.manifests.load(collection).await? {
            return Ok(manifest);
        }
        // Collections created by other tools have vectors but no manifest.
        if self.exists(collection).await? {
            return Ok(CollectionManifest {
                name: collection.to_string(),
                mode: IndexMode::Vector,
                vector_dim: self.embedding.dimensions(),
            });
        }
        Err(Error::not_found(format!("collection '{collection}'")))
    }

    /// Embed and upsert nodes; idempotent by node id.
    ///
    /// For graph and hybrid collections the schema extractor additionally
    /// runs over the nodes and upserts triplets; extraction failures are
    /// logged, never fatal.
    pub async fn write(&self, collection: &CollectionId, nodes: &[Node]) -> Result<usize> {
        if nodes.is_empty() {
            return Ok(0);
        }
        let manifest = self.open(collection).await?;

        let texts: Vec<String> = nodes.iter().map(|n| n.text.clone()).collect();
        let embeddings = self.embedding.embed_batch(&texts).await?;
        if embeddings.len() != nodes.len() {
            return Err(Error::embedding(format!(
                "Embedding batch returned {} vectors for {} nodes",
                embeddings.len(),
                nodes.len()
            )));
        }

        let points: Vec<VectorPoint> = nodes
            .iter()
            .zip(embeddings)
            .map(|(node, embedding)| VectorPoint {
                id: point_id_for_node(&node.id),
                vector: embedding.vector,
                payload: node_payload(node),
            })
            .collect();

        self.vector_store.upsert_points(collection, &points).await?;

        for node in nodes {
            self.ingestion_cache
                .put_hash(collection, &node.doc_id, &node.doc_content_hash)
                .await;
        }

        if manifest.mode.uses_graph() {
            let schema = schema_for_nodes(nodes);
            match self.extractor.extract(nodes, schema).await {
                Ok(triplets) if !triplets.is_empty() => {
                    if let Err(e) = self.graph_store.upsert_triplets(collection, triplets).await {
                        warn!(collection = %collection, error = %e, "Graph upsert failed");
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(collection = %collection, error = %e, "Graph extraction failed");
                }
            }
        }

        Ok(points.len())
    }

    /// Remove all points, triplets, and the manifest; idempotent.
    pub async fn delete(&self, collection: &CollectionId) -> Result<()> {
        if self.exists(collection).await? {
            self.vector_store.delete_collection(collection).await?;
        }
        self.graph_store.clear(collection).await?;
        self.manifests.remove(collection).await?;
        Ok(())
    }

    /// Reconcile stored nodes against freshly loaded documents.
    ///
    /// Inserts new documents, updates changed ones, and leaves identical
    /// ones untouched. Documents not supplied are never deleted.
    pub async fn refresh(
        &self,
        collection: &CollectionId,
        docs: &[Document],
    ) -> Result<RefreshOutcome> {
        self.open(collection).await?;

        let mut stored_hashes: Option<HashMap<String, String>> = None;
        let mut refreshed = 0usize;
        let mut unchanged = 0usize;

        for doc in docs {
            let fresh_hash = sci_domain::utils::compute_content_hash(&doc.text);

            let stored = match self.ingestion_cache.get_hash(collection, &doc.id).await {
                Some(hash) => Some(hash),
                None => {
                    // Cache cold or disabled: fall back to scrolling stored payloads once.
                    if stored_hashes.is_none() {
                        stored_hashes = Some(self.stored_hashes(collection).await?);
                    }
                    stored_hashes
                        .as_ref()
                        .and_then(|m| m.get(&doc.id).cloned())
                }
            };

            if stored.as_deref() == Some(fresh_hash.as_str()) {
                unchanged += 1;
                continue;
            }

            let nodes = self.splitter.split(doc);
            self.write(collection, &nodes).await?;
            refreshed += 1;
        }

        Ok(RefreshOutcome {
            total: docs.len(),
            refreshed,
            unchanged,
            collection: collection.to_string(),
        })
    }

    /// Point count, vector dim, and mode for a collection.
    ///
    /// # Errors
    ///
    /// Fails with not-found when the collection is absent.
    pub async fn stats(&self, collection: &CollectionId) -> Result<CollectionStats> {
        let manifest = self.open(collection).await?;
        let point_count = self.vector_store.point_count(collection).await?;
        Ok(CollectionStats {
            point_count,
            vector_dim: manifest.vector_dim,
            mode: manifest.mode,
        })
    }

    /// List all collection names known to the vector store.
    pub async fn list_collections(&self) -> Result<Vec<String>> {
        self.vector_store.list_collections().await
    }

    async fn stored_hashes(&self, collection: &CollectionId) -> Result<HashMap<String, String>> {
        let payloads = self
            .vector_store
            .scroll_payloads(collection, SCROLL_PAGE_LIMIT)
            .await?;
        let mut hashes = HashMap::new();
        for payload in payloads {
            if let (Some(doc_id), Some(hash)) = (
                payload
                    .get(payload_keys::DOC_ID)
                    .and_then(serde_json::Value::as_str),
                payload
                    .get(payload_keys::CONTENT_HASH)
                    .and_then(serde_json::Value::as_str),
            ) {
                hashes.insert(doc_id.to_owned(), hash.to_owned());
            }
        }
        Ok(hashes)
    }
}

/// Payload map stored with a node's point.
fn node_payload(node: &Node) -> HashMap<String, serde_json::Value> {
    let mut payload = HashMap::from([
        (payload_keys::NODE_ID.to_owned(), json!(node.id)),
        (payload_keys::DOC_ID.to_owned(), json!(node.doc_id)),
        (
            payload_keys::FILE_PATH.to_owned(),
            json!(node.metadata.path),
        ),
        (payload_keys::CONTENT.to_owned(), json!(node.text)),
        (payload_keys::CHUNK_INDEX.to_owned(), json!(node.chunk_index)),
        (
            payload_keys::CONTENT_HASH.to_owned(),
            json!(node.doc_content_hash),
        ),
    ]);
    if let Some(role) = &node.metadata.role {
        payload.insert(payload_keys::ROLE.to_owned(), json!(role));
    }
    payload
}

/// Pick the extraction schema from the batch: code when any of the leading
/// nodes comes from a code file, business otherwise.
fn schema_for_nodes(nodes: &[Node]) -> GraphSchema {
    let is_code = nodes.iter().take(5).any(|n| {
        std::path::Path::new(&n.metadata.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| CODE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    });
    if is_code {
        GraphSchema::Code
    } else {
        GraphSchema::Business
    }
}

#[cfg(test)]
mod tests {
    use sci_domain::entities::DocumentMetadata;

    use super::*;

    fn node_from(file_name: &str) -> Node {
        Node {
            id: format!("{file_name}#0"),
            doc_id: file_name.to_owned(),
            text: "content".to_owned(),
            chunk_index: 0,
            metadata: DocumentMetadata {
                file_name: file_name.to_owned(),
                path: file_name.to_owned(),
                ..Default::default()
            },
            doc_content_hash: "h".to_owned(),
        }
    }

    #[test]
    fn code_files_select_the_code_schema() {
        assert_eq!(
            schema_for_nodes(&[node_from("notes.md"), node_from("main.py")]),
            GraphSchema::Code
        );
    }

    #[test]
    fn prose_batches_select_the_business_schema() {
        assert_eq!(
            schema_for_nodes(&[node_from("rules.md"), node_from("process.txt")]),
            GraphSchema::Business
        );
    }

    #[test]
    fn role_lands_in_the_payload() {
        let mut node = node_from("chat.jsonl");
        node.metadata.role = Some("user".to_owned());
        let payload = node_payload(&node);
        assert_eq!(payload[payload_keys::ROLE], json!("user"));
    }
}
