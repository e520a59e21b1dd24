//! Ingest pipeline: read, split, embed, persist.
//!
//! # Overview
//! The `IndexingService` manages ingestion of source trees and documentation
//! corpora into the retrieval indices. It wires reader adapters to the
//! splitter and the index store, resolves the index mode, and reports what
//! was written.

use std::sync::Arc;

use sci_domain::entities::{Document, IndexMode, Node};
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{resolve_reader, ReaderConfig};
use sci_domain::value_objects::{CollectionId, IndexOutcome, RefreshOutcome};
use tracing::info;

use crate::index_store::IndexStore;

/// Reader-facing configuration for directory ingestion.
#[derive(Debug, Clone)]
pub struct IndexingOptions {
    /// Default mode for new collections
    pub default_mode: IndexMode,
    /// Recurse into subdirectories
    pub recursive: bool,
    /// Extensions to ingest, dot included
    pub file_extensions: Vec<String>,
    /// Glob patterns to exclude
    pub exclude_patterns: Vec<String>,
    /// Restrict the walk to these subpaths
    pub include_paths: Vec<String>,
}

impl Default for IndexingOptions {
    fn default() -> Self {
        Self {
            default_mode: IndexMode::Auto,
            recursive: true,
            file_extensions: [".py", ".js", ".ts", ".md", ".rs", ".go", ".java"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            exclude_patterns: ["node_modules", "__pycache__", ".git", "target"]
                .iter()
                .map(|s| (*s).to_owned())
                .collect(),
            include_paths: Vec::new(),
        }
    }
}

/// Orchestrates readers, the splitter, and the index store.
pub struct IndexingService {
    index_store: Arc<IndexStore>,
    options: IndexingOptions,
}

impl IndexingService {
    /// Create an indexing service with injected dependencies.
    #[must_use]
    pub fn new(index_store: Arc<IndexStore>, options: IndexingOptions) -> Self {
        Self {
            index_store,
            options,
        }
    }

    /// The underlying index store.
    #[must_use]
    pub fn index_store(&self) -> &Arc<IndexStore> {
        &self.index_store
    }

    fn directory_reader_config(&self, path: &str, filename_as_id: bool) -> ReaderConfig {
        ReaderConfig::new("directory", path)
            .with_file_extensions(self.options.file_extensions.clone())
            .with_exclude_patterns(self.options.exclude_patterns.clone())
            .with_include_paths(self.options.include_paths.clone())
            .with_filename_as_id(filename_as_id)
    }

    /// Index a directory tree into a collection.
    ///
    /// # Errors
    ///
    /// Fails with a read error when the directory yields no documents; no
    /// collection is created in that case.
    pub async fn index_project(
        &self,
        path: &str,
        collection: &CollectionId,
        mode: Option<IndexMode>,
    ) -> Result<IndexOutcome> {
        let reader = resolve_reader(&self.directory_reader_config(path, false))?;
        let docs = reader.load().await?;
        if docs.is_empty() {
            return Err(Error::read(format!("No documents found to index in '{path}'")));
        }

        let requested = mode.unwrap_or(self.options.default_mode);
        self.index_documents(&docs, collection, requested).await
    }

    /// Index pre-loaded documents into a collection.
    pub async fn index_documents(
        &self,
        docs: &[Document],
        collection: &CollectionId,
        mode: IndexMode,
    ) -> Result<IndexOutcome> {
        if docs.is_empty() {
            return Err(Error::read("No documents found to index"));
        }

        let manifest = self.index_store.create(collection, mode).await?;

        let nodes: Vec<Node> = docs
            .iter()
            .flat_map(|doc| self.index_store.splitter().split(doc))
            .collect();
        let written = self.index_store.write(collection, &nodes).await?;

        info!(
            collection = %collection,
            documents = docs.len(),
            nodes = written,
            mode = %manifest.mode,
            "Indexing completed"
        );

        Ok(IndexOutcome {
            indexed: docs.len(),
            nodes: written,
            mode: manifest.mode,
            collection: collection.to_string(),
        })
    }

    /// Incrementally refresh a collection from a directory tree.
    ///
    /// Loads documents with stable root-relative ids and reconciles them
    /// against stored state; identical documents are skipped.
    ///
    /// # Errors
    ///
    /// Fails with not-found when the collection has not been indexed yet.
    pub async fn refresh_project(
        &self,
        path: &str,
        collection: &CollectionId,
    ) -> Result<RefreshOutcome> {
        if !self.index_store.exists(collection).await? {
            return Err(Error::not_found(format!(
                "collection '{collection}' not indexed. Run index first"
            )));
        }

        let reader = resolve_reader(&self.directory_reader_config(path, true))?;
        let docs = reader.load().await?;
        let outcome = self.index_store.refresh(collection, &docs).await?;

        info!(
            collection = %collection,
            total = outcome.total,
            refreshed = outcome.refreshed,
            unchanged = outcome.unchanged,
            "Refresh completed"
        );
        Ok(outcome)
    }
}
