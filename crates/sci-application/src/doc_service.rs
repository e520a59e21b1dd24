//! Documentation intelligence facade.
//!
//! Indexes framework documentation corpora (offline trees, shared doc
//! directories, URLs, GitHub repos, crawled sites) into `docs_<framework>`
//! collections and serves pattern searches over them.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use sci_domain::entities::IndexMode;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::ports::services::RetrievalServiceInterface;
use sci_domain::registry::reader::{resolve_reader, ReaderConfig};
use sci_domain::utils::truncate_chars;
use sci_domain::value_objects::{CollectionId, IndexOutcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::indexing_service::IndexingService;

/// Maximum characters returned by a docs pattern search.
const PATTERN_RESPONSE_LIMIT: usize = 2000;

/// Extensions ingested from documentation trees.
const DOC_EXTENSIONS: &[&str] = &[".md", ".rst", ".txt", ".html", ".mdx"];

/// Auto-index entry for a framework.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoIndexEntry {
    /// Whether this framework may be indexed on demand
    #[serde(default)]
    pub enabled: bool,
    /// Documentation URL to fetch from
    #[serde(default)]
    pub url: String,
}

/// Documentation section of the service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocServiceConfig {
    /// Serve documentation from local trees only
    #[serde(default)]
    pub offline_mode: bool,
    /// Root of offline documentation trees (`<root>/<framework>`)
    #[serde(default)]
    pub offline_docs_path: Option<String>,
    /// Root of the shared documentation trees (`<root>/<framework>`)
    #[serde(default)]
    pub shared_docs_path: Option<String>,
    /// Frameworks that may be indexed on demand
    #[serde(default)]
    pub auto_index: HashMap<String, AutoIndexEntry>,
    /// Per-framework routing: indexed, context7, or web
    #[serde(default)]
    pub routing: HashMap<String, String>,
    /// Breadth-first crawl depth for web sources
    #[serde(default)]
    pub crawl_depth: usize,
}

/// Documentation indexing and search over `docs_<framework>` collections.
pub struct DocService {
    indexing: Arc<IndexingService>,
    retrieval: Arc<dyn RetrievalServiceInterface>,
    config: DocServiceConfig,
}

impl DocService {
    /// Create a documentation service with injected dependencies.
    #[must_use]
    pub fn new(
        indexing: Arc<IndexingService>,
        retrieval: Arc<dyn RetrievalServiceInterface>,
        config: DocServiceConfig,
    ) -> Self {
        Self {
            indexing,
            retrieval,
            config,
        }
    }

    fn doc_reader_config(source: &str, provider: &str, crawl_depth: usize) -> ReaderConfig {
        ReaderConfig::new(provider, source)
            .with_file_extensions(DOC_EXTENSIONS.iter().map(|s| (*s).to_owned()).collect())
            .with_crawl_depth(crawl_depth)
    }

    /// Resolve where a framework's documentation should be loaded from.
    ///
    /// Priority: offline tree (when offline mode is on), explicit URL,
    /// configured auto-index URL, then the shared documentation tree.
    fn resolve_source(&self, framework: &str, url: Option<&str>) -> Result<ReaderConfig> {
        if self.config.offline_mode {
            if let Some(root) = &self.config.offline_docs_path {
                let path = Path::new(root).join(framework);
                return Ok(Self::doc_reader_config(
                    &path.to_string_lossy(),
                    "directory",
                    0,
                ));
            }
        }

        if let Some(url) = url {
            let provider = if self.config.crawl_depth > 0 { "web" } else { "url" };
            return Ok(Self::doc_reader_config(url, provider, self.config.crawl_depth));
        }

        if let Some(entry) = self.config.auto_index.get(framework) {
            if entry.enabled && !entry.url.is_empty() {
                let provider = if self.config.crawl_depth > 0 { "web" } else { "url" };
                return Ok(Self::doc_reader_config(
                    &entry.url,
                    provider,
                    self.config.crawl_depth,
                ));
            }
        }

        if let Some(root) = &self.config.shared_docs_path {
            let path = Path::new(root).join(framework);
            return Ok(Self::doc_reader_config(
                &path.to_string_lossy(),
                "directory",
                0,
            ));
        }

        Err(Error::ConfigMissing(format!(
            "No documentation source configured for framework '{framework}'"
        )))
    }

    /// Index a framework's documentation into `docs_<framework>`.
    pub async fn index_framework(
        &self,
        framework: &str,
        url: Option<&str>,
    ) -> Result<IndexOutcome> {
        let reader_config = self.resolve_source(framework, url)?;
        let reader = resolve_reader(&reader_config)?;
        let docs = reader.load().await?;
        if docs.is_empty() {
            return Err(Error::read(format!(
                "No documentation found for framework '{framework}'"
            )));
        }

        let collection = CollectionId::docs(framework);
        let outcome = self
            .indexing
            .index_documents(&docs, &collection, IndexMode::Vector)
            .await?;
        info!(framework, documents = outcome.indexed, "Framework documentation indexed");
        Ok(outcome)
    }

    /// Index documentation from a single URL into a named collection.
    pub async fn index_url(&self, url: &str, collection: &CollectionId) -> Result<IndexOutcome> {
        let reader = resolve_reader(&Self::doc_reader_config(url, "url", 0))?;
        let docs = reader.load().await?;
        if docs.is_empty() {
            return Err(Error::read(format!("Nothing to index at '{url}'")));
        }
        self.indexing
            .index_documents(&docs, collection, IndexMode::Vector)
            .await
    }

    /// Index a GitHub repository's documentation subtree.
    pub async fn index_github(&self, owner_repo: &str, framework: &str) -> Result<IndexOutcome> {
        let reader = resolve_reader(&Self::doc_reader_config(owner_repo, "github", 0))?;
        let docs = reader.load().await?;
        if docs.is_empty() {
            return Err(Error::read(format!(
                "No documentation found in repository '{owner_repo}'"
            )));
        }
        self.indexing
            .index_documents(&docs, &CollectionId::docs(framework), IndexMode::Vector)
            .await
    }

    /// Search a framework's documentation for an implementation pattern.
    ///
    /// Oversize responses are truncated with a trailing `"..."`.
    pub async fn search_pattern(&self, query: &str, framework: &str) -> Result<String> {
        let collection = CollectionId::docs(framework);
        let response = self.retrieval.search(query, &collection, 5).await?;
        Ok(truncate_chars(&response, PATTERN_RESPONSE_LIMIT))
    }

    /// List indexed frameworks (collections with the docs prefix, stripped).
    pub async fn list_frameworks(&self) -> Result<Vec<String>> {
        let collections = self
            .indexing
            .index_store()
            .list_collections()
            .await?;
        Ok(collections
            .into_iter()
            .filter_map(|name| {
                CollectionId::from(name)
                    .framework()
                    .map(str::to_owned)
            })
            .collect())
    }

    /// Routing and stats for one framework.
    pub async fn framework_info(&self, framework: &str) -> Result<serde_json::Value> {
        let collection = CollectionId::docs(framework);
        let routing = self
            .config
            .routing
            .get(framework)
            .cloned()
            .unwrap_or_else(|| "indexed".to_owned());

        if !self.indexing.index_store().exists(&collection).await? {
            return Ok(json!({
                "framework": framework,
                "indexed": false,
                "routing": routing,
            }));
        }

        let stats = self.indexing.index_store().stats(&collection).await?;
        Ok(json!({
            "framework": framework,
            "indexed": true,
            "points": stats.point_count,
            "mode": stats.mode.to_string(),
            "routing": routing,
        }))
    }
}
