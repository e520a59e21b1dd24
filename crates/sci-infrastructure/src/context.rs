//! Process-wide resource context.
//!
//! A single immutable environment value constructed once at startup and
//! passed explicitly to every operation. It owns exactly one vector store
//! client, one embedder, one LLM provider, one cache client, the prompt
//! library, and one configuration snapshot for the process lifetime; no
//! component instantiates a backend directly.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use sci_application::cache::{CacheMode, IngestionCache, QueryCache};
use sci_application::doc_service::{DocService, DocServiceConfig};
use sci_application::graph_extractor::GraphExtractor;
use sci_application::index_store::{IndexStore, ManifestStore};
use sci_application::indexing_service::{IndexingOptions, IndexingService};
use sci_application::refresh_scheduler::{RefreshScheduler, RefreshSchedulerConfig};
use sci_application::retrieval_service::RetrievalService;
use sci_application::conversation::ConversationService;
use sci_application::splitter::Splitter;
use sci_domain::entities::IndexMode;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::{
    CacheProvider, EmbeddingProvider, GraphStore, LlmKind, LlmProvider, VectorStoreProvider,
};
use sci_domain::ports::services::{AnalysisComponent, ComponentDeps, PromptLibrary};
use sci_domain::registry::cache::{resolve_cache_provider, CacheProviderConfig};
use sci_domain::registry::component::resolve_component;
use sci_domain::registry::embedding::{resolve_embedding_provider, EmbeddingProviderConfig};
use sci_domain::registry::llm::{resolve_llm_provider, LlmProviderConfig};
use sci_domain::registry::vector_store::{
    resolve_vector_store_provider, VectorStoreProviderConfig,
};
use sci_providers::MemoryGraphStore;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::AppConfig;
use crate::prompts::PromptLibraryImpl;

/// Task phrases routed to the complex model.
const COMPLEX_TASK_KEYWORDS: &[&str] = &[
    "analyze",
    "reasoning",
    "planning",
    "workflow",
    "business logic",
    "architecture",
    "design patterns",
    "violations",
    "entity extraction",
    "relationships",
    "graph",
    "property graph",
    "code analysis",
];

/// Task phrases routed to the fast model. Wins over complex on conflict.
const FAST_TASK_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "get",
    "list",
    "health",
    "status",
    "exists",
    "simple",
    "basic",
    "quick",
    "fast",
    "documentation",
    "function signatures",
];

/// The process-wide environment.
pub struct AppContext {
    config: AppConfig,
    vector_store: Arc<dyn VectorStoreProvider>,
    embedding: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    cache_provider: Arc<dyn CacheProvider>,
    cache_mode: CacheMode,
    graph_store: Arc<dyn GraphStore>,
    prompts: Arc<dyn PromptLibrary>,
    index_store: Arc<IndexStore>,
    indexing: Arc<IndexingService>,
    retrieval: Arc<RetrievalService>,
    docs: Arc<DocService>,
    conversations: Arc<ConversationService>,
    components: Mutex<HashMap<(String, String), Arc<dyn AnalysisComponent>>>,
    closed: AtomicBool,
}

impl AppContext {
    /// Resolve providers from the registries and wire every service.
    ///
    /// # Errors
    ///
    /// Fails when a configured provider is unknown or cannot be built.
    pub async fn init(config: AppConfig) -> Result<Arc<Self>> {
        let embedding = resolve_embedding_provider(&embedding_registry_config(&config))?;
        let llm = resolve_llm_provider(&llm_registry_config(&config))?;
        let vector_store = resolve_vector_store_provider(&vector_store_registry_config(&config))?;
        let cache_provider = resolve_cache_provider(&cache_registry_config(&config))?;

        let storage_root = PathBuf::from(&config.storage_path);
        let graph_store: Arc<dyn GraphStore> =
            Arc::new(MemoryGraphStore::with_persist_dir(storage_root.join("graphs")));

        let prompts: Arc<dyn PromptLibrary> = Arc::new(match &config.prompts_path {
            Some(path) => PromptLibraryImpl::from_file(std::path::Path::new(path))?,
            None => PromptLibraryImpl::embedded()?,
        });

        let query_cache = QueryCache::connect(
            Arc::clone(&cache_provider),
            config.cache_ttl_secs,
            config.redis_enabled,
        )
        .await;
        let cache_mode = query_cache.mode();
        let ingestion_cache = IngestionCache::new(Arc::clone(&cache_provider), cache_mode);

        info!(
            cache = cache_provider.provider_name(),
            mode = ?cache_mode,
            vector_store = vector_store.provider_name(),
            embedding = embedding.provider_name(),
            llm = llm.provider_name(),
            "Resource context initialized"
        );

        let splitter = Arc::new(Splitter::new(config.chunk_size, config.chunk_overlap));
        let extractor = Arc::new(GraphExtractor::new(
            Arc::clone(&llm),
            Arc::clone(&prompts),
            config.num_workers,
        ));
        let index_store = Arc::new(IndexStore::new(
            Arc::clone(&vector_store),
            Arc::clone(&embedding),
            Arc::clone(&graph_store),
            extractor,
            splitter,
            ingestion_cache,
            ManifestStore::new(&storage_root),
        ));

        let default_mode: IndexMode = config.index_mode.parse()?;
        let indexing = Arc::new(IndexingService::new(
            Arc::clone(&index_store),
            IndexingOptions {
                default_mode,
                recursive: config.indexing.recursive,
                file_extensions: config.indexing.file_extensions.clone(),
                exclude_patterns: config.indexing.exclude_patterns.clone(),
                include_paths: config.indexing.include_paths.clone(),
            },
        ));

        let retrieval = Arc::new(RetrievalService::new(
            Arc::clone(&index_store),
            Arc::clone(&embedding),
            Arc::clone(&llm),
            query_cache,
            Arc::clone(&prompts),
        ));

        let docs = Arc::new(DocService::new(
            Arc::clone(&indexing),
            retrieval.clone() as Arc<dyn sci_domain::ports::services::RetrievalServiceInterface>,
            DocServiceConfig {
                offline_mode: config.documentation.offline_mode,
                offline_docs_path: config.documentation.offline_docs_path.clone(),
                shared_docs_path: config.documentation.shared_docs_path.clone(),
                auto_index: config.documentation.auto_index.clone(),
                routing: config.documentation.routing.clone(),
                crawl_depth: config.crawl_depth,
            },
        ));

        let conversations = Arc::new(ConversationService::new(
            Arc::clone(&indexing),
            Arc::clone(&embedding),
        ));

        Ok(Arc::new(Self {
            config,
            vector_store,
            embedding,
            llm,
            cache_provider,
            cache_mode,
            graph_store,
            prompts,
            index_store,
            indexing,
            retrieval,
            docs,
            conversations,
            components: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }))
    }

    fn ensure_open(&self, resource: &str) -> Result<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::shutdown(resource));
        }
        Ok(())
    }

    /// The configuration snapshot; immutable after init.
    pub fn config(&self) -> Result<&AppConfig> {
        self.ensure_open("config")?;
        Ok(&self.config)
    }

    /// The shared vector store client.
    pub fn vector_store(&self) -> Result<Arc<dyn VectorStoreProvider>> {
        self.ensure_open("vector_store")?;
        Ok(Arc::clone(&self.vector_store))
    }

    /// The shared embedding provider.
    pub fn embedding(&self) -> Result<Arc<dyn EmbeddingProvider>> {
        self.ensure_open("embedding")?;
        Ok(Arc::clone(&self.embedding))
    }

    /// The shared completion provider.
    pub fn llm(&self) -> Result<Arc<dyn LlmProvider>> {
        self.ensure_open("llm")?;
        Ok(Arc::clone(&self.llm))
    }

    /// The shared cache backend and its degradation mode.
    pub fn cache(&self) -> Result<(Arc<dyn CacheProvider>, CacheMode)> {
        self.ensure_open("cache")?;
        Ok((Arc::clone(&self.cache_provider), self.cache_mode))
    }

    /// The shared graph store.
    pub fn graph_store(&self) -> Result<Arc<dyn GraphStore>> {
        self.ensure_open("graph_store")?;
        Ok(Arc::clone(&self.graph_store))
    }

    /// The prompt library.
    pub fn prompts(&self) -> Result<Arc<dyn PromptLibrary>> {
        self.ensure_open("prompts")?;
        Ok(Arc::clone(&self.prompts))
    }

    /// The index store.
    pub fn index_store(&self) -> Result<Arc<IndexStore>> {
        self.ensure_open("index_store")?;
        Ok(Arc::clone(&self.index_store))
    }

    /// The indexing service.
    pub fn indexing(&self) -> Result<Arc<IndexingService>> {
        self.ensure_open("indexing")?;
        Ok(Arc::clone(&self.indexing))
    }

    /// The retrieval engine.
    pub fn retrieval(&self) -> Result<Arc<RetrievalService>> {
        self.ensure_open("retrieval")?;
        Ok(Arc::clone(&self.retrieval))
    }

    /// The documentation intelligence facade.
    pub fn docs(&self) -> Result<Arc<DocService>> {
        self.ensure_open("docs")?;
        Ok(Arc::clone(&self.docs))
    }

    /// The conversation memory service.
    pub fn conversations(&self) -> Result<Arc<ConversationService>> {
        self.ensure_open("conversations")?;
        Ok(Arc::clone(&self.conversations))
    }

    /// Collection name for a project under the configured prefix.
    pub fn project_collection(&self, project: &str) -> Result<sci_domain::CollectionId> {
        let config = self.config()?;
        Ok(sci_domain::CollectionId::prefixed(
            &config.collection_prefix,
            project,
        ))
    }

    /// Classify a task description onto a model tier.
    ///
    /// Fast keywords win on conflict; unknown tasks default to fast.
    #[must_use]
    pub fn smart_llm(&self, task_description: &str) -> LlmKind {
        let task = task_description.to_lowercase();
        if FAST_TASK_KEYWORDS.iter().any(|k| task.contains(k)) {
            return LlmKind::Fast;
        }
        if COMPLEX_TASK_KEYWORDS.iter().any(|k| task.contains(k)) {
            return LlmKind::Complex;
        }
        LlmKind::Fast
    }

    /// Resolve an analysis component, building it once under the lock.
    pub fn component(&self, domain: &str, name: &str) -> Result<Arc<dyn AnalysisComponent>> {
        self.ensure_open("components")?;
        let key = (domain.to_owned(), name.to_owned());

        let mut cache = match self.components.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(component) = cache.get(&key) {
            return Ok(Arc::clone(component));
        }

        let deps = ComponentDeps {
            retrieval: self.retrieval.clone()
                as Arc<dyn sci_domain::ports::services::RetrievalServiceInterface>,
            llm: Arc::clone(&self.llm),
            prompts: Arc::clone(&self.prompts),
        };
        let component = resolve_component(domain, name, &deps)?;
        cache.insert(key, Arc::clone(&component));
        Ok(component)
    }

    /// Spawn the documentation refresh scheduler.
    pub fn spawn_refresh_scheduler(
        &self,
        cancel: CancellationToken,
    ) -> Result<tokio::task::JoinHandle<()>> {
        self.ensure_open("scheduler")?;
        let documentation = &self.config.documentation;
        let docs_root = if documentation.offline_mode {
            documentation.offline_docs_path.clone()
        } else {
            documentation.shared_docs_path.clone()
        };

        let scheduler = RefreshScheduler::new(
            Arc::clone(&self.index_store),
            RefreshSchedulerConfig {
                enabled: documentation.refresh.enabled,
                schedule: documentation.refresh.schedule.clone(),
                frameworks: documentation.refresh.frameworks.clone(),
                docs_root: docs_root.map(PathBuf::from),
            },
        );
        Ok(scheduler.spawn(cancel))
    }

    /// Health report: vector store reachability plus collection count.
    pub async fn health(&self) -> serde_json::Value {
        if self.closed.load(Ordering::SeqCst) {
            return json!({ "status": "shutdown" });
        }
        match self.vector_store.list_collections().await {
            Ok(collections) => json!({
                "status": "healthy",
                "components": {
                    "vector_store": self.vector_store.provider_name(),
                    "collections_count": collections.len(),
                },
            }),
            Err(e) => json!({
                "status": "unhealthy",
                "error": e.to_string(),
            }),
        }
    }

    /// Tear down the context. Idempotent; accessors fail afterwards.
    pub fn shutdown(&self) {
        if !self.closed.swap(true, Ordering::SeqCst) {
            info!("Resource context closed");
        }
    }
}

fn embedding_registry_config(config: &AppConfig) -> EmbeddingProviderConfig {
    let mut registry_config = EmbeddingProviderConfig::new(&config.embed_provider);
    match config.embed_provider.as_str() {
        "ollama" => {
            registry_config = registry_config
                .with_model(&config.ollama_embed_model)
                .with_base_url(&config.ollama_base_url);
        }
        _ => {
            registry_config = registry_config.with_model(&config.openai_embed_model);
            if let Some(key) = &config.openai_api_key {
                registry_config = registry_config.with_api_key(key);
            }
        }
    }
    registry_config
}

fn llm_registry_config(config: &AppConfig) -> LlmProviderConfig {
    let mut registry_config = LlmProviderConfig::new(&config.llm_provider);
    match config.llm_provider.as_str() {
        "ollama" => {
            registry_config = registry_config
                .with_fast_model(&config.ollama_model)
                .with_base_url(&config.ollama_base_url);
        }
        "electronhub" => {
            registry_config = registry_config
                .with_fast_model(&config.fast_model)
                .with_complex_model(&config.complex_model)
                .with_complex_alt_model(&config.complex_alt_model);
            if let Some(key) = &config.electronhub_api_key {
                registry_config = registry_config.with_api_key(key);
            }
            if let Some(base) = &config.electronhub_base_url {
                registry_config = registry_config.with_base_url(base);
            }
        }
        _ => {
            registry_config = registry_config
                .with_fast_model(&config.fast_model)
                .with_complex_model(&config.complex_model)
                .with_complex_alt_model(&config.complex_alt_model);
            if let Some(key) = &config.openai_api_key {
                registry_config = registry_config.with_api_key(key);
            }
        }
    }
    registry_config
}

fn vector_store_registry_config(config: &AppConfig) -> VectorStoreProviderConfig {
    VectorStoreProviderConfig::new(&config.vector_store_provider).with_url(&config.qdrant_url)
}

fn cache_registry_config(config: &AppConfig) -> CacheProviderConfig {
    let provider = if config.redis_enabled {
        config.cache_provider.clone()
    } else {
        "null".to_owned()
    };
    CacheProviderConfig::new(provider)
        .with_host(&config.redis_host)
        .with_port(config.redis_port)
        .with_ttl_secs(config.cache_ttl_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            llm_provider: "null".to_owned(),
            embed_provider: "null".to_owned(),
            vector_store_provider: "memory".to_owned(),
            cache_provider: "moka".to_owned(),
            storage_path: std::env::temp_dir()
                .join(format!("sci-ctx-{}", std::process::id()))
                .to_string_lossy()
                .into_owned(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn accessors_fail_after_shutdown() {
        let ctx = AppContext::init(test_config()).await.expect("init");
        assert!(ctx.vector_store().is_ok());

        ctx.shutdown();
        ctx.shutdown(); // idempotent

        assert!(matches!(ctx.vector_store(), Err(Error::Shutdown { .. })));
        assert!(matches!(ctx.retrieval(), Err(Error::Shutdown { .. })));
        assert!(matches!(ctx.config(), Err(Error::Shutdown { .. })));
    }

    #[tokio::test]
    async fn smart_llm_classifies_tasks() {
        let ctx = AppContext::init(test_config()).await.expect("init");

        assert_eq!(ctx.smart_llm("analyze the architecture"), LlmKind::Complex);
        assert_eq!(ctx.smart_llm("entity extraction run"), LlmKind::Complex);
        assert_eq!(ctx.smart_llm("search for usages"), LlmKind::Fast);
        // Fast wins on conflict.
        assert_eq!(ctx.smart_llm("search the property graph"), LlmKind::Fast);
        // Unknown tasks default to fast.
        assert_eq!(ctx.smart_llm("frobnicate the widget"), LlmKind::Fast);
    }

    #[tokio::test]
    async fn components_are_cached_after_first_build() {
        let ctx = AppContext::init(test_config()).await.expect("init");
        let first = ctx.component("analysis", "violations").expect("resolve");
        let second = ctx.component("analysis", "violations").expect("resolve");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn unknown_components_are_not_found() {
        let ctx = AppContext::init(test_config()).await.expect("init");
        assert!(matches!(
            ctx.component("analysis", "nonexistent"),
            Err(Error::NotFound { .. })
        ));
    }
}
