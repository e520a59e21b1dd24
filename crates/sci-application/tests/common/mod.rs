//! Shared test harness: the full pipeline over in-memory providers.

// Each integration test binary compiles its own copy of this module and
// uses a different subset of it.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sci_application::cache::{CacheMode, IngestionCache, QueryCache};
use sci_application::graph_extractor::GraphExtractor;
use sci_application::index_store::{IndexStore, ManifestStore};
use sci_application::indexing_service::{IndexingOptions, IndexingService};
use sci_application::retrieval_service::RetrievalService;
use sci_application::splitter::Splitter;
use sci_domain::entities::IndexMode;
use sci_domain::error::Result;
use sci_domain::ports::providers::{LlmKind, LlmProvider};
use sci_domain::ports::services::PromptLibrary;
use sci_providers::{MemoryGraphStore, MemoryVectorStoreProvider, MokaCacheProvider, NullEmbeddingProvider};
use tempfile::TempDir;

/// Scripted completion provider: queued responses first, then an echo of
/// the prompt so retrieval context and queries surface in answers.
#[derive(Default)]
pub struct StaticLlm {
    responses: Mutex<VecDeque<String>>,
    pub calls: Mutex<Vec<String>>,
}

impl StaticLlm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: impl Into<String>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response.into());
    }
}

#[async_trait]
impl LlmProvider for StaticLlm {
    async fn complete(&self, prompt: &str, _kind: LlmKind) -> Result<String> {
        self.calls
            .lock()
            .expect("calls lock")
            .push(prompt.to_owned());
        if let Some(scripted) = self.responses.lock().expect("responses lock").pop_front() {
            return Ok(scripted);
        }
        Ok(format!("Answer based on: {prompt}"))
    }

    fn model_for(&self, _kind: LlmKind) -> &str {
        "static"
    }

    fn provider_name(&self) -> &str {
        "static"
    }
}

/// Minimal prompt set covering what the services under test render.
pub struct TestPrompts;

impl PromptLibrary for TestPrompts {
    fn get(&self, category: &str, name: &str) -> Option<String> {
        let template = match (category, name) {
            ("search", "synthesize") => "Context:\n{context}\n\nQuestion: {query}\n\nAnswer:",
            ("violations", "srp") => "find classes with too many responsibilities",
            ("violations", "dip") => "find constructors that instantiate dependencies directly",
            ("violations", "ocp") => "find type-dispatch chains",
            ("violations", "dry") => "find duplicated logic",
            ("violations", "summary") => "summarize overall code quality",
            ("architecture", "di") => "find direct dependency construction in {language}",
            ("architecture", "resources") => "find duplicated resource creation",
            ("architecture", "size") => "find oversized components",
            ("architecture", "framework") => "find reimplementations of framework features",
            ("architecture", "summary") => "summarize architecture compliance",
            ("routing", "select") => "Question: {query}\n{choices}\nReply with the number only.",
            ("subquestion", "decompose") => {
                "Split into sub-questions. Collections:\n{collections}\nQuestion: {query}"
            }
            ("subquestion", "synthesize") => "Combine for {query}:\n{answers}",
            ("library_suggestions", "default") => "Suggest libraries for: {task}",
            ("library_suggestions", "with_context") => {
                "Suggest libraries for: {task} in a {project_type} project"
            }
            ("graph", "extract_code") => "Extract {max_triplets} code triplets from:\n{text}",
            ("graph", "extract_business") => {
                "Extract {max_triplets} business triplets from:\n{text}"
            }
            ("visualization", "mermaid") => "emit a mermaid sequence diagram",
            ("visualization", "plantuml") => "emit a plantuml class diagram",
            ("visualization", "sequence") => "describe the main workflow sequence",
            ("visualization", "structural") => "describe the module architecture",
            ("business", "extract") => "extract the core business logic",
            _ => return None,
        };
        Some(template.to_owned())
    }
}

/// The full ingestion and retrieval pipeline over in-memory backends.
pub struct Harness {
    pub vector_store: Arc<MemoryVectorStoreProvider>,
    pub llm: Arc<StaticLlm>,
    pub index_store: Arc<IndexStore>,
    pub indexing: Arc<IndexingService>,
    pub retrieval: Arc<RetrievalService>,
    // Owns the manifest directory for the harness lifetime.
    #[allow(dead_code)]
    pub storage: TempDir,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_cache_ttl(3600)
    }

    pub fn with_cache_ttl(ttl_secs: u64) -> Self {
        let storage = TempDir::new().expect("storage dir");
        let vector_store = Arc::new(MemoryVectorStoreProvider::new());
        let embedding = Arc::new(NullEmbeddingProvider::new(64));
        let llm = Arc::new(StaticLlm::new());
        let cache_provider = Arc::new(MokaCacheProvider::default());
        let prompts: Arc<dyn PromptLibrary> = Arc::new(TestPrompts);

        let query_cache = QueryCache::with_mode(
            cache_provider.clone() as Arc<dyn sci_domain::ports::providers::CacheProvider>,
            ttl_secs,
            CacheMode::On,
        );
        let ingestion_cache = IngestionCache::new(
            cache_provider as Arc<dyn sci_domain::ports::providers::CacheProvider>,
            CacheMode::On,
        );

        let extractor = Arc::new(GraphExtractor::new(
            llm.clone() as Arc<dyn LlmProvider>,
            Arc::clone(&prompts),
            2,
        ));
        let index_store = Arc::new(IndexStore::new(
            vector_store.clone() as Arc<dyn sci_domain::ports::providers::VectorStoreProvider>,
            embedding as Arc<dyn sci_domain::ports::providers::EmbeddingProvider>,
            Arc::new(MemoryGraphStore::new()) as Arc<dyn sci_domain::ports::providers::GraphStore>,
            extractor,
            Arc::new(Splitter::new(128, 20)),
            ingestion_cache,
            ManifestStore::new(storage.path()),
        ));

        let indexing = Arc::new(IndexingService::new(
            Arc::clone(&index_store),
            IndexingOptions {
                default_mode: IndexMode::Vector,
                ..IndexingOptions::default()
            },
        ));

        let embedding_for_retrieval = Arc::new(NullEmbeddingProvider::new(64));
        let retrieval = Arc::new(RetrievalService::new(
            Arc::clone(&index_store),
            embedding_for_retrieval,
            llm.clone() as Arc<dyn LlmProvider>,
            query_cache,
            prompts,
        ));

        Self {
            vector_store,
            llm,
            index_store,
            indexing,
            retrieval,
            storage,
        }
    }
}

/// A two-file project directory matching the S1 fixture.
pub fn demo_project_dir() -> TempDir {
    let dir = TempDir::new().expect("project dir");
    std::fs::write(dir.path().join("a.py"), "def foo(): pass").expect("write a.py");
    std::fs::write(dir.path().join("b.md"), "# title").expect("write b.md");
    dir
}
