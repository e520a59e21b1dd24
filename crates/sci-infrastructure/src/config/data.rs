//! Configuration data types.
//!
//! One validated, typed configuration value loaded once per process.
//! Unknown YAML keys are retained in `extra` but otherwise ignored.

use std::collections::HashMap;

use sci_application::doc_service::AutoIndexEntry;
use serde::{Deserialize, Serialize};

/// Directory ingestion options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    /// Recurse into subdirectories
    pub recursive: bool,
    /// Extensions to ingest, dot included
    pub file_extensions: Vec<String>,
    /// Glob patterns or directory names to exclude
    pub exclude_patterns: Vec<String>,
    /// Restrict the walk to these subpaths
    pub include_paths: Vec<String>,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
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

/// Periodic documentation refresh options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Whether the scheduler runs
    pub enabled: bool,
    /// "daily", "weekly", or "monthly"
    pub schedule: String,
    /// Frameworks refreshed each pass
    pub frameworks: Vec<String>,
}

/// Documentation intelligence options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentationConfig {
    /// Serve documentation from local trees only
    pub offline_mode: bool,
    /// Root of offline documentation trees
    pub offline_docs_path: Option<String>,
    /// Root of shared documentation trees
    pub shared_docs_path: Option<String>,
    /// Refresh scheduler options
    pub refresh: RefreshConfig,
    /// Frameworks that may be indexed on demand
    pub auto_index: HashMap<String, AutoIndexEntry>,
    /// Per-framework routing: indexed, context7, or web
    pub routing: HashMap<String, String>,
}

/// The full service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    // LLM selection
    /// Completion backend: ollama, openai, or electronhub
    pub llm_provider: String,
    /// Fast-tier model id
    pub fast_model: String,
    /// Complex-tier model id
    pub complex_model: String,
    /// Alternative complex-tier model id
    pub complex_alt_model: String,
    /// Single model served by ollama deployments
    pub ollama_model: String,
    /// Model used when the provider is plain OpenAI
    pub openai_model: String,

    // Embedding selection
    /// Embedding backend: ollama or openai
    pub embed_provider: String,
    /// OpenAI embedding model id
    pub openai_embed_model: String,
    /// Ollama embedding model id
    pub ollama_embed_model: String,

    // Service endpoints
    /// Ollama daemon URL
    pub ollama_base_url: String,
    /// Vector store URL
    pub qdrant_url: String,
    /// Prefix applied to project collection names
    pub collection_prefix: String,
    /// Cache backend host
    pub redis_host: String,
    /// Cache backend port
    pub redis_port: u16,
    /// Query cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Whether the cache backend is used at all
    pub redis_enabled: bool,

    // Provider selection for pluggable backends
    /// Cache provider name (redis, moka, null)
    pub cache_provider: String,
    /// Vector store provider name (qdrant, memory)
    pub vector_store_provider: String,

    // Indexing behavior
    /// Sentence chunk size in characters
    pub chunk_size: usize,
    /// Sentence chunk overlap in characters
    pub chunk_overlap: usize,
    /// Parallelism for embedding and extraction work
    pub num_workers: usize,
    /// Default mode for new collections: vector, graph, hybrid, or auto
    pub index_mode: String,
    /// Request hybrid (dense + sparse) collections where supported
    pub enable_hybrid: bool,
    /// Breadth-first crawl depth for web sources
    pub crawl_depth: usize,

    // HTTP transport
    /// Bind address for the HTTP transport
    pub api_host: String,
    /// Bind port for the HTTP transport
    pub api_port: u16,

    // Storage
    /// Root for manifests, graphs, and workflow state
    pub storage_path: String,
    /// Optional prompt library override file
    pub prompts_path: Option<String>,

    // Credentials (environment-first)
    /// OpenAI API key
    pub openai_api_key: Option<String>,
    /// ElectronHub API key
    pub electronhub_api_key: Option<String>,
    /// ElectronHub base URL
    pub electronhub_base_url: Option<String>,
    /// Spider crawl API key
    pub spider_api_key: Option<String>,

    /// Directory ingestion options
    pub indexing: IndexingConfig,
    /// Documentation intelligence options
    pub documentation: DocumentationConfig,

    /// Unknown keys, retained but ignored
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            llm_provider: "openai".to_owned(),
            fast_model: "gpt-4o-mini".to_owned(),
            complex_model: "gpt-4o".to_owned(),
            complex_alt_model: "gpt-4o".to_owned(),
            ollama_model: "llama3.1:latest".to_owned(),
            openai_model: "gpt-4o".to_owned(),
            embed_provider: "openai".to_owned(),
            openai_embed_model: "text-embedding-3-small".to_owned(),
            ollama_embed_model: "nomic-embed-text".to_owned(),
            ollama_base_url: "http://localhost:11434".to_owned(),
            qdrant_url: "http://localhost:6333".to_owned(),
            collection_prefix: String::new(),
            redis_host: "localhost".to_owned(),
            redis_port: 6379,
            cache_ttl_secs: 3600,
            redis_enabled: true,
            cache_provider: "redis".to_owned(),
            vector_store_provider: "qdrant".to_owned(),
            chunk_size: 512,
            chunk_overlap: 50,
            num_workers: 4,
            index_mode: "auto".to_owned(),
            enable_hybrid: false,
            crawl_depth: 3,
            api_host: "0.0.0.0".to_owned(),
            api_port: 8000,
            storage_path: "./storage".to_owned(),
            prompts_path: None,
            openai_api_key: None,
            electronhub_api_key: None,
            electronhub_base_url: None,
            spider_api_key: None,
            indexing: IndexingConfig::default(),
            documentation: DocumentationConfig::default(),
            extra: HashMap::new(),
        }
    }
}
