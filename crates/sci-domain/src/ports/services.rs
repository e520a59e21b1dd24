//! Service port interfaces.
//!
//! Implemented by the application layer; consumed by analysis components and
//! transports so that neither depends on concrete service types.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::ports::providers::LlmProvider;
use crate::value_objects::{CitedAnswer, CollectionId, ExistenceReport};

/// Retrieval operations available to analysis components.
#[async_trait]
pub trait RetrievalServiceInterface: Send + Sync {
    /// Cache-first semantic search returning a synthesized answer.
    async fn search(&self, query: &str, collection: &CollectionId, limit: usize)
        -> Result<String>;

    /// Semantic search returning the answer plus ranked source citations.
    async fn search_with_citations(
        &self,
        query: &str,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<CitedAnswer>;

    /// Component existence check against an indexed collection.
    async fn exists(&self, component: &str, collection: &CollectionId) -> Result<ExistenceReport>;

    /// SOLID violation scan over an indexed collection.
    async fn find_violations(&self, collection: &CollectionId) -> Result<Vec<String>>;

    /// Architecture-pattern compliance scan over an indexed collection.
    async fn check_architecture(
        &self,
        collection: &CollectionId,
        language: Option<&str>,
    ) -> Result<Vec<String>>;

    /// Whether a collection is indexed.
    async fn collection_exists(&self, collection: &CollectionId) -> Result<bool>;
}

/// Named prompt templates loaded from a text file.
///
/// Templates are addressed by `(category, name)` and interpolated with
/// `{placeholder}` variables.
pub trait PromptLibrary: Send + Sync {
    /// Fetch a raw template.
    fn get(&self, category: &str, name: &str) -> Option<String>;

    /// Fetch a template and substitute `{key}` placeholders.
    fn render(&self, category: &str, name: &str, vars: &[(&str, &str)]) -> Option<String> {
        self.get(category, name).map(|mut template| {
            for (key, value) in vars {
                template = template.replace(&format!("{{{key}}}"), value);
            }
            template
        })
    }
}

/// Dependencies injected into analysis components at construction.
#[derive(Clone)]
pub struct ComponentDeps {
    /// Retrieval operations
    pub retrieval: Arc<dyn RetrievalServiceInterface>,
    /// Completion models
    pub llm: Arc<dyn LlmProvider>,
    /// Prompt templates
    pub prompts: Arc<dyn PromptLibrary>,
}

/// Input to an analysis component run.
#[derive(Debug, Clone, Default)]
pub struct ComponentRequest {
    /// Target collection name (or task description for LLM-only components)
    pub target: String,
    /// Free-form query, when the component takes one
    pub query: Option<String>,
    /// Language hint, interpolated into prompts only
    pub language: Option<String>,
}

impl ComponentRequest {
    /// Request against a collection target.
    pub fn for_target(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    /// Attach a query.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Attach a language hint.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

/// Output of an analysis component run.
#[derive(Debug, Clone)]
pub enum ComponentOutput {
    /// Free-form text (diagrams, suggestions)
    Text(String),
    /// A list of findings
    Items(Vec<String>),
    /// Structured output
    Json(serde_json::Value),
}

impl ComponentOutput {
    /// The text form, when this output is text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Items(_) | Self::Json(_) => None,
        }
    }

    /// The item list, when this output is a list.
    #[must_use]
    pub fn into_items(self) -> Vec<String> {
        match self {
            Self::Items(items) => items,
            Self::Text(s) => vec![s],
            Self::Json(v) => vec![v.to_string()],
        }
    }
}

/// A stateless analysis unit sharing the registry's resources.
#[async_trait]
pub trait AnalysisComponent: Send + Sync {
    /// Component name within its domain.
    fn component_name(&self) -> &str;

    /// Run the component against a request.
    async fn run(&self, request: &ComponentRequest) -> Result<ComponentOutput>;
}
