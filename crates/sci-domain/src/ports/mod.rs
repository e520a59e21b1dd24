//! External provider and service port interfaces

/// Provider ports implemented by the providers crate
pub mod providers;
/// Service interfaces implemented by the application crate
pub mod services;

pub use providers::{
    CacheProvider, DocumentReader, EmbeddingProvider, GraphStore, LlmKind, LlmProvider,
    TripletFilter, VectorStoreProvider,
};
pub use services::{
    AnalysisComponent, ComponentDeps, ComponentOutput, ComponentRequest, PromptLibrary,
    RetrievalServiceInterface,
};
