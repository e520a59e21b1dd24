//! Provider Auto-Registration Registries
//!
//! Compile-time registration tables built on `linkme` distributed slices.
//! Providers register themselves with a static entry; infrastructure
//! resolves them by name from configuration without knowing any concrete
//! type. Analysis components use the same mechanism keyed by
//! `(domain, name)`.

/// Cache provider registry
pub mod cache;
/// Analysis component registry
pub mod component;
/// Embedding provider registry
pub mod embedding;
/// LLM provider registry
pub mod llm;
/// Document reader registry
pub mod reader;
/// Vector store provider registry
pub mod vector_store;
