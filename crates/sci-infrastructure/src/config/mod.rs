//! Typed configuration and its loader.

/// Configuration data types
pub mod data;
/// YAML + environment loader and validation
pub mod loader;

pub use data::{
    AppConfig, DocumentationConfig, IndexingConfig, RefreshConfig,
};
pub use loader::ConfigLoader;
