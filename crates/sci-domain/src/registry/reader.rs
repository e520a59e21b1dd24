//! Document Reader Registry
//!
//! Readers are pluggable adapters producing a sequence of documents; the
//! registry resolves one by name ("directory", "url", "github", "web",
//! "conversation") from a shared config value.

use std::collections::HashMap;

/// Configuration for reader creation.
///
/// `source` is the path, URL, or `{owner}/{repo}` slug depending on the
/// reader; the remaining fields only apply to readers that understand them.
#[derive(Debug, Clone, Default)]
pub struct ReaderConfig {
    /// Reader name (e.g., "directory", "url", "github", "web", "conversation")
    pub provider: String,
    /// Path, URL, or repository slug to load from
    pub source: String,
    /// Recurse into subdirectories (directory reader)
    pub recursive: bool,
    /// Restrict to these extensions, dot included (directory reader)
    pub file_extensions: Vec<String>,
    /// Glob patterns to exclude (directory reader)
    pub exclude_patterns: Vec<String>,
    /// Restrict to these subpaths of the root (directory reader)
    pub include_paths: Vec<String>,
    /// Use root-relative paths as document ids (directory reader)
    pub filename_as_id: bool,
    /// Breadth-first crawl depth (web reader)
    pub crawl_depth: usize,
    /// Additional reader-specific configuration
    pub extra: HashMap<String, String>,
}

impl ReaderConfig {
    /// Create a config for the given reader and source.
    pub fn new(provider: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            source: source.into(),
            recursive: true,
            ..Default::default()
        }
    }

    /// Use root-relative paths as document ids.
    #[must_use]
    pub fn with_filename_as_id(mut self, enabled: bool) -> Self {
        self.filename_as_id = enabled;
        self
    }

    /// Restrict to these extensions.
    #[must_use]
    pub fn with_file_extensions(mut self, extensions: Vec<String>) -> Self {
        self.file_extensions = extensions;
        self
    }

    /// Exclude paths matching these glob patterns.
    #[must_use]
    pub fn with_exclude_patterns(mut self, patterns: Vec<String>) -> Self {
        self.exclude_patterns = patterns;
        self
    }

    /// Restrict the walk to these subpaths.
    #[must_use]
    pub fn with_include_paths(mut self, paths: Vec<String>) -> Self {
        self.include_paths = paths;
        self
    }

    /// Set the crawl depth.
    #[must_use]
    pub fn with_crawl_depth(mut self, depth: usize) -> Self {
        self.crawl_depth = depth;
        self
    }
}

crate::impl_registry!(
    provider_trait: crate::ports::providers::DocumentReader,
    config_type: ReaderConfig,
    entry_type: ReaderEntry,
    slice_name: READER_PROVIDERS,
    resolve_fn: resolve_reader,
    list_fn: list_readers
);
