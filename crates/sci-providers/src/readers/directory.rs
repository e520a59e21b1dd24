//! Directory reader.
//!
//! Recursively walks a root, honoring include paths, required extensions,
//! and exclude patterns. With `filename_as_id` every document id equals the
//! file's path relative to the root, which is what refresh relies on.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use sci_domain::entities::{Document, DocumentMetadata};
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{ReaderConfig, ReaderEntry, READER_PROVIDERS};
use tracing::warn;
use walkdir::WalkDir;

/// Reads documents from a directory tree.
pub struct DirectoryReader {
    root: PathBuf,
    recursive: bool,
    extensions: Vec<String>,
    exclude_names: Vec<String>,
    exclude_globs: GlobSet,
    include_paths: Vec<String>,
    filename_as_id: bool,
}

impl DirectoryReader {
    /// Build a reader from registry configuration.
    ///
    /// # Errors
    ///
    /// Fails when an exclude pattern is not a valid glob.
    pub fn from_config(config: &ReaderConfig) -> Result<Self> {
        let mut names = Vec::new();
        let mut globs = GlobSetBuilder::new();
        for pattern in &config.exclude_patterns {
            if pattern.contains(['*', '?', '[']) {
                let glob = Glob::new(pattern).map_err(|e| {
                    Error::invalid_argument(format!("Invalid exclude pattern '{pattern}': {e}"))
                })?;
                globs.add(glob);
            } else {
                names.push(pattern.clone());
            }
        }
        let exclude_globs = globs
            .build()
            .map_err(|e| Error::invalid_argument(format!("Invalid exclude set: {e}")))?;

        Ok(Self {
            root: PathBuf::from(&config.source),
            recursive: config.recursive,
            extensions: config
                .file_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_ascii_lowercase())
                .collect(),
            exclude_names: names,
            exclude_globs,
            include_paths: config.include_paths.clone(),
            filename_as_id: config.filename_as_id,
        })
    }

    fn is_excluded(&self, path: &Path) -> bool {
        let name_excluded = path.components().any(|component| {
            component
                .as_os_str()
                .to_str()
                .is_some_and(|name| self.exclude_names.iter().any(|ex| ex == name))
        });
        if name_excluded {
            return true;
        }
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| self.exclude_globs.is_match(name))
    }

    fn has_wanted_extension(&self, path: &Path) -> bool {
        if self.extensions.is_empty() {
            return true;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|wanted| wanted == &ext)
            })
    }

    fn walk_roots(&self) -> Vec<PathBuf> {
        if self.include_paths.is_empty() {
            return vec![self.root.clone()];
        }
        self.include_paths
            .iter()
            .map(|sub| self.root.join(sub))
            .collect()
    }

    async fn read_file(&self, path: &Path) -> Option<Document> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable file");
                return None;
            }
        };

        let relative = path
            .strip_prefix(&self.root)
            .map(|p| p.to_string_lossy().replace('\\', "/"))
            .unwrap_or_else(|_| path.to_string_lossy().into_owned());
        let id = if self.filename_as_id {
            relative.clone()
        } else {
            path.to_string_lossy().into_owned()
        };

        Some(Document::new(
            id,
            content,
            DocumentMetadata {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: relative,
                role: None,
                timestamp: None,
                source: Some("directory".to_owned()),
            },
        ))
    }
}

#[async_trait]
impl DocumentReader for DirectoryReader {
    async fn load(&self) -> Result<Vec<Document>> {
        if !self.root.exists() {
            return Err(Error::read(format!(
                "Directory not found: {}",
                self.root.display()
            )));
        }

        let mut documents = Vec::new();
        for walk_root in self.walk_roots() {
            if walk_root.is_file() {
                if let Some(doc) = self.read_file(&walk_root).await {
                    documents.push(doc);
                }
                continue;
            }
            if !walk_root.is_dir() {
                warn!(path = %walk_root.display(), "Include path does not exist");
                continue;
            }

            let max_depth = if self.recursive { usize::MAX } else { 1 };
            let entries: Vec<PathBuf> = WalkDir::new(&walk_root)
                .max_depth(max_depth)
                .into_iter()
                .filter_entry(|e| !self.is_excluded(e.path()))
                .filter_map(|entry| match entry {
                    Ok(e) if e.file_type().is_file() => Some(e.into_path()),
                    Ok(_) => None,
                    Err(e) => {
                        warn!(error = %e, "Skipping unreadable directory entry");
                        None
                    }
                })
                .filter(|path| self.has_wanted_extension(path))
                .collect();

            for path in entries {
                if let Some(doc) = self.read_file(&path).await {
                    documents.push(doc);
                }
            }
        }

        // Stable order keeps repeated loads byte-identical.
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }

    fn reader_name(&self) -> &str {
        "directory"
    }
}

fn directory_factory(
    config: &ReaderConfig,
) -> std::result::Result<Arc<dyn DocumentReader>, String> {
    DirectoryReader::from_config(config)
        .map(|r| Arc::new(r) as Arc<dyn DocumentReader>)
        .map_err(|e| e.to_string())
}

#[linkme::distributed_slice(READER_PROVIDERS)]
static DIRECTORY_READER: ReaderEntry = ReaderEntry {
    name: "directory",
    description: "Recursive directory walker with extension and exclude filters",
    build: directory_factory,
};

#[cfg(test)]
mod tests {
    use super::*;

    async fn load(config: ReaderConfig) -> Vec<Document> {
        DirectoryReader::from_config(&config)
            .expect("reader")
            .load()
            .await
            .expect("load")
    }

    #[tokio::test]
    async fn filename_as_id_uses_root_relative_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("src")).expect("mkdir");
        std::fs::write(dir.path().join("src/main.py"), "def foo(): pass").expect("write");
        std::fs::write(dir.path().join("README.md"), "# title").expect("write");

        let config = ReaderConfig::new("directory", dir.path().to_string_lossy())
            .with_file_extensions(vec![".py".to_owned(), ".md".to_owned()])
            .with_filename_as_id(true);
        let docs = load(config).await;

        let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["README.md", "src/main.py"]);
    }

    #[tokio::test]
    async fn exclude_patterns_prune_directories() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("node_modules/pkg")).expect("mkdir");
        std::fs::write(dir.path().join("node_modules/pkg/index.js"), "x").expect("write");
        std::fs::write(dir.path().join("app.js"), "y").expect("write");

        let config = ReaderConfig::new("directory", dir.path().to_string_lossy())
            .with_file_extensions(vec![".js".to_owned()])
            .with_exclude_patterns(vec!["node_modules".to_owned()])
            .with_filename_as_id(true);
        let docs = load(config).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "app.js");
    }

    #[tokio::test]
    async fn extension_filter_is_case_insensitive() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.MD"), "text").expect("write");
        std::fs::write(dir.path().join("b.bin"), "text").expect("write");

        let config = ReaderConfig::new("directory", dir.path().to_string_lossy())
            .with_file_extensions(vec![".md".to_owned()])
            .with_filename_as_id(true);
        let docs = load(config).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "a.MD");
    }

    #[tokio::test]
    async fn empty_directories_load_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ReaderConfig::new("directory", dir.path().to_string_lossy());
        assert!(load(config).await.is_empty());
    }

    #[tokio::test]
    async fn missing_directories_are_read_errors() {
        let config = ReaderConfig::new("directory", "/definitely/not/here");
        let result = DirectoryReader::from_config(&config)
            .expect("reader")
            .load()
            .await;
        assert!(matches!(result, Err(Error::Read { .. })));
    }

    #[tokio::test]
    async fn include_paths_restrict_the_walk() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir_all(dir.path().join("docs")).expect("mkdir");
        std::fs::create_dir_all(dir.path().join("src")).expect("mkdir");
        std::fs::write(dir.path().join("docs/guide.md"), "g").expect("write");
        std::fs::write(dir.path().join("src/lib.md"), "l").expect("write");

        let config = ReaderConfig::new("directory", dir.path().to_string_lossy())
            .with_file_extensions(vec![".md".to_owned()])
            .with_include_paths(vec!["docs".to_owned()])
            .with_filename_as_id(true);
        let docs = load(config).await;

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "docs/guide.md");
    }
}
