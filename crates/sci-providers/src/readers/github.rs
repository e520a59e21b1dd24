//! GitHub repository documentation reader.
//!
//! Loads files from `{owner}/{repo}` at branch `main`, falling back to
//! `master`, restricted to the `docs/`, `documentation/`, and `doc/`
//! subtrees plus the root README.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::entities::{Document, DocumentMetadata};
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{ReaderConfig, ReaderEntry, READER_PROVIDERS};
use tracing::{debug, warn};

/// Documentation subtrees fetched by default.
const DOC_SUBTREES: &[&str] = &["docs", "documentation", "doc"];

/// Reads documentation files from a GitHub repository.
pub struct GitHubReader {
    owner: String,
    repo: String,
}

impl GitHubReader {
    /// Create a reader from an `{owner}/{repo}` slug.
    ///
    /// # Errors
    ///
    /// Fails when the slug is not of the form `owner/repo`.
    pub fn from_slug(slug: &str) -> Result<Self> {
        let (owner, repo) = slug
            .split_once('/')
            .ok_or_else(|| Error::invalid_argument(format!("Expected owner/repo, got '{slug}'")))?;
        if owner.is_empty() || repo.is_empty() {
            return Err(Error::invalid_argument(format!(
                "Expected owner/repo, got '{slug}'"
            )));
        }
        Ok(Self {
            owner: owner.to_owned(),
            repo: repo.to_owned(),
        })
    }

    /// Collect file documents under one path at one ref, iteratively.
    async fn load_tree(
        &self,
        client: &octocrab::Octocrab,
        branch: &str,
        root: &str,
    ) -> Result<Vec<Document>> {
        let mut documents = Vec::new();
        let mut pending = vec![root.to_owned()];

        while let Some(path) = pending.pop() {
            let listing = client
                .repos(&self.owner, &self.repo)
                .get_content()
                .path(&path)
                .r#ref(branch)
                .send()
                .await
                .map_err(|e| {
                    Error::read_with_source(
                        format!("GitHub content listing failed for '{path}'"),
                        e,
                    )
                })?;

            for item in listing.items {
                match item.r#type.as_str() {
                    "dir" => pending.push(item.path),
                    "file" => {
                        if let Some(doc) = self.load_file(client, branch, &item.path).await {
                            documents.push(doc);
                        }
                    }
                    other => debug!(path = %item.path, kind = other, "Skipping non-file entry"),
                }
            }
        }

        Ok(documents)
    }

    async fn load_file(
        &self,
        client: &octocrab::Octocrab,
        branch: &str,
        path: &str,
    ) -> Option<Document> {
        let contents = client
            .repos(&self.owner, &self.repo)
            .get_content()
            .path(path)
            .r#ref(branch)
            .send()
            .await
            .ok()?;

        let item = contents.items.into_iter().next()?;
        let text = item.decoded_content()?;

        Some(Document::new(
            path.to_owned(),
            text,
            DocumentMetadata {
                file_name: path.rsplit('/').next().unwrap_or_default().to_owned(),
                path: path.to_owned(),
                role: None,
                timestamp: None,
                source: Some(format!("github:{}/{}", self.owner, self.repo)),
            },
        ))
    }

    async fn load_branch(
        &self,
        client: &octocrab::Octocrab,
        branch: &str,
    ) -> Result<Vec<Document>> {
        let mut documents = Vec::new();

        if let Some(readme) = self.load_file(client, branch, "README.md").await {
            documents.push(readme);
        }

        for subtree in DOC_SUBTREES {
            match self.load_tree(client, branch, subtree).await {
                Ok(docs) => documents.extend(docs),
                Err(e) => debug!(subtree, error = %e, "Documentation subtree absent"),
            }
        }

        if documents.is_empty() {
            return Err(Error::read(format!(
                "No documentation found in {}/{} at '{branch}'",
                self.owner, self.repo
            )));
        }
        Ok(documents)
    }
}

#[async_trait]
impl DocumentReader for GitHubReader {
    async fn load(&self) -> Result<Vec<Document>> {
        let client = octocrab::Octocrab::builder()
            .build()
            .map_err(|e| Error::read_with_source("GitHub client construction failed", e))?;

        match self.load_branch(&client, "main").await {
            Ok(docs) => Ok(docs),
            Err(e) => {
                warn!(error = %e, "Branch 'main' yielded nothing, trying 'master'");
                self.load_branch(&client, "master").await
            }
        }
    }

    fn reader_name(&self) -> &str {
        "github"
    }
}

fn github_factory(config: &ReaderConfig) -> std::result::Result<Arc<dyn DocumentReader>, String> {
    GitHubReader::from_slug(&config.source)
        .map(|r| Arc::new(r) as Arc<dyn DocumentReader>)
        .map_err(|e| e.to_string())
}

#[linkme::distributed_slice(READER_PROVIDERS)]
static GITHUB_READER: ReaderEntry = ReaderEntry {
    name: "github",
    description: "GitHub repository documentation subtrees",
    build: github_factory,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_must_have_owner_and_repo() {
        assert!(GitHubReader::from_slug("owner/repo").is_ok());
        assert!(GitHubReader::from_slug("just-a-name").is_err());
        assert!(GitHubReader::from_slug("/repo").is_err());
        assert!(GitHubReader::from_slug("owner/").is_err());
    }
}
