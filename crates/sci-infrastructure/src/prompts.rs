//! Prompt library loaded from a YAML text file.
//!
//! Prompts are addressed by `(category, name)`. The library ships with an
//! embedded default set; a `prompts_path` override replaces it wholesale so
//! deployments can tune prompts without code changes.

use std::collections::HashMap;
use std::path::Path;

use sci_domain::error::{Error, Result};
use sci_domain::ports::services::PromptLibrary;

/// The default prompt set compiled into the binary.
const DEFAULT_PROMPTS: &str = include_str!("../../../prompts/prompts.yaml");

/// YAML-backed prompt library.
#[derive(Debug, Clone)]
pub struct PromptLibraryImpl {
    prompts: HashMap<String, HashMap<String, String>>,
}

impl PromptLibraryImpl {
    /// Load the embedded default prompt set.
    ///
    /// # Errors
    ///
    /// Fails only if the embedded file is malformed, which is a build
    /// defect.
    pub fn embedded() -> Result<Self> {
        Self::from_str(DEFAULT_PROMPTS)
    }

    /// Load a prompt file from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config_with_source(format!("Failed to read prompts file {}", path.display()), e)
        })?;
        Self::from_str(&content)
    }

    fn from_str(content: &str) -> Result<Self> {
        let prompts: HashMap<String, HashMap<String, String>> = serde_yaml::from_str(content)
            .map_err(|e| Error::config_with_source("Malformed prompts file", e))?;
        Ok(Self { prompts })
    }

    /// Category and prompt counts, for startup logging.
    #[must_use]
    pub fn len(&self) -> usize {
        self.prompts.values().map(HashMap::len).sum()
    }

    /// Whether the library holds no prompts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PromptLibrary for PromptLibraryImpl {
    fn get(&self, category: &str, name: &str) -> Option<String> {
        self.prompts
            .get(category)
            .and_then(|prompts| prompts.get(name))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_prompts_parse_and_cover_core_categories() {
        let library = PromptLibraryImpl::embedded().expect("embedded prompts");
        for (category, name) in [
            ("search", "synthesize"),
            ("violations", "srp"),
            ("violations", "summary"),
            ("architecture", "di"),
            ("routing", "select"),
            ("subquestion", "decompose"),
            ("subquestion", "synthesize"),
            ("library_suggestions", "default"),
            ("graph", "extract_code"),
            ("graph", "extract_business"),
            ("visualization", "mermaid"),
            ("business", "extract"),
        ] {
            assert!(
                library.get(category, name).is_some(),
                "missing prompt {category}/{name}"
            );
        }
    }

    #[test]
    fn render_substitutes_placeholders() {
        let library = PromptLibraryImpl::embedded().expect("embedded prompts");
        let rendered = library
            .render("routing", "select", &[("query", "q"), ("choices", "1. a")])
            .expect("render");
        assert!(rendered.contains("Question: q"));
        assert!(rendered.contains("1. a"));
        assert!(!rendered.contains("{query}"));
    }

    #[test]
    fn unknown_prompts_return_none() {
        let library = PromptLibraryImpl::embedded().expect("embedded prompts");
        assert!(library.get("nope", "missing").is_none());
    }
}
