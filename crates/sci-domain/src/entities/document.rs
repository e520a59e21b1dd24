//! Source documents produced by reader adapters.
//!
//! A [`Document`] is never mutated after creation; its `id` must be stable
//! across refreshes so that incremental re-indexing can match stored state
//! against freshly loaded sources. Directory readers use the root-relative
//! path as the id when `filename_as_id` is requested.

use serde::{Deserialize, Serialize};

/// Provenance metadata attached to every document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// Base file name (or synthetic name for non-file sources)
    pub file_name: String,
    /// Path or URL the document was loaded from
    pub path: String,
    /// Conversation role, when the document is a chat turn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Source timestamp, when the origin format carries one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Originating reader or export identifier
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// An immutable unit of ingested content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Stable identifier; equals the relative path for directory readers
    pub id: String,
    /// Full text content
    pub text: String,
    /// Provenance metadata
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Create a document with the given id, text, and metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            metadata,
        }
    }

    /// File extension of the source file, lowercased, without the dot.
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.metadata.file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_lowercased() {
        let doc = Document::new(
            "src/Main.RS",
            "fn main() {}",
            DocumentMetadata {
                file_name: "Main.RS".to_owned(),
                path: "src/Main.RS".to_owned(),
                ..Default::default()
            },
        );
        assert_eq!(doc.extension().as_deref(), Some("rs"));
    }

    #[test]
    fn extension_absent_for_bare_names() {
        let doc = Document::new("README", "hello", DocumentMetadata::default());
        assert_eq!(doc.extension(), None);
    }
}
