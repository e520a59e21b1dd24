//! Conversation file reader.
//!
//! Wraps the conversation parsers behind the reader port so JSONL streams
//! and console exports can be ingested through the same pipeline as every
//! other source. `.json` sources are treated as exports, everything else as
//! newline-delimited JSON.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use sci_application::conversation::{parse_export, parse_jsonl};
use sci_domain::entities::Document;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{ReaderConfig, ReaderEntry, READER_PROVIDERS};

/// Reads conversation documents from a JSONL or export file.
pub struct ConversationReader {
    path: String,
}

impl ConversationReader {
    /// Create a reader for the given file.
    #[must_use]
    pub fn new(path: String) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DocumentReader for ConversationReader {
    async fn load(&self) -> Result<Vec<Document>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::read_with_source(format!("File not found: {}", self.path), e))?;

        let is_export = Path::new(&self.path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let parsed = if is_export {
            parse_export(&content, &self.path)?
        } else {
            parse_jsonl(&content, &self.path)
        };
        Ok(parsed.documents)
    }

    fn reader_name(&self) -> &str {
        "conversation"
    }
}

fn conversation_factory(
    config: &ReaderConfig,
) -> std::result::Result<Arc<dyn DocumentReader>, String> {
    Ok(Arc::new(ConversationReader::new(config.source.clone())))
}

#[linkme::distributed_slice(READER_PROVIDERS)]
static CONVERSATION_READER: ReaderEntry = ReaderEntry {
    name: "conversation",
    description: "JSONL conversation streams and console exports",
    build: conversation_factory,
};
