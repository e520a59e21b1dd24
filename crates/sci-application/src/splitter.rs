//! Language-aware code splitting and generic sentence splitting.
//!
//! Two strategies, selected per document by file extension. Code files are
//! chunked by a fixed line window with a hard character cap; everything else
//! is split on sentence boundaries into chunks sized from configuration.

use sci_domain::entities::{Document, Node};
use sci_domain::utils::compute_content_hash;

/// Extensions routed to the code-aware splitter.
pub const CODE_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "tsx", "jsx", "java", "cpp", "c", "cs", "go", "rs", "php", "rb", "scala",
    "kt", "swift", "m", "r", "sql",
];

/// Line window for code chunks.
const CODE_CHUNK_LINES: usize = 40;
/// Overlapping lines between adjacent code chunks.
const CODE_CHUNK_OVERLAP_LINES: usize = 15;
/// Hard cap on code chunk size.
const CODE_MAX_CHARS: usize = 1500;

/// Splits documents into ordered nodes.
#[derive(Debug, Clone)]
pub struct Splitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Splitter {
    /// Create a splitter with the configured sentence chunk size and overlap.
    #[must_use]
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            chunk_overlap,
        }
    }

    /// Split a document into nodes carrying its metadata plus a chunk index.
    ///
    /// Whitespace-only documents produce no nodes.
    #[must_use]
    pub fn split(&self, doc: &Document) -> Vec<Node> {
        if doc.text.trim().is_empty() {
            return Vec::new();
        }

        let chunks = match doc.extension() {
            Some(ext) if CODE_EXTENSIONS.contains(&ext.as_str()) => split_code(&doc.text),
            _ => self.split_sentences(&doc.text),
        };

        let doc_content_hash = compute_content_hash(&doc.text);
        chunks
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| Node {
                id: Node::make_id(&doc.id, chunk_index),
                doc_id: doc.id.clone(),
                text,
                chunk_index,
                metadata: doc.metadata.clone(),
                doc_content_hash: doc_content_hash.clone(),
            })
            .collect()
    }

    /// Sentence-based splitting for non-code files.
    ///
    /// Sentences accumulate until the chunk reaches `chunk_size` characters;
    /// each following chunk starts with the last `chunk_overlap` characters
    /// of its predecessor.
    fn split_sentences(&self, text: &str) -> Vec<String> {
        let sentences = sentence_boundaries(text);
        let mut chunks: Vec<String> = Vec::new();
        let mut current = String::new();

        for sentence in sentences {
            if !current.is_empty() && current.chars().count() + sentence.chars().count() > self.chunk_size
            {
                chunks.push(current.trim().to_owned());
                let overlap: String = tail_chars(&current, self.chunk_overlap);
                current = overlap;
            }
            if !current.is_empty() && !current.ends_with(char::is_whitespace) {
                current.push(' ');
            }
            current.push_str(sentence.trim());
        }

        if !current.trim().is_empty() {
            chunks.push(current.trim().to_owned());
        }
        chunks
    }
}

/// Fixed line-window splitting for code files.
fn split_code(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text.lines().collect();
    if lines.is_empty() {
        return Vec::new();
    }

    let stride = CODE_CHUNK_LINES - CODE_CHUNK_OVERLAP_LINES;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < lines.len() {
        let end = (start + CODE_CHUNK_LINES).min(lines.len());
        let mut chunk = lines[start..end].join("\n");
        if chunk.chars().count() > CODE_MAX_CHARS {
            chunk = chunk.chars().take(CODE_MAX_CHARS).collect();
        }
        if !chunk.trim().is_empty() {
            chunks.push(chunk);
        }
        if end == lines.len() {
            break;
        }
        start += stride;
    }

    chunks
}

/// Split text into sentence-ish segments on `.`, `!`, `?`, and blank lines.
fn sentence_boundaries(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();

    let mut i = 0;
    while i < bytes.len() {
        let is_terminal = matches!(bytes[i], b'.' | b'!' | b'?');
        let is_blank_line = bytes[i] == b'\n' && i + 1 < bytes.len() && bytes[i + 1] == b'\n';

        if is_terminal || is_blank_line {
            let end = i + 1;
            let segment = &text[start..end];
            if !segment.trim().is_empty() {
                segments.push(segment);
            }
            start = end;
        }
        i += 1;
    }

    if start < text.len() && !text[start..].trim().is_empty() {
        segments.push(&text[start..]);
    }
    segments
}

fn tail_chars(text: &str, count: usize) -> String {
    let total = text.chars().count();
    text.chars().skip(total.saturating_sub(count)).collect()
}

#[cfg(test)]
mod tests {
    use sci_domain::entities::DocumentMetadata;

    use super::*;

    fn doc(file_name: &str, text: &str) -> Document {
        Document::new(
            file_name,
            text,
            DocumentMetadata {
                file_name: file_name.to_owned(),
                path: file_name.to_owned(),
                ..Default::default()
            },
        )
    }

    #[test]
    fn code_files_use_line_windows() {
        let body: String = (0..100).map(|i| format!("fn f{i}() {{}}\n")).collect();
        let nodes = Splitter::new(512, 50).split(&doc("lib.rs", &body));

        // 100 lines at 40-line windows with stride 25: starts at 0, 25, 50, 75
        assert_eq!(nodes.len(), 4);
        assert!(nodes[0].text.lines().count() <= 40);
        assert_eq!(nodes[0].id, "lib.rs#0");
        assert_eq!(nodes[3].chunk_index, 3);
    }

    #[test]
    fn code_chunks_respect_the_char_cap() {
        let long_line = "x".repeat(4000);
        let nodes = Splitter::new(512, 50).split(&doc("big.py", &long_line));
        assert!(nodes.iter().all(|n| n.text.chars().count() <= 1500));
    }

    #[test]
    fn prose_files_use_sentence_chunks() {
        let text = "First sentence. Second sentence. Third sentence.";
        let nodes = Splitter::new(30, 5).split(&doc("notes.md", text));
        assert!(nodes.len() >= 2);
        assert!(nodes[0].text.starts_with("First"));
    }

    #[test]
    fn empty_documents_produce_no_nodes() {
        assert!(Splitter::new(512, 50).split(&doc("empty.md", "   \n")).is_empty());
    }

    #[test]
    fn nodes_inherit_document_metadata_and_hash() {
        let d = doc("a.md", "One sentence only.");
        let nodes = Splitter::new(512, 50).split(&d);
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].metadata.file_name, "a.md");
        assert_eq!(nodes[0].doc_content_hash, compute_content_hash(&d.text));
    }
}
