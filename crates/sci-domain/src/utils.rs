//! Common utilities

use sha2::{Digest, Sha256};

/// Compute the content hash used for refresh delta detection.
///
/// sha256 over the raw text, hex encoded. Stored alongside every point so
/// that refresh can compare freshly loaded documents against indexed state
/// without re-embedding.
#[must_use]
pub fn compute_content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Deterministic point id for a node, stable across writes.
///
/// Vector stores require UUID point ids; deriving a v5 UUID from the node id
/// makes repeated writes of the same node upsert in place.
#[must_use]
pub fn point_id_for_node(node_id: &str) -> String {
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_OID, node_id.as_bytes()).to_string()
}

/// Truncate text to `max` characters, appending `"..."` when shortened.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_owned();
    }
    let truncated: String = text.chars().take(max).collect();
    format!("{truncated}...")
}

/// The first `max` characters of a text, with no ellipsis.
///
/// For excerpts with a hard length bound (citation previews, existence
/// context); [`truncate_chars`] is for display text where the cut should be
/// visible.
#[must_use]
pub fn prefix_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(compute_content_hash("abc"), compute_content_hash("abc"));
        assert_ne!(compute_content_hash("abc"), compute_content_hash("abd"));
    }

    #[test]
    fn point_ids_are_stable_and_distinct() {
        assert_eq!(
            point_id_for_node("src/main.rs#0"),
            point_id_for_node("src/main.rs#0")
        );
        assert_ne!(
            point_id_for_node("src/main.rs#0"),
            point_id_for_node("src/main.rs#1")
        );
    }

    #[test]
    fn truncation_appends_ellipsis() {
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello...");
    }

    #[test]
    fn prefix_respects_the_hard_bound() {
        assert_eq!(prefix_chars("hello", 10), "hello");
        assert_eq!(prefix_chars("hello world", 5), "hello");
        assert!(prefix_chars("hello world", 5).chars().count() <= 5);
    }
}
