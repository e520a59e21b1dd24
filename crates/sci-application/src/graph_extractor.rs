//! Schema-constrained knowledge-graph extraction.
//!
//! Asks the complex LLM to emit triplets for each node as a JSON array and
//! keeps only those whose entity types and relation are members of the
//! declared schema. Extraction failures never fail the surrounding write.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use sci_domain::entities::{GraphSchema, GraphTriplet, Node};
use sci_domain::error::Result;
use sci_domain::ports::providers::{LlmKind, LlmProvider};
use sci_domain::ports::services::PromptLibrary;
use sci_domain::utils::truncate_chars;
use serde::Deserialize;
use tracing::{debug, warn};

/// Raw triplet shape expected from the LLM.
#[derive(Debug, Deserialize)]
struct RawTriplet {
    subject: String,
    subject_kind: String,
    predicate: String,
    object: String,
    object_kind: String,
}

/// Extracts schema-constrained triplets from nodes via the complex LLM.
pub struct GraphExtractor {
    llm: Arc<dyn LlmProvider>,
    prompts: Arc<dyn PromptLibrary>,
    concurrency: usize,
}

impl GraphExtractor {
    /// Create an extractor running at most `concurrency` LLM calls at once.
    #[must_use]
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        prompts: Arc<dyn PromptLibrary>,
        concurrency: usize,
    ) -> Self {
        Self {
            llm,
            prompts,
            concurrency: concurrency.max(1),
        }
    }

    /// Extract triplets from a batch of nodes.
    ///
    /// Per-node failures are logged and skipped; the returned triplets all
    /// satisfy the schema and carry provenance to their source node.
    pub async fn extract(&self, nodes: &[Node], schema: GraphSchema) -> Result<Vec<GraphTriplet>> {
        let results: Vec<Vec<GraphTriplet>> = stream::iter(nodes.to_vec())
            .map(|node| async move { self.extract_node(&node, schema).await })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        Ok(results.into_iter().flatten().collect())
    }

    async fn extract_node(&self, node: &Node, schema: GraphSchema) -> Vec<GraphTriplet> {
        let prompt_name = match schema {
            GraphSchema::Code => "extract_code",
            GraphSchema::Business => "extract_business",
        };
        let max = schema.max_triplets_per_chunk().to_string();
        let Some(prompt) = self.prompts.render(
            "graph",
            prompt_name,
            &[
                ("text", &truncate_chars(&node.text, 1500)),
                ("max_triplets", &max),
            ],
        ) else {
            warn!(prompt = prompt_name, "Missing graph extraction prompt");
            return Vec::new();
        };

        let response = match self.llm.complete(&prompt, LlmKind::Complex).await {
            Ok(r) => r,
            Err(e) => {
                warn!(node = %node.id, error = %e, "Graph extraction failed, skipping node");
                return Vec::new();
            }
        };

        let raw = parse_triplet_array(&response);
        let mut triplets = Vec::with_capacity(raw.len());
        let mut dropped = 0usize;

        for r in raw.into_iter().take(schema.max_triplets_per_chunk()) {
            let triplet = GraphTriplet {
                subject: r.subject,
                subject_kind: r.subject_kind,
                predicate: r.predicate,
                object: r.object,
                object_kind: r.object_kind,
                source_node_id: node.id.clone(),
            };
            if schema.validates(&triplet) {
                triplets.push(triplet);
            } else {
                dropped += 1;
            }
        }

        if dropped > 0 {
            debug!(node = %node.id, dropped, "Dropped triplets violating the extraction schema");
        }
        triplets
    }
}

/// Parse a JSON array of triplets out of an LLM response, tolerating
/// surrounding prose and code fences.
fn parse_triplet_array(response: &str) -> Vec<RawTriplet> {
    let candidate = match (response.find('['), response.rfind(']')) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => return Vec::new(),
    };
    serde_json::from_str(candidate).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fenced_json_arrays() {
        let response = r#"Here are the triplets:
```json
[{"subject": "AuthService", "subject_kind": "Class", "predicate": "calls",
  "object": "validate", "object_kind": "Function"}]
```"#;
        let raw = parse_triplet_array(response);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].subject, "AuthService");
    }

    #[test]
    fn malformed_responses_yield_nothing() {
        assert!(parse_triplet_array("no json here").is_empty());
        assert!(parse_triplet_array("[{broken").is_empty());
    }
}
