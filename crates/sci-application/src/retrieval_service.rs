//! Semantic query, existence, routing, and sub-question answering.
//!
//! # Overview
//! The `RetrievalService` executes every query-side operation: cache-first
//! semantic search with LLM synthesis, citation answers, component existence
//! checks, violation and architecture scans, smart multi-index routing, and
//! sub-question decomposition. It holds no mutable state besides the cache.

use std::sync::Arc;

use async_trait::async_trait;
use sci_domain::error::{Error, Result};
use sci_domain::ports::providers::{EmbeddingProvider, LlmKind, LlmProvider, VectorStoreProvider};
use sci_domain::ports::services::{PromptLibrary, RetrievalServiceInterface};
use sci_domain::utils::{prefix_chars, truncate_chars};
use sci_domain::value_objects::{
    Citation, CitedAnswer, CollectionId, ExistenceReport, SearchResult,
};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::QueryCache;
use crate::index_store::IndexStore;

/// Similarity threshold above which a component is considered to exist.
const EXISTENCE_THRESHOLD: f32 = 0.7;
/// Context excerpt length for existence checks.
const EXISTENCE_CONTEXT_CHARS: usize = 500;
/// Preview length for citations.
const CITATION_PREVIEW_CHARS: usize = 200;
/// Finding excerpt length for violation and architecture scans.
const FINDING_CONTEXT_CHARS: usize = 200;
/// Maximum findings returned by a scan.
const MAX_FINDINGS: usize = 6;
/// How many tool descriptors the scalable router retrieves before selecting.
const ROUTER_RETRIEVE_LIMIT: usize = 5;

/// Above this many candidate collections, routing switches from the
/// single-prompt selector to descriptor retrieval.
const SCALABLE_ROUTING_THRESHOLD: usize = 50;

/// Phrases marking a synthesized response as a null result.
///
/// "empty response" is a legacy synthesizer sentinel that must keep being
/// recognized for cross-compatibility.
const NULL_RESULT_PHRASES: &[&str] = &[
    "empty response",
    "no information",
    "does not contain",
    "not contain any",
    "provided context does not",
];

/// One sub-question produced by query decomposition.
#[derive(Debug, Deserialize)]
struct SubQuestion {
    sub_question: String,
    #[serde(default)]
    collection: Option<String>,
}

/// The retrieval and orchestration engine.
pub struct RetrievalService {
    index_store: Arc<IndexStore>,
    embedding: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LlmProvider>,
    cache: QueryCache,
    prompts: Arc<dyn PromptLibrary>,
}

impl RetrievalService {
    /// Create a retrieval service with injected dependencies.
    #[must_use]
    pub fn new(
        index_store: Arc<IndexStore>,
        embedding: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        cache: QueryCache,
        prompts: Arc<dyn PromptLibrary>,
    ) -> Self {
        Self {
            index_store,
            embedding,
            llm,
            cache,
            prompts,
        }
    }

    /// Message returned for queries against an absent collection.
    fn not_indexed_message(collection: &CollectionId) -> String {
        format!("Error: Project '{collection}' not indexed")
    }

    /// Retrieve the top-k nodes for a query, ordered by descending score
    /// with ties broken by node id.
    async fn retrieve(
        &self,
        query: &str,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding.embed(query).await?;
        let mut results = self
            .index_store
            .vector_store()
            .search_points(collection, &query_embedding.vector, limit)
            .await?;

        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });
        results.truncate(limit);
        Ok(results)
    }

    /// Synthesize a compact answer from retrieved context via the fast LLM.
    async fn synthesize(&self, query: &str, results: &[SearchResult]) -> Result<String> {
        let context = results
            .iter()
            .map(|r| format!("[{}]\n{}", r.file_path, r.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let prompt = self
            .prompts
            .render(
                "search",
                "synthesize",
                &[("context", context.as_str()), ("query", query)],
            )
            .ok_or_else(|| Error::config("Missing prompt search/synthesize"))?;

        self.llm.complete(&prompt, LlmKind::Fast).await
    }

    /// Whether a synthesized response carries an actual finding.
    fn is_null_result(text: &str) -> bool {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return true;
        }
        let lower = trimmed.to_lowercase();
        NULL_RESULT_PHRASES.iter().any(|p| lower.contains(p))
    }

    /// Run a named scan: a list of prompt-driven queries whose non-null
    /// results become findings, with a summary query as fallback.
    async fn run_scan(
        &self,
        collection: &CollectionId,
        category: &str,
        checks: &[(&str, &str)],
        language: Option<&str>,
        clean_verdict: &str,
    ) -> Result<Vec<String>> {
        if !self.collection_exists(collection).await? {
            return Ok(vec![Self::not_indexed_message(collection)]);
        }

        let language = language.unwrap_or("any language");
        let mut findings = Vec::new();

        for (label, prompt_name) in checks {
            let Some(query) = self
                .prompts
                .render(category, prompt_name, &[("language", language)])
            else {
                warn!(category, prompt = prompt_name, "Missing scan prompt");
                continue;
            };

            match self.search_uncached(&query, collection, 3).await {
                Ok(response) if !Self::is_null_result(&response) => {
                    findings.push(format!(
                        "{label}: {}",
                        truncate_chars(response.trim(), FINDING_CONTEXT_CHARS)
                    ));
                }
                Ok(_) => {}
                Err(e) => findings.push(format!("Error in {label} analysis: {e}")),
            }
        }

        if findings.len() < 2 {
            if let Some(summary_query) = self
                .prompts
                .render(category, "summary", &[("language", language)])
            {
                match self.search_uncached(&summary_query, collection, 1).await {
                    Ok(summary) if !Self::is_null_result(&summary) => {
                        findings.push(format!(
                            "Overall analysis: {}",
                            truncate_chars(summary.trim(), FINDING_CONTEXT_CHARS)
                        ));
                    }
                    _ => findings.push(clean_verdict.to_owned()),
                }
            }
        }

        findings.truncate(MAX_FINDINGS);
        Ok(findings)
    }

    /// Search without consulting the cache; used by scans whose queries are
    /// internal rather than user-supplied.
    async fn search_uncached(
        &self,
        query: &str,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<String> {
        let results = self.retrieve(query, collection, limit).await?;
        self.synthesize(query, &results).await
    }

    /// Build a routing descriptor for a collection, flavored by its naming
    /// convention.
    fn tool_description(collection: &CollectionId) -> String {
        if let Some(framework) = collection.framework() {
            format!(
                "Documentation for the {framework} library. Use for API references, examples, and how-to guides."
            )
        } else if collection.is_conversation() {
            format!(
                "Conversation history and decisions from {collection}. Use for past context and decisions."
            )
        } else {
            format!(
                "Source code for the {collection} project. Use for code analysis, implementations, and technical details."
            )
        }
    }

    /// Ask the complex LLM to pick exactly one collection.
    async fn select_collection(
        &self,
        query: &str,
        candidates: &[CollectionId],
    ) -> Result<CollectionId> {
        debug_assert!(!candidates.is_empty());
        if candidates.len() == 1 {
            return Ok(candidates[0].clone());
        }

        let choices = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}. {} - {}", i + 1, c, Self::tool_description(c)))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = self
            .prompts
            .render(
                "routing",
                "select",
                &[("query", query), ("choices", choices.as_str())],
            )
            .ok_or_else(|| Error::config("Missing prompt routing/select"))?;

        let response = self.llm.complete(&prompt, LlmKind::Complex).await?;

        if let Some(index) = first_number(&response) {
            if index >= 1 && index <= candidates.len() {
                return Ok(candidates[index - 1].clone());
            }
        }
        // Selector replied with prose; accept a collection mentioned by name.
        for candidate in candidates {
            if response.contains(candidate.as_str()) {
                return Ok(candidate.clone());
            }
        }
        warn!(response = %truncate_chars(&response, 80), "Selector response unparseable, using first candidate");
        Ok(candidates[0].clone())
    }

    /// Candidates for routing: supplied collections that exist, or every
    /// indexed collection when none are supplied.
    async fn routing_candidates(
        &self,
        collections: Option<Vec<CollectionId>>,
    ) -> Result<Vec<CollectionId>> {
        match collections {
            Some(requested) => {
                let mut existing = Vec::with_capacity(requested.len());
                for collection in requested {
                    if self.collection_exists(&collection).await? {
                        existing.push(collection);
                    }
                }
                Ok(existing)
            }
            None => Ok(self
                .index_store
                .list_collections()
                .await?
                .into_iter()
                .map(CollectionId::from)
                .collect()),
        }
    }

    /// Check whether a proposed action would violate coding guidelines.
    ///
    /// Cache-first so repeated hook invocations answer from the cache;
    /// returns `(violation, cached)` where `violation` is `None` for a
    /// clean verdict.
    pub async fn check_violation(
        &self,
        action: &str,
        context: &str,
    ) -> Result<(Option<String>, bool)> {
        let question = format!(
            "Would the action \"{action}\" violate dependency-injection, component-size, or \
             duplication guidelines in this context: {context}? Reply with the violated \
             guideline, or null."
        );
        let cache_collection = CollectionId::from_name("violation_checks");

        if let Some(hit) = self.cache.get(&question, 1, &cache_collection).await {
            let violation = (hit != "null").then_some(hit);
            return Ok((violation, true));
        }

        let verdict = self.llm.complete(&question, LlmKind::Fast).await?;
        let verdict = verdict.trim().to_owned();
        self.cache.put(&question, 1, &cache_collection, &verdict).await;

        let violation = (!verdict.eq_ignore_ascii_case("null")).then_some(verdict);
        Ok((violation, false))
    }

    /// Route a query to exactly one collection and search there.
    ///
    /// Returns `"No indexed projects available"` when nothing is indexed.
    pub async fn smart_query(
        &self,
        query: &str,
        collections: Option<Vec<CollectionId>>,
    ) -> Result<String> {
        let candidates = self.routing_candidates(collections).await?;
        if candidates.is_empty() {
            return Ok("No indexed projects available".to_owned());
        }

        // A single selector prompt stops scaling past a few dozen tools;
        // beyond that, shortlist by descriptor similarity first.
        if candidates.len() > SCALABLE_ROUTING_THRESHOLD {
            return self.route_over_shortlist(query, &candidates).await;
        }

        let selected = self.select_collection(query, &candidates).await?;
        debug!(collection = %selected, "Smart query routed");
        self.search(query, &selected, 5).await
    }

    /// Retrieval-based routing for deployments with many collections.
    ///
    /// Embeds the tool descriptors, retrieves the closest few by cosine
    /// similarity, then runs the single-choice selector over that subset.
    pub async fn scalable_route(&self, query: &str) -> Result<String> {
        let candidates = self.routing_candidates(None).await?;
        if candidates.is_empty() {
            return Ok("No indexed projects available".to_owned());
        }
        self.route_over_shortlist(query, &candidates).await
    }

    async fn route_over_shortlist(
        &self,
        query: &str,
        candidates: &[CollectionId],
    ) -> Result<String> {
        let descriptors: Vec<String> = candidates
            .iter()
            .map(|c| format!("{c}: {}", Self::tool_description(c)))
            .collect();
        let descriptor_embeddings = self.embedding.embed_batch(&descriptors).await?;
        let query_embedding = self.embedding.embed(query).await?;

        let mut scored: Vec<(f32, &CollectionId)> = candidates
            .iter()
            .zip(&descriptor_embeddings)
            .map(|(c, e)| (cosine_similarity(&query_embedding.vector, &e.vector), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let shortlist: Vec<CollectionId> = scored
            .into_iter()
            .take(ROUTER_RETRIEVE_LIMIT)
            .map(|(_, c)| c.clone())
            .collect();

        let selected = self.select_collection(query, &shortlist).await?;
        self.search(query, &selected, 5).await
    }

    /// Decompose a complex question, answer each part, and synthesize.
    ///
    /// Failures of individual sub-questions are embedded in that
    /// sub-answer rather than aborting the whole query.
    pub async fn answer_complex(
        &self,
        query: &str,
        collections: &[CollectionId],
    ) -> Result<String> {
        let existing = self
            .routing_candidates(Some(collections.to_vec()))
            .await?;
        if existing.is_empty() {
            return Ok("No indexed projects available".to_owned());
        }

        let names = existing
            .iter()
            .map(|c| format!("- {c}: {}", Self::tool_description(c)))
            .collect::<Vec<_>>()
            .join("\n");
        let decompose_prompt = self
            .prompts
            .render(
                "subquestion",
                "decompose",
                &[("query", query), ("collections", names.as_str())],
            )
            .ok_or_else(|| Error::config("Missing prompt subquestion/decompose"))?;

        let response = self.llm.complete(&decompose_prompt, LlmKind::Complex).await?;
        let mut sub_questions = parse_sub_questions(&response);
        if sub_questions.is_empty() {
            // Decomposition failed: treat the whole query as one question.
            sub_questions = vec![SubQuestion {
                sub_question: query.to_owned(),
                collection: None,
            }];
        }

        let mut qa_pairs = Vec::with_capacity(sub_questions.len());
        for sub in &sub_questions {
            let target = sub
                .collection
                .as_deref()
                .map(CollectionId::from)
                .filter(|c| existing.contains(c))
                .unwrap_or_else(|| existing[0].clone());

            let answer = match self.search(&sub.sub_question, &target, 5).await {
                Ok(answer) => answer,
                Err(e) => format!("Error answering '{}': {e}", sub.sub_question),
            };
            qa_pairs.push(format!("Q: {}\nA: {answer}", sub.sub_question));
        }

        let synthesis_prompt = self
            .prompts
            .render(
                "subquestion",
                "synthesize",
                &[("query", query), ("answers", qa_pairs.join("\n\n").as_str())],
            )
            .ok_or_else(|| Error::config("Missing prompt subquestion/synthesize"))?;

        self.llm.complete(&synthesis_prompt, LlmKind::Complex).await
    }
}

#[async_trait]
impl RetrievalServiceInterface for RetrievalService {
    async fn search(
        &self,
        query: &str,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<String> {
        // limit 0 skips retrieval entirely: synthesize over empty context.
        if limit == 0 {
            return self.synthesize(query, &[]).await;
        }

        if !self.collection_exists(collection).await? {
            return Ok(Self::not_indexed_message(collection));
        }

        if let Some(hit) = self.cache.get(query, limit, collection).await {
            return Ok(hit);
        }

        let results = self.retrieve(query, collection, limit).await?;
        let answer = self.synthesize(query, &results).await?;
        self.cache.put(query, limit, collection, &answer).await;
        Ok(answer)
    }

    async fn search_with_citations(
        &self,
        query: &str,
        collection: &CollectionId,
        limit: usize,
    ) -> Result<CitedAnswer> {
        if !self.collection_exists(collection).await? {
            return Ok(CitedAnswer {
                answer: Self::not_indexed_message(collection),
                citations: Vec::new(),
            });
        }

        let results = self.retrieve(query, collection, limit).await?;
        let answer = self.synthesize(query, &results).await?;

        let citations = results
            .iter()
            .enumerate()
            .map(|(i, r)| Citation {
                rank: i + 1,
                file: r.file_path.clone(),
                score: r.score,
                preview: prefix_chars(&r.content, CITATION_PREVIEW_CHARS),
            })
            .collect();

        Ok(CitedAnswer { answer, citations })
    }

    async fn exists(&self, component: &str, collection: &CollectionId) -> Result<ExistenceReport> {
        if !self.collection_exists(collection).await? {
            return Ok(ExistenceReport {
                exists: false,
                confidence: 0.0,
                context: format!("Project '{collection}' not indexed"),
                file: None,
            });
        }

        let results = self.retrieve(component, collection, 1).await?;
        let Some(best) = results.first() else {
            return Ok(ExistenceReport {
                exists: false,
                confidence: 0.0,
                context: format!("No {component} found in {collection}"),
                file: None,
            });
        };

        let confidence = best.score.clamp(0.0, 1.0);
        Ok(ExistenceReport {
            exists: confidence >= EXISTENCE_THRESHOLD,
            confidence,
            context: prefix_chars(&best.content, EXISTENCE_CONTEXT_CHARS),
            file: Some(best.file_path.clone()),
        })
    }

    async fn find_violations(&self, collection: &CollectionId) -> Result<Vec<String>> {
        self.run_scan(
            collection,
            "violations",
            &[
                ("SRP", "srp"),
                ("DIP", "dip"),
                ("OCP", "ocp"),
                ("DRY", "dry"),
            ],
            None,
            "\u{2705} No major violations detected",
        )
        .await
    }

    async fn check_architecture(
        &self,
        collection: &CollectionId,
        language: Option<&str>,
    ) -> Result<Vec<String>> {
        self.run_scan(
            collection,
            "architecture",
            &[
                ("Dependency injection violations", "di"),
                ("Resource duplication", "resources"),
                ("Oversized components", "size"),
                ("Framework pattern violations", "framework"),
            ],
            language,
            "\u{2705} Architecture follows dependency-injection and component-size guidelines",
        )
        .await
    }

    async fn collection_exists(&self, collection: &CollectionId) -> Result<bool> {
        self.index_store.exists(collection).await
    }
}

/// First positive integer appearing in a selector response.
fn first_number(text: &str) -> Option<usize> {
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Parse a JSON array of sub-questions, tolerating surrounding prose.
fn parse_sub_questions(response: &str) -> Vec<SubQuestion> {
    let candidate = match (response.find('['), response.rfind(']')) {
        (Some(start), Some(end)) if end > start => &response[start..=end],
        _ => return Vec::new(),
    };
    serde_json::from_str(candidate).unwrap_or_default()
}

/// Cosine similarity between two vectors; 0 for mismatched or empty input.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_results_are_recognized() {
        assert!(RetrievalService::is_null_result(""));
        assert!(RetrievalService::is_null_result("Empty Response"));
        assert!(RetrievalService::is_null_result(
            "The provided context does not contain any switch statements."
        ));
        assert!(!RetrievalService::is_null_result(
            "UserService has 14 methods spanning auth and billing."
        ));
    }

    #[test]
    fn selector_numbers_are_parsed() {
        assert_eq!(first_number("2"), Some(2));
        assert_eq!(first_number("Option 3 fits best."), Some(3));
        assert_eq!(first_number("none of these"), None);
    }

    #[test]
    fn sub_question_arrays_are_parsed_leniently() {
        let response = r#"Sure:
[{"sub_question": "How is auth done?", "collection": "demo"},
 {"sub_question": "Where are tokens stored?"}]"#;
        let subs = parse_sub_questions(response);
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].collection.as_deref(), Some("demo"));
        assert!(subs[1].collection.is_none());
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
    }
}
