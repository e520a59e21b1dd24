//! Retrieval engine tests: search, caching, citations, existence, scans,
//! routing, and sub-question answering.

mod common;

use common::{demo_project_dir, Harness};
use sci_domain::entities::IndexMode;
use sci_domain::ports::services::RetrievalServiceInterface;
use sci_domain::value_objects::CollectionId;

async fn indexed_demo(harness: &Harness) -> CollectionId {
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    harness
        .indexing
        .index_project(&project.path().to_string_lossy(), &collection, None)
        .await
        .expect("index");
    collection
}

#[tokio::test]
async fn search_returns_synthesis_mentioning_the_query() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    let answer = harness
        .retrieval
        .search("foo", &collection, 1)
        .await
        .expect("search");
    assert!(answer.contains("foo"));
}

#[tokio::test]
async fn search_on_absent_collection_returns_the_sentinel_string() {
    let harness = Harness::new();
    let answer = harness
        .retrieval
        .search("anything", &CollectionId::from_name("ghost"), 5)
        .await
        .expect("search");
    assert_eq!(answer, "Error: Project 'ghost' not indexed");
}

#[tokio::test]
async fn repeated_searches_hit_the_cache_and_skip_the_store() {
    let harness = Harness::with_cache_ttl(60);
    let collection = indexed_demo(&harness).await;

    let first = harness
        .retrieval
        .search("x", &collection, 3)
        .await
        .expect("first search");
    let searches_after_first = harness.vector_store.search_call_count();

    let second = harness
        .retrieval
        .search("x", &collection, 3)
        .await
        .expect("second search");

    // Byte-identical result, and the vector store was not consulted again.
    assert_eq!(first, second);
    assert_eq!(harness.vector_store.search_call_count(), searches_after_first);
}

#[tokio::test]
async fn limit_zero_synthesizes_without_touching_the_index() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;
    let searches_before = harness.vector_store.search_call_count();

    let answer = harness
        .retrieval
        .search("anything at all", &collection, 0)
        .await
        .expect("search");

    assert!(!answer.is_empty());
    assert_eq!(harness.vector_store.search_call_count(), searches_before);
}

#[tokio::test]
async fn citations_are_ranked_from_one_and_bounded_by_limit() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    let cited = harness
        .retrieval
        .search_with_citations("foo", &collection, 2)
        .await
        .expect("citations");

    assert!(cited.citations.len() <= 2);
    assert!(!cited.citations.is_empty());
    for (i, citation) in cited.citations.iter().enumerate() {
        assert_eq!(citation.rank, i + 1);
        assert!(citation.preview.chars().count() <= 200);
    }
}

#[tokio::test]
async fn existence_confidence_is_clamped_and_consistent() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    let report = harness
        .retrieval
        .exists("NonExistentClass handling frobnicated zorg payloads", &collection)
        .await
        .expect("exists");

    assert!((0.0..=1.0).contains(&report.confidence));
    assert_eq!(report.exists, report.confidence >= 0.7);

    // The hash embedder shares no tokens between this phrase and the
    // fixture, so the match is weak and the component reads as absent.
    assert!(!report.exists);
    assert!(report.confidence < 0.7);
}

#[tokio::test]
async fn existence_on_absent_collection_reports_not_indexed() {
    let harness = Harness::new();
    let report = harness
        .retrieval
        .exists("Widget", &CollectionId::from_name("ghost"))
        .await
        .expect("exists");

    assert!(!report.exists);
    assert_eq!(report.confidence, 0.0);
    assert!(report.context.contains("not indexed"));
}

#[tokio::test]
async fn violation_scans_cap_findings_and_flag_absent_projects() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    let findings = harness
        .retrieval
        .find_violations(&collection)
        .await
        .expect("violations");
    assert!(!findings.is_empty());
    assert!(findings.len() <= 6);

    let absent = harness
        .retrieval
        .find_violations(&CollectionId::from_name("ghost"))
        .await
        .expect("violations");
    assert_eq!(absent, vec!["Error: Project 'ghost' not indexed".to_owned()]);
}

#[tokio::test]
async fn null_responses_produce_the_clean_verdict() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    // All four checks plus the summary come back as null results.
    for _ in 0..5 {
        harness.llm.push_response("Empty Response");
    }
    let findings = harness
        .retrieval
        .find_violations(&collection)
        .await
        .expect("violations");

    assert_eq!(findings.len(), 1);
    assert!(findings[0].starts_with('\u{2705}'));
}

#[tokio::test]
async fn architecture_scan_accepts_a_language_hint() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    let findings = harness
        .retrieval
        .check_architecture(&collection, Some("python"))
        .await
        .expect("architecture");
    assert!(!findings.is_empty());
    assert!(findings.len() <= 6);
}

#[tokio::test]
async fn smart_query_with_no_collections_reports_nothing_indexed() {
    let harness = Harness::new();
    let answer = harness
        .retrieval
        .smart_query("anything", None)
        .await
        .expect("smart query");
    assert_eq!(answer, "No indexed projects available");
}

#[tokio::test]
async fn smart_query_with_one_collection_always_picks_it() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    // No scripted selector response: with one candidate the selector is
    // bypassed entirely and the answer comes from that collection.
    let answer = harness
        .retrieval
        .smart_query("foo", Some(vec![collection]))
        .await
        .expect("smart query");
    assert!(answer.contains("foo"));
}

#[tokio::test]
async fn smart_query_selector_routes_between_collections() {
    let harness = Harness::new();
    let code = indexed_demo(&harness).await;

    let docs = CollectionId::docs("react");
    harness
        .index_store
        .create(&docs, IndexMode::Vector)
        .await
        .expect("create docs");
    let nodes = harness.index_store.splitter().split(&sci_domain::entities::Document::new(
        "hooks.md",
        "useEffect runs after render. Use it for side effects in React components.",
        sci_domain::entities::DocumentMetadata {
            file_name: "hooks.md".to_owned(),
            path: "hooks.md".to_owned(),
            ..Default::default()
        },
    ));
    harness.index_store.write(&docs, &nodes).await.expect("write docs");

    // Selector picks option 2 (docs_react sorts after demo's candidates
    // list order: [demo, docs_react]).
    harness.llm.push_response("2");
    let answer = harness
        .retrieval
        .smart_query("Show me how to useEffect", Some(vec![code, docs]))
        .await
        .expect("smart query");

    assert!(answer.contains("useEffect"));
}

#[tokio::test]
async fn scalable_route_shortlists_then_selects() {
    let harness = Harness::new();
    indexed_demo(&harness).await;

    let docs = CollectionId::docs("react");
    harness
        .index_store
        .create(&docs, IndexMode::Vector)
        .await
        .expect("create docs");
    let nodes = harness.index_store.splitter().split(&sci_domain::entities::Document::new(
        "hooks.md",
        "useEffect runs after render.",
        sci_domain::entities::DocumentMetadata {
            file_name: "hooks.md".to_owned(),
            path: "hooks.md".to_owned(),
            ..Default::default()
        },
    ));
    harness.index_store.write(&docs, &nodes).await.expect("write docs");

    // The selector answers with a collection name rather than a number.
    harness.llm.push_response("docs_react");
    let answer = harness
        .retrieval
        .scalable_route("Show me how to useEffect")
        .await
        .expect("scalable route");

    assert!(answer.contains("useEffect"));
}

#[tokio::test]
async fn answer_complex_embeds_sub_answers() {
    let harness = Harness::new();
    let collection = indexed_demo(&harness).await;

    // Scripted decomposition, then echo answers and synthesis.
    harness.llm.push_response(
        r#"[{"sub_question": "What does foo do?", "collection": "demo"},
            {"sub_question": "Where is the title defined?", "collection": "demo"}]"#,
    );
    let answer = harness
        .retrieval
        .answer_complex("Explain foo and the title", &[collection])
        .await
        .expect("complex");

    // The synthesis prompt echo carries both sub-answers.
    assert!(answer.contains("What does foo do?"));
    assert!(answer.contains("Where is the title defined?"));
}

#[tokio::test]
async fn check_violation_caches_verdicts() {
    let harness = Harness::new();

    harness.llm.push_response("null");
    let (violation, cached) = harness
        .retrieval
        .check_violation("add a helper", "utils module")
        .await
        .expect("check");
    assert!(violation.is_none());
    assert!(!cached);

    let (violation, cached) = harness
        .retrieval
        .check_violation("add a helper", "utils module")
        .await
        .expect("check again");
    assert!(violation.is_none());
    assert!(cached);
}
