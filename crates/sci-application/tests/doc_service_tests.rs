//! Documentation intelligence tests: offline indexing, pattern search
//! truncation, framework listing.

mod common;

use std::sync::Arc;

use common::Harness;
use sci_application::doc_service::{DocService, DocServiceConfig};
use sci_domain::ports::services::RetrievalServiceInterface;
use tempfile::TempDir;

fn docs_root_with_framework(framework: &str) -> TempDir {
    let root = TempDir::new().expect("docs root");
    let dir = root.path().join(framework);
    std::fs::create_dir_all(&dir).expect("framework dir");
    std::fs::write(
        dir.join("hooks.md"),
        "useEffect runs after render. Prefer cleanup functions for subscriptions.",
    )
    .expect("write doc");
    root
}

fn doc_service(harness: &Harness, root: &TempDir) -> DocService {
    DocService::new(
        Arc::clone(&harness.indexing),
        harness.retrieval.clone() as Arc<dyn RetrievalServiceInterface>,
        DocServiceConfig {
            offline_mode: true,
            offline_docs_path: Some(root.path().to_string_lossy().into_owned()),
            ..DocServiceConfig::default()
        },
    )
}

#[tokio::test]
async fn frameworks_index_into_docs_collections() {
    let harness = Harness::new();
    let root = docs_root_with_framework("react");
    let service = doc_service(&harness, &root);

    let outcome = service.index_framework("react", None).await.expect("index");
    assert_eq!(outcome.collection, "docs_react");
    assert_eq!(outcome.indexed, 1);

    let frameworks = service.list_frameworks().await.expect("list");
    assert_eq!(frameworks, vec!["react".to_owned()]);
}

#[tokio::test]
async fn pattern_responses_are_truncated_with_ellipsis() {
    let harness = Harness::new();
    let root = docs_root_with_framework("react");
    let service = doc_service(&harness, &root);
    service.index_framework("react", None).await.expect("index");

    harness.llm.push_response("x".repeat(3000));
    let response = service
        .search_pattern("useEffect cleanup", "react")
        .await
        .expect("pattern");

    assert_eq!(response.chars().count(), 2003);
    assert!(response.ends_with("..."));
}

#[tokio::test]
async fn framework_info_reports_routing_and_stats() {
    let harness = Harness::new();
    let root = docs_root_with_framework("react");
    let service = doc_service(&harness, &root);
    service.index_framework("react", None).await.expect("index");

    let info = service.framework_info("react").await.expect("info");
    assert_eq!(info["indexed"], true);
    assert_eq!(info["routing"], "indexed");
    assert!(info["points"].as_u64().expect("points") >= 1);

    let missing = service.framework_info("vue").await.expect("info");
    assert_eq!(missing["indexed"], false);
}
