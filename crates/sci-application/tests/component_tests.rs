//! Component registry tests: table lookup, dependency injection, and the
//! thin-wrapper behavior of registered components.

mod common;

use std::sync::Arc;

use common::{demo_project_dir, Harness, TestPrompts};
use sci_domain::ports::services::{
    AnalysisComponent, ComponentDeps, ComponentOutput, ComponentRequest, PromptLibrary,
    RetrievalServiceInterface,
};
use sci_domain::registry::component::{list_components, resolve_component};
use sci_domain::value_objects::CollectionId;

fn deps(harness: &Harness) -> ComponentDeps {
    ComponentDeps {
        retrieval: harness.retrieval.clone() as Arc<dyn RetrievalServiceInterface>,
        llm: harness.llm.clone(),
        prompts: Arc::new(TestPrompts) as Arc<dyn PromptLibrary>,
    }
}

#[test]
fn the_registry_lists_all_registered_components() {
    let registered = list_components();
    for (domain, name) in [
        ("analysis", "violations"),
        ("analysis", "architecture"),
        ("analysis", "existence"),
        ("analysis", "suggestions"),
        ("business", "extraction"),
        ("visualization", "mermaid"),
        ("visualization", "plantuml"),
        ("visualization", "sequence"),
        ("visualization", "structural"),
    ] {
        assert!(
            registered.iter().any(|(d, n, _)| *d == domain && *n == name),
            "missing component {domain}/{name}"
        );
    }
}

#[tokio::test]
async fn unknown_components_resolve_to_not_found() {
    let harness = Harness::new();
    let result = resolve_component("analysis", "nope", &deps(&harness));
    assert!(matches!(
        result,
        Err(sci_domain::error::Error::NotFound { .. })
    ));
}

#[tokio::test]
async fn suggestions_component_is_llm_only() {
    let harness = Harness::new();
    let component = resolve_component("analysis", "suggestions", &deps(&harness)).expect("resolve");

    harness.llm.push_response("1. serde - serialization");
    let output = component
        .run(&ComponentRequest::for_target("parse YAML configs"))
        .await
        .expect("run");

    match output {
        ComponentOutput::Text(text) => assert!(text.contains("serde")),
        other => panic!("expected text output, got {other:?}"),
    }
    // No retrieval happened: the vector store was never searched.
    assert_eq!(harness.vector_store.search_call_count(), 0);
}

#[tokio::test]
async fn existence_component_wraps_the_retrieval_report() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    harness
        .indexing
        .index_project(&project.path().to_string_lossy(), &collection, None)
        .await
        .expect("index");

    let component = resolve_component("analysis", "existence", &deps(&harness)).expect("resolve");
    let output = component
        .run(&ComponentRequest::for_target("demo").with_query("frobnicated zorg widget factory"))
        .await
        .expect("run");

    match output {
        ComponentOutput::Json(value) => {
            assert_eq!(value["exists"], false);
            assert_eq!(value["project"], "demo");
        }
        other => panic!("expected json output, got {other:?}"),
    }
}

#[tokio::test]
async fn diagram_components_answer_from_retrieval() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    harness
        .indexing
        .index_project(&project.path().to_string_lossy(), &collection, None)
        .await
        .expect("index");

    let component = resolve_component("visualization", "mermaid", &deps(&harness)).expect("resolve");
    harness.llm.push_response("sequenceDiagram\n    A->>B: call()");
    let output = component
        .run(&ComponentRequest::for_target("demo"))
        .await
        .expect("run");

    match output {
        ComponentOutput::Text(diagram) => assert!(diagram.starts_with("sequenceDiagram")),
        other => panic!("expected text output, got {other:?}"),
    }
}
