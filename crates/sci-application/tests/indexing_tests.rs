//! Indexing pipeline tests: ingest, idempotent writes, refresh, delete.

mod common;

use common::{demo_project_dir, Harness};
use sci_domain::entities::IndexMode;
use sci_domain::error::Error;
use sci_domain::value_objects::CollectionId;
use tempfile::TempDir;

#[tokio::test]
async fn indexing_a_two_file_project_creates_points() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");

    let outcome = harness
        .indexing
        .index_project(&project.path().to_string_lossy(), &collection, None)
        .await
        .expect("index");

    assert_eq!(outcome.indexed, 2);
    assert_eq!(outcome.mode, IndexMode::Vector);
    assert_eq!(outcome.collection, "demo");

    let stats = harness.index_store.stats(&collection).await.expect("stats");
    assert!(stats.point_count >= 2);
    assert_eq!(stats.mode, IndexMode::Vector);
}

#[tokio::test]
async fn empty_directories_create_no_collection() {
    let harness = Harness::new();
    let empty = TempDir::new().expect("empty dir");
    let collection = CollectionId::from_name("empty");

    let result = harness
        .indexing
        .index_project(&empty.path().to_string_lossy(), &collection, None)
        .await;

    assert!(matches!(result, Err(Error::Read { .. })));
    assert!(!harness.index_store.exists(&collection).await.expect("exists"));
}

#[tokio::test]
async fn rewriting_identical_nodes_keeps_point_count() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    let path = project.path().to_string_lossy().into_owned();

    harness
        .indexing
        .index_project(&path, &collection, None)
        .await
        .expect("first index");
    let before = harness
        .index_store
        .stats(&collection)
        .await
        .expect("stats")
        .point_count;

    harness
        .indexing
        .index_project(&path, &collection, None)
        .await
        .expect("second index");
    let after = harness
        .index_store
        .stats(&collection)
        .await
        .expect("stats")
        .point_count;

    assert_eq!(before, after);
}

#[tokio::test]
async fn refresh_counts_partition_the_input() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    let path = project.path().to_string_lossy().into_owned();

    harness
        .indexing
        .index_project(&path, &collection, None)
        .await
        .expect("index");

    // Nothing changed: everything is unchanged.
    let outcome = harness
        .indexing
        .refresh_project(&path, &collection)
        .await
        .expect("refresh");
    assert_eq!(outcome.total, 2);
    assert_eq!(outcome.refreshed + outcome.unchanged, outcome.total);
    assert_eq!(outcome.unchanged, 2);

    // One file changed, one added: both count as refreshed.
    std::fs::write(project.path().join("a.py"), "def foo(): return 1").expect("rewrite");
    std::fs::write(project.path().join("c.md"), "# new").expect("add");
    let outcome = harness
        .indexing
        .refresh_project(&path, &collection)
        .await
        .expect("refresh");
    assert_eq!(outcome.total, 3);
    assert_eq!(outcome.refreshed, 2);
    assert_eq!(outcome.unchanged, 1);
    assert_eq!(outcome.refreshed + outcome.unchanged, outcome.total);
}

#[tokio::test]
async fn refresh_never_deletes_missing_documents() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    let path = project.path().to_string_lossy().into_owned();

    harness
        .indexing
        .index_project(&path, &collection, None)
        .await
        .expect("index");
    let before = harness
        .index_store
        .stats(&collection)
        .await
        .expect("stats")
        .point_count;

    // Remove a file from disk; its stored nodes must survive the refresh.
    std::fs::remove_file(project.path().join("b.md")).expect("remove");
    let outcome = harness
        .indexing
        .refresh_project(&path, &collection)
        .await
        .expect("refresh");
    assert_eq!(outcome.total, 1);

    let after = harness
        .index_store
        .stats(&collection)
        .await
        .expect("stats")
        .point_count;
    assert_eq!(before, after);
}

#[tokio::test]
async fn refreshing_an_unindexed_collection_fails() {
    let harness = Harness::new();
    let project = demo_project_dir();

    let result = harness
        .indexing
        .refresh_project(
            &project.path().to_string_lossy(),
            &CollectionId::from_name("missing"),
        )
        .await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn delete_then_reindex_reproduces_the_point_count() {
    let harness = Harness::new();
    let project = demo_project_dir();
    let collection = CollectionId::from_name("demo");
    let path = project.path().to_string_lossy().into_owned();

    harness
        .indexing
        .index_project(&path, &collection, None)
        .await
        .expect("index");
    let original = harness
        .index_store
        .stats(&collection)
        .await
        .expect("stats")
        .point_count;

    harness.index_store.delete(&collection).await.expect("delete");
    assert!(matches!(
        harness.index_store.stats(&collection).await,
        Err(Error::NotFound { .. })
    ));
    // Idempotent: deleting again is fine.
    harness.index_store.delete(&collection).await.expect("redelete");

    harness
        .indexing
        .index_project(&path, &collection, None)
        .await
        .expect("reindex");
    let reproduced = harness
        .index_store
        .stats(&collection)
        .await
        .expect("stats")
        .point_count;
    assert_eq!(original, reproduced);
}

#[tokio::test]
async fn mode_conflicts_are_rejected() {
    let harness = Harness::new();
    let collection = CollectionId::from_name("demo");

    harness
        .index_store
        .create(&collection, IndexMode::Vector)
        .await
        .expect("create");

    let result = harness.index_store.create(&collection, IndexMode::Graph).await;
    assert!(matches!(result, Err(Error::Conflict { .. })));
}

#[tokio::test]
async fn auto_mode_resolves_and_persists() {
    let harness = Harness::new();
    let collection = CollectionId::from_name("demo");

    // New collection: auto resolves to graph and the manifest records it.
    let manifest = harness
        .index_store
        .create(&collection, IndexMode::Auto)
        .await
        .expect("create");
    assert_eq!(manifest.mode, IndexMode::Graph);

    // Subsequent auto opens are deterministic.
    let again = harness
        .index_store
        .create(&collection, IndexMode::Auto)
        .await
        .expect("recreate");
    assert_eq!(again.mode, IndexMode::Graph);

    let opened = harness.index_store.open(&collection).await.expect("open");
    assert_eq!(opened.mode, IndexMode::Graph);
}
