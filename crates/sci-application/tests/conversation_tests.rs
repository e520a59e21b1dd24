//! Conversation memory tests: JSONL ingestion and raw-turn search.

mod common;

use std::sync::Arc;

use common::Harness;
use sci_application::conversation::ConversationService;
use sci_domain::value_objects::CollectionId;
use sci_providers::NullEmbeddingProvider;

fn conversation_service(harness: &Harness) -> ConversationService {
    ConversationService::new(
        Arc::clone(&harness.indexing),
        Arc::new(NullEmbeddingProvider::new(64)),
    )
}

#[tokio::test]
async fn jsonl_messages_index_one_point_each() {
    let harness = Harness::new();
    let service = conversation_service(&harness);
    let collection = CollectionId::from_name("conv");

    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(
        file.path(),
        "{\"role\":\"user\",\"content\":\"hello\"}\n{\"role\":\"assistant\",\"content\":\"hi\"}\n",
    )
    .expect("write jsonl");

    let outcome = service
        .index_conversations(&file.path().to_string_lossy(), &collection)
        .await
        .expect("index");
    assert!(outcome.indexed);
    assert_eq!(outcome.messages, 2);

    let stats = harness.index_store.stats(&collection).await.expect("stats");
    assert_eq!(stats.point_count, 2);
}

#[tokio::test]
async fn searching_conversations_returns_role_prefixed_turns() {
    let harness = Harness::new();
    let service = conversation_service(&harness);
    let collection = CollectionId::from_name("conv");

    let file = tempfile::NamedTempFile::new().expect("temp file");
    std::fs::write(
        file.path(),
        "{\"role\":\"user\",\"content\":\"hello\"}\n{\"role\":\"assistant\",\"content\":\"hi\"}\n",
    )
    .expect("write jsonl");
    service
        .index_conversations(&file.path().to_string_lossy(), &collection)
        .await
        .expect("index");

    let results = service
        .search_conversations("hello", &collection, 1)
        .await
        .expect("search");
    assert_eq!(results.len(), 1);
    assert!(results[0].content.starts_with("[user]:"));
}

#[tokio::test]
async fn missing_conversation_files_are_read_errors() {
    let harness = Harness::new();
    let service = conversation_service(&harness);

    let result = service
        .index_conversations("/no/such/file.jsonl", &CollectionId::from_name("conv"))
        .await;
    assert!(matches!(
        result,
        Err(sci_domain::error::Error::Read { .. })
    ));
}
