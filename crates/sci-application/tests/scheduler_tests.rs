//! Refresh scheduler tests: cancellation, disabled mode, missing paths.

mod common;

use std::time::Duration;

use common::Harness;
use sci_application::refresh_scheduler::{RefreshScheduler, RefreshSchedulerConfig};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

fn scheduler(harness: &Harness, config: RefreshSchedulerConfig) -> RefreshScheduler {
    RefreshScheduler::new(Arc::clone(&harness.index_store), config)
}

#[tokio::test]
async fn disabled_scheduler_returns_immediately() {
    let harness = Harness::new();
    let handle = scheduler(
        &harness,
        RefreshSchedulerConfig {
            enabled: false,
            schedule: "daily".to_owned(),
            frameworks: vec!["llamaindex".to_owned()],
            docs_root: None,
        },
    )
    .spawn(CancellationToken::new());

    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("join in time")
        .expect("no panic");
}

#[tokio::test]
async fn cancellation_interrupts_the_sleep_promptly() {
    let harness = Harness::new();
    let cancel = CancellationToken::new();
    let handle = scheduler(
        &harness,
        RefreshSchedulerConfig {
            enabled: true,
            schedule: "daily".to_owned(),
            frameworks: vec![],
            docs_root: None,
        },
    )
    .spawn(cancel.clone());

    // The first pass is empty, then the loop sleeps a day; cancellation
    // must end it without waiting out the interval.
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("join in time")
        .expect("no panic");
}

#[tokio::test]
async fn missing_docs_paths_are_skipped_without_crashing() {
    let harness = Harness::new();
    let cancel = CancellationToken::new();
    let handle = scheduler(
        &harness,
        RefreshSchedulerConfig {
            enabled: true,
            schedule: "daily".to_owned(),
            frameworks: vec!["llamaindex".to_owned()],
            docs_root: Some("/definitely/not/a/real/path".into()),
        },
    )
    .spawn(cancel.clone());

    // The pass warns about the missing path and goes to sleep; the service
    // keeps running until cancelled.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!handle.is_finished());
    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(1), handle)
        .await
        .expect("join in time")
        .expect("no panic");
}
