//! Periodic documentation refresh.
//!
//! A single background task that re-ingests registered documentation
//! frameworks on a daily, weekly, or monthly cadence. Errors put the loop to
//! sleep for an hour before retrying; a shutdown signal interrupts any sleep
//! and terminates the loop promptly.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use sci_domain::ports::providers::DocumentReader;
use sci_domain::registry::reader::{resolve_reader, ReaderConfig};
use sci_domain::value_objects::CollectionId;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::index_store::IndexStore;

/// Sleep applied after a refresh pass fails.
const ERROR_BACKOFF: Duration = Duration::from_secs(3600);

/// Scheduler configuration, from the documentation refresh section.
#[derive(Debug, Clone)]
pub struct RefreshSchedulerConfig {
    /// Whether the scheduler runs at all
    pub enabled: bool,
    /// Cadence: "daily", "weekly", or "monthly"
    pub schedule: String,
    /// Frameworks to refresh each pass
    pub frameworks: Vec<String>,
    /// Root of the documentation trees (`<root>/<framework>`)
    pub docs_root: Option<PathBuf>,
}

impl RefreshSchedulerConfig {
    /// Seconds between refresh passes for the configured cadence.
    #[must_use]
    pub fn interval(&self) -> Duration {
        let secs = match self.schedule.as_str() {
            "daily" => 86_400,
            "monthly" => 2_592_000,
            // weekly is both the named cadence and the fallback
            _ => 604_800,
        };
        Duration::from_secs(secs)
    }
}

/// Background task re-ingesting registered documentation sources.
pub struct RefreshScheduler {
    index_store: Arc<IndexStore>,
    config: RefreshSchedulerConfig,
}

impl RefreshScheduler {
    /// Create a scheduler with injected dependencies.
    #[must_use]
    pub fn new(index_store: Arc<IndexStore>, config: RefreshSchedulerConfig) -> Self {
        Self {
            index_store,
            config,
        }
    }

    /// Spawn the scheduler loop. Returns immediately when disabled.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        let this = Arc::new(self);
        tokio::spawn(async move { this.run_loop(cancel).await })
    }

    /// Run the scheduler loop until cancelled.
    fn run_loop(&self, cancel: CancellationToken) -> impl std::future::Future<Output = ()> + Send + '_ {
        Box::pin(async move {
            if !self.config.enabled {
                info!("Documentation refresh scheduler disabled");
                return;
            }

            info!(
                schedule = %self.config.schedule,
                frameworks = ?self.config.frameworks,
                "Documentation refresh scheduler started"
            );

            loop {
                let sleep_for = match self.refresh_pass().await {
                    Ok(()) => self.config.interval(),
                    Err(e) => {
                        error!(error = %e, "Refresh pass failed, backing off");
                        ERROR_BACKOFF
                    }
                };

                tokio::select! {
                    () = cancel.clone().cancelled_owned() => {
                        info!("Documentation refresh scheduler stopped");
                        return;
                    }
                    () = tokio::time::sleep(sleep_for) => {}
                }
            }
        })
    }

    /// Refresh every configured framework once.
    fn refresh_pass(
        &self,
    ) -> impl std::future::Future<Output = sci_domain::error::Result<()>> + Send + '_ {
        Box::pin(async move {
            let frameworks = self.config.frameworks.clone();
            let mut iter = frameworks.into_iter();
            loop {
                let Some(framework) = iter.next() else {
                    break;
                };
                let result = self.refresh_framework(&framework).await;
                result?;
            }
            Ok(())
        })
    }

    /// Refresh a single framework, skipping it (with a warning) when not
    /// eligible for a refresh.
    async fn refresh_framework(&self, framework: &str) -> sci_domain::error::Result<()> {
        let Some(root) = self.config.docs_root.clone() else {
            warn!(framework, "No docs root configured, skipping refresh");
            return Ok(());
        };
        let docs_path = root.join(framework);
        if !docs_path.exists() {
            warn!(framework, path = %docs_path.display(), "Docs path not found");
            return Ok(());
        }

        let collection = CollectionId::docs(framework);
        if !self.index_store.exists(&collection).await? {
            warn!(framework, "Collection not indexed yet, skipping refresh");
            return Ok(());
        }

        let reader_config =
            ReaderConfig::new("directory", docs_path.to_string_lossy()).with_filename_as_id(true);
        let reader = resolve_reader(&reader_config)?;
        let docs = reader.load().await?;
        let outcome = self.index_store.refresh(&collection, &docs).await?;

        info!(
            framework,
            refreshed = outcome.refreshed,
            unchanged = outcome.unchanged,
            total = outcome.total,
            "Framework documentation refreshed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(schedule: &str) -> RefreshSchedulerConfig {
        RefreshSchedulerConfig {
            enabled: true,
            schedule: schedule.to_owned(),
            frameworks: vec![],
            docs_root: None,
        }
    }

    #[test]
    fn schedule_intervals_match_their_cadence() {
        assert_eq!(config("daily").interval(), Duration::from_secs(86_400));
        assert_eq!(config("weekly").interval(), Duration::from_secs(604_800));
        assert_eq!(config("monthly").interval(), Duration::from_secs(2_592_000));
        assert_eq!(config("hourly").interval(), Duration::from_secs(604_800));
    }
}
