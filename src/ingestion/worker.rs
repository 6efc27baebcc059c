//! Periodic ingestion loop
//!
//! Each cycle refreshes the client data cache, runs the collection
//! builders, then clears the cache. A successful cycle waits for the
//! refresh interval; a failed one waits for the retry delay. Once
//! failures reach the configured limit in a row, the loop stops for good
//! without waiting again.

use std::sync::Arc;
use std::time::Duration;

use crate::config::IngestionConfig;
use crate::observability::{Event, Logger};
use crate::shutdown::Shutdown;

use super::builder::{default_builders, run_builders, BuildReport, CollectionBuilder, CollectionSink};
use super::cache::ClientDataCache;
use super::errors::{IngestionError, IngestionResult};
use super::source::DatasheetSource;

/// Timing of the ingestion loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retry_delay: Duration,
    pub max_consecutive_failures: u32,
    pub refresh_interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&IngestionConfig::default())
    }
}

impl From<&IngestionConfig> for RetryPolicy {
    fn from(config: &IngestionConfig) -> Self {
        Self {
            retry_delay: config.retry_delay(),
            max_consecutive_failures: config.max_consecutive_failures,
            refresh_interval: config.refresh_interval(),
        }
    }
}

/// Drives refresh cycles until shutdown or too many failures
pub struct IngestionWorker {
    source: Arc<dyn DatasheetSource>,
    cache: Arc<ClientDataCache>,
    sink: Arc<dyn CollectionSink>,
    builders: Vec<Box<dyn CollectionBuilder>>,
    policy: RetryPolicy,
}

impl IngestionWorker {
    pub fn new(
        source: Arc<dyn DatasheetSource>,
        cache: Arc<ClientDataCache>,
        sink: Arc<dyn CollectionSink>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            source,
            cache,
            sink,
            builders: default_builders(),
            policy,
        }
    }

    /// Replaces the registered builders
    pub fn with_builders(mut self, builders: Vec<Box<dyn CollectionBuilder>>) -> Self {
        self.builders = builders;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Runs one refresh cycle
    pub async fn run_cycle(&self, shutdown: &Shutdown) -> IngestionResult<BuildReport> {
        Logger::info(Event::IngestionCycleBegin, &[]);

        let data = self.cache.repopulate(self.source.as_ref(), shutdown).await?;
        let report = run_builders(&self.builders, &data, self.sink.as_ref(), shutdown).await;
        self.cache.clear();

        report
    }

    /// Runs cycles until shutdown is requested or failures run out.
    ///
    /// Returns `Ok` on shutdown and [`IngestionError::RetriesExhausted`]
    /// when the loop gives up.
    pub async fn run(&self, shutdown: Shutdown) -> IngestionResult<()> {
        let mut failures: u32 = 0;

        loop {
            if shutdown.is_triggered() {
                break;
            }

            let delay = match self.run_cycle(&shutdown).await {
                Ok(report) => {
                    failures = 0;
                    Logger::info(
                        Event::IngestionCycleComplete,
                        &[
                            ("built", &report.built.len().to_string()),
                            ("failed", &report.failed.len().to_string()),
                        ],
                    );
                    self.policy.refresh_interval
                }
                Err(e) if e.is_cancelled() => break,
                Err(e) => {
                    failures += 1;
                    if failures >= self.policy.max_consecutive_failures {
                        Logger::fatal(
                            Event::IngestionRetriesExhausted,
                            &[("error", &e.to_string()), ("failures", &failures.to_string())],
                        );
                        return Err(IngestionError::RetriesExhausted { failures });
                    }
                    Logger::error(
                        Event::IngestionCycleFailed,
                        &[
                            ("error", &e.to_string()),
                            ("failures", &failures.to_string()),
                            ("retry_in_secs", &self.policy.retry_delay.as_secs().to_string()),
                        ],
                    );
                    self.policy.retry_delay
                }
            };

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.triggered() => break,
            }
        }

        Logger::info(Event::IngestionStopped, &[]);
        Ok(())
    }
}
