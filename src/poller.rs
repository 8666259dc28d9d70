//! Background poll loop: the single writer of the [`MetricStore`].
//!
//! Each tick moves Idle -> Polling -> Idle:
//! - Fetch lag for the configured group (bounded by the fetcher timeout)
//! - On success, overwrite the total and upsert every reported partition
//! - On failure, log and leave the store untouched
//!
//! There is no retry or backoff; the next attempt is the next tick.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::burrow::{FetchError, LagFetcher, LagReport};
use crate::store::{ConsumerGroupKey, MetricStore, PartitionLagKey};

/// Write one successful report into the store.
///
/// Partitions missing from `report` keep whatever value they had.
pub fn apply_report(store: &MetricStore, consumer_group: &str, report: &LagReport) {
    store.replace_total(report.total_lag);
    for p in &report.partitions {
        store.upsert_partition(
            PartitionLagKey::new(consumer_group, p.topic.as_str(), p.partition),
            p.current_lag,
        );
    }
}

/// Periodically fetches lag and publishes it to the store.
#[derive(Debug)]
pub struct Poller {
    fetcher: LagFetcher,
    store: Arc<MetricStore>,
    group: ConsumerGroupKey,
    interval: Duration,
}

impl Poller {
    pub fn new(
        fetcher: LagFetcher,
        store: Arc<MetricStore>,
        group: ConsumerGroupKey,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            store,
            group,
            interval,
        }
    }

    /// Run one poll.
    ///
    /// Returns the number of partitions written on success. Errors are
    /// already logged; callers only need them for tests or diagnostics.
    pub async fn tick(&self) -> Result<usize, FetchError> {
        match self.fetcher.fetch(&self.group).await {
            Ok(report) => {
                apply_report(&self.store, &self.group.group, &report);
                tracing::debug!(
                    group = %self.group,
                    total_lag = report.total_lag,
                    partitions = report.partitions.len(),
                    "Lag updated"
                );
                Ok(report.partitions.len())
            }
            Err(e) => {
                tracing::warn!(
                    group = %self.group,
                    kind = e.kind(),
                    url = %self.fetcher.lag_url(&self.group),
                    error = %e,
                    "Lag fetch failed, keeping previous values"
                );
                Err(e)
            }
        }
    }

    /// Poll until `shutdown_rx` fires.
    ///
    /// The first poll happens immediately. A tick that overruns the interval
    /// delays the schedule instead of firing a burst of catch-up polls.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            group = %self.group,
            interval_secs = self.interval.as_secs_f64(),
            "Starting lag poller"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let _ = self.tick().await;
                }
                _ = shutdown_rx.changed() => {
                    tracing::info!(group = %self.group, "Lag poller shutting down");
                    break;
                }
            }
        }
    }
}
