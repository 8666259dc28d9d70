//! In-memory lag store shared by the poller and the scrape path.
//!
//! One writer (the poller) and any number of concurrent readers (scrapes):
//! - Total lag lives in an `AtomicI64`, so reads never wait on the writer
//! - Partition samples live behind an `RwLock<BTreeMap>`; readers copy the
//!   map under a short read lock and format outside of it
//!
//! Total lag and partition samples are independent series. A reader may see
//! the total from one poll and partition values from the previous one.
//! Entries are never evicted: a partition that disappears upstream keeps its
//! last known value.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Identifies the monitored consumer group.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct ConsumerGroupKey {
    pub cluster: String,
    pub group: String,
}

impl ConsumerGroupKey {
    pub fn new(cluster: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            group: group.into(),
        }
    }
}

impl fmt::Display for ConsumerGroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.cluster, self.group)
    }
}

/// Key of a single per-partition lag entry.
///
/// Ordered by group, then topic, then partition, which is also the order
/// in which snapshots list entries.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct PartitionLagKey {
    pub consumer_group: String,
    pub topic: String,
    pub partition: i32,
}

impl PartitionLagKey {
    pub fn new(consumer_group: impl Into<String>, topic: impl Into<String>, partition: i32) -> Self {
        Self {
            consumer_group: consumer_group.into(),
            topic: topic.into(),
            partition,
        }
    }
}

/// Point-in-time copy of the store contents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    /// Aggregate lag from the most recent successful poll.
    pub total_lag: i64,
    /// Last known lag per partition, sorted by key.
    pub partitions: Vec<(PartitionLagKey, i64)>,
}

impl StoreSnapshot {
    /// Look up the lag recorded for one partition.
    pub fn partition_lag(&self, key: &PartitionLagKey) -> Option<i64> {
        self.partitions
            .binary_search_by(|(k, _)| k.cmp(key))
            .ok()
            .map(|idx| self.partitions[idx].1)
    }
}

/// Latest known lag values for one consumer group.
///
/// Created empty at startup and shared via `Arc` between the poller and the
/// metrics collector. Only the poller calls the mutating methods.
#[derive(Debug, Default)]
pub struct MetricStore {
    total_lag: AtomicI64,
    partitions: RwLock<BTreeMap<PartitionLagKey, i64>>,
}

impl MetricStore {
    /// Create an empty store with total lag 0 and no partitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the total lag.
    pub fn replace_total(&self, value: i64) {
        self.total_lag.store(value, Ordering::Release);
    }

    /// Insert or overwrite the lag for one partition.
    pub fn upsert_partition(&self, key: PartitionLagKey, value: i64) {
        // A poisoned lock only means another thread panicked mid-insert;
        // the map itself is still a valid BTreeMap.
        let mut partitions = self
            .partitions
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        partitions.insert(key, value);
    }

    /// Copy the current state.
    ///
    /// Holds the read lock only while cloning the map.
    pub fn snapshot(&self) -> StoreSnapshot {
        let total_lag = self.total_lag.load(Ordering::Acquire);
        let partitions = {
            let guard = self
                .partitions
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.iter().map(|(k, v)| (k.clone(), *v)).collect()
        };

        StoreSnapshot {
            total_lag,
            partitions,
        }
    }

    /// Current total lag.
    pub fn total_lag(&self) -> i64 {
        self.total_lag.load(Ordering::Acquire)
    }

    /// Number of partition entries ever recorded.
    pub fn partition_count(&self) -> usize {
        self.partitions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
