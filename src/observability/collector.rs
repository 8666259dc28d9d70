//! Prometheus collector that turns a store snapshot into gauges.
//!
//! Exposed families:
//! - `lag_kafka_{cluster}_{group}`: total lag of the monitored group
//! - `lag_details{consumer_group, topic, partition}`: last known lag per partition
//!
//! Every scrape builds fresh gauges from one snapshot, so concurrent scrapes
//! share nothing mutable and never wait on the poller.

use std::collections::HashMap;
use std::sync::Arc;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{IntGauge, IntGaugeVec, Opts, Registry};

use crate::store::{ConsumerGroupKey, MetricStore};

/// Name of the per-partition gauge family.
pub const LAG_DETAILS_METRIC: &str = "lag_details";

const LAG_DETAILS_HELP: &str = "lag details";
const TOTAL_LAG_HELP: &str = "the lag of consumer group";
const DETAIL_LABELS: [&str; 3] = ["consumer_group", "topic", "partition"];

/// Name of the total-lag gauge for a cluster/group pair.
///
/// Characters that are not valid in a metric name are replaced by `_`.
pub fn total_lag_metric_name(group: &ConsumerGroupKey) -> String {
    let raw = format!("lag_kafka_{}_{}", group.cluster, group.group);
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Scrape-time view over a shared [`MetricStore`].
#[derive(Debug)]
pub struct LagCollector {
    store: Arc<MetricStore>,
    total_name: String,
    descs: Vec<Desc>,
}

impl LagCollector {
    pub fn new(store: Arc<MetricStore>, group: &ConsumerGroupKey) -> prometheus::Result<Self> {
        let total_name = total_lag_metric_name(group);
        let descs = vec![
            Desc::new(
                total_name.clone(),
                TOTAL_LAG_HELP.to_string(),
                Vec::new(),
                HashMap::new(),
            )?,
            Desc::new(
                LAG_DETAILS_METRIC.to_string(),
                LAG_DETAILS_HELP.to_string(),
                DETAIL_LABELS.iter().map(|l| (*l).to_string()).collect(),
                HashMap::new(),
            )?,
        ];

        Ok(Self {
            store,
            total_name,
            descs,
        })
    }

    fn build_families(&self) -> prometheus::Result<Vec<MetricFamily>> {
        let snapshot = self.store.snapshot();

        let total = IntGauge::with_opts(Opts::new(self.total_name.as_str(), TOTAL_LAG_HELP))?;
        total.set(snapshot.total_lag);

        let details = IntGaugeVec::new(Opts::new(LAG_DETAILS_METRIC, LAG_DETAILS_HELP), &DETAIL_LABELS)?;
        for (key, lag) in &snapshot.partitions {
            let partition = key.partition.to_string();
            details
                .with_label_values(&[key.consumer_group.as_str(), key.topic.as_str(), partition.as_str()])
                .set(*lag);
        }

        let mut families = total.collect();
        families.extend(details.collect());
        Ok(families)
    }
}

impl Collector for LagCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        match self.build_families() {
            Ok(families) => families,
            Err(e) => {
                tracing::error!(error = %e, "Failed to build lag metrics");
                Vec::new()
            }
        }
    }
}

/// Build a registry holding only the lag collector.
pub fn exporter_registry(collector: LagCollector) -> prometheus::Result<Registry> {
    let registry = Registry::new();
    registry.register(Box::new(collector))?;
    Ok(registry)
}
