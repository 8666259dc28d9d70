//! Exporter wiring and lifecycle.
//!
//! Builds one store, one poller (its only writer) and one collector (its
//! readers), then serves `/metrics` until shutdown.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::burrow::LagFetcher;
use crate::config::Config;
use crate::observability::collector::{exporter_registry, LagCollector};
use crate::observability::prometheus::serve_metrics;
use crate::poller::Poller;
use crate::store::MetricStore;

/// Shared handles of a running exporter.
pub struct Exporter {
    pub store: Arc<MetricStore>,
    pub poller: Poller,
    pub registry: prometheus::Registry,
}

impl Exporter {
    /// Build every component from configuration without starting anything.
    pub fn build(config: &Config) -> anyhow::Result<Self> {
        let group = config.consumer_group();
        let store = Arc::new(MetricStore::new());

        let fetcher = LagFetcher::new(&config.server, config.request_timeout())
            .context("failed to create lag fetcher")?;

        let collector =
            LagCollector::new(Arc::clone(&store), &group).context("invalid metric name")?;
        let registry = exporter_registry(collector).context("failed to register lag collector")?;

        let poller = Poller::new(fetcher, Arc::clone(&store), group, config.poll_interval());

        Ok(Self {
            store,
            poller,
            registry,
        })
    }

    /// Run the poller and serve metrics on `listener` until shutdown.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: watch::Receiver<bool>,
    ) -> anyhow::Result<()> {
        let poller = tokio::spawn(self.poller.run(shutdown_rx.clone()));

        let served = serve_metrics(listener, self.registry, shutdown_rx).await;

        if let Err(e) = poller.await {
            tracing::error!(error = %e, "Lag poller task failed");
        }

        served.context("metrics server failed")
    }
}

/// Run the exporter described by `config`.
///
/// # Arguments
///
/// * `config` - Exporter configuration
/// * `shutdown_rx` - Receiver for shutdown signal
///
/// # Returns
///
/// Returns when the exporter has shut down.
pub async fn run_exporter(config: Config, shutdown_rx: watch::Receiver<bool>) -> anyhow::Result<()> {
    let addr = config
        .metrics_addr()
        .with_context(|| format!("invalid metrics address {}:{}", config.host, config.port))?;

    let exporter = Exporter::build(&config)?;

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind metrics endpoint on {addr}"))?;
    tracing::info!(
        address = %addr,
        upstream = %config.server,
        group = %config.consumer_group(),
        "Starting Burrow exporter"
    );

    exporter.run(listener, shutdown_rx).await?;

    tracing::info!("Exporter stopped");
    Ok(())
}
