//! Burrow exporter: Kafka consumer-group lag for Prometheus.
//!
//! # Usage
//!
//! ```bash
//! burrow-exporter -s 127.0.0.1:8888 --cluster local -g billing --port 8811
//! ```
//!
//! Environment variables can also be used:
//! - `BURROW_EXPORTER_SERVER`: Burrow address
//! - `BURROW_EXPORTER_CLUSTER` / `BURROW_EXPORTER_GROUP`: what to monitor
//! - `BURROW_EXPORTER_PORT`: Metrics port
//! - `RUST_LOG`: Log filter (trace, debug, info, warn, error)

use burrow_exporter::config::Config;
use burrow_exporter::observability::tracing::init_tracing;
use burrow_exporter::server::run_exporter;
use tokio::sync::watch;

/// Print startup banner with version and configuration.
fn print_banner(config: &Config) {
    let version = env!("CARGO_PKG_VERSION");
    eprintln!(
        r#"
  burrow-exporter v{}

  Configuration:
    Burrow:     {}
    Cluster:    {}
    Group:      {}
    Interval:   {}s
    Metrics:    {}:{}/metrics

  Press Ctrl+C to shutdown gracefully.
"#,
        version,
        config.server,
        config.cluster,
        config.group,
        config.interval,
        config.host,
        config.port
    );
}

/// Resolve once SIGINT or SIGTERM arrives.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => {
                        tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
                    }
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM, initiating shutdown...");
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler, only Ctrl+C will stop the exporter");
                let _ = ctrl_c.await;
                tracing::info!("Received SIGINT (Ctrl+C), initiating shutdown...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        tracing::info!("Received Ctrl+C, initiating shutdown...");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse configuration from CLI arguments and environment
    let config = Config::parse_args();

    // Initialize tracing/logging
    init_tracing(&config.log_level);

    // Print startup banner
    print_banner(&config);

    // Create shutdown signal channel
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // Spawn signal handler task
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    run_exporter(config, shutdown_rx).await?;

    tracing::info!("burrow-exporter shutdown complete");
    Ok(())
}
