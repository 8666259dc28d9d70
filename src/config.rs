//! Configuration parsing for the exporter.
//!
//! Supports:
//! - CLI arguments via clap
//! - Environment variable overrides
//! - Defaults that match a local Burrow install

use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

use crate::store::ConsumerGroupKey;

/// Burrow exporter: republishes Kafka consumer-group lag as Prometheus gauges.
#[derive(Parser, Debug, Clone)]
#[command(name = "burrow-exporter")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Seconds between lag polls
    #[arg(
        short,
        long,
        alias = "intval",
        env = "BURROW_EXPORTER_INTERVAL",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// Burrow server address (host:port or http(s) base URL)
    #[arg(short, long, env = "BURROW_EXPORTER_SERVER", default_value = "127.0.0.1:8888")]
    pub server: String,

    /// Kafka cluster name as configured in Burrow
    #[arg(long, env = "BURROW_EXPORTER_CLUSTER", default_value = "cluster")]
    pub cluster: String,

    /// Consumer group to monitor
    #[arg(short, long, env = "BURROW_EXPORTER_GROUP", default_value = "consumergroup")]
    pub group: String,

    /// Host address for the metrics endpoint
    #[arg(long, env = "BURROW_EXPORTER_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port for the metrics endpoint
    #[arg(short, long, env = "BURROW_EXPORTER_PORT", default_value_t = 8811)]
    pub port: u16,

    /// Upstream request timeout in seconds (capped at the poll interval)
    #[arg(
        long,
        env = "BURROW_EXPORTER_REQUEST_TIMEOUT",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub request_timeout: u64,

    /// Default log filter when RUST_LOG is not set (trace, debug, info, warn, error)
    #[arg(long, env = "BURROW_EXPORTER_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse configuration from CLI arguments and environment.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// The monitored cluster/group pair.
    pub fn consumer_group(&self) -> ConsumerGroupKey {
        ConsumerGroupKey::new(self.cluster.as_str(), self.group.as_str())
    }

    /// Poll period.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Timeout for one upstream request, never longer than the poll period.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout.min(self.interval))
    }

    /// Socket address the metrics endpoint binds to.
    pub fn metrics_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Create a default configuration for testing.
    #[cfg(test)]
    pub fn test_config(server: &str) -> Self {
        Self {
            interval: 1,
            server: server.into(),
            host: "127.0.0.1".into(),
            port: 0, // Random port
            log_level: "debug".into(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: 10,
            server: "127.0.0.1:8888".into(),
            cluster: "cluster".into(),
            group: "consumergroup".into(),
            host: "0.0.0.0".into(),
            port: 8811,
            request_timeout: 5,
            log_level: "info".into(),
        }
    }
}
