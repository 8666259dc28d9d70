//! Client for the Burrow lag-status HTTP API.
//!
//! One request per poll, no internal retries. Every failure is classified
//! into a [`FetchError`] and handed back to the poller, which simply waits
//! for the next tick.

pub mod response;

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;

use crate::store::ConsumerGroupKey;

pub use response::{LagReport, LagResponse, PartitionStatus};

/// Reasons a single lag fetch can fail.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, timeout, or a body that could not be read.
    #[error("lag service request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The lag service answered with something other than 200.
    #[error("lag service returned unexpected status {status}")]
    UnexpectedStatus { status: StatusCode },

    /// The body was not JSON of the expected shape.
    #[error("failed to decode lag response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl FetchError {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::UnexpectedStatus { .. } => "unexpected_status",
            Self::Decode(_) => "decode",
        }
    }
}

/// Errors building a [`LagFetcher`] from configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid lag service address {addr:?}: {reason}")]
    InvalidAddress { addr: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Fetches consumer-group lag from one Burrow server.
#[derive(Debug, Clone)]
pub struct LagFetcher {
    client: Client,
    base_url: Url,
}

impl LagFetcher {
    /// Create a fetcher for the given server address.
    ///
    /// `addr` is either `host:port` (plain HTTP is assumed) or a full
    /// `http://` / `https://` base URL. `timeout` bounds the whole request,
    /// including reading the body.
    pub fn new(addr: &str, timeout: Duration) -> Result<Self, SetupError> {
        let base_url = parse_base_url(addr)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SetupError::Client)?;

        Ok(Self { client, base_url })
    }

    /// URL of the lag endpoint for `group`.
    pub fn lag_url(&self, group: &ConsumerGroupKey) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend([
                "v3",
                "kafka",
                group.cluster.as_str(),
                "consumer",
                group.group.as_str(),
                "lag",
            ]);
        }
        url
    }

    /// Fetch the current lag for `group`.
    pub async fn fetch(&self, group: &ConsumerGroupKey) -> Result<LagReport, FetchError> {
        let url = self.lag_url(group);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::UnexpectedStatus { status });
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;
        let decoded: LagResponse = serde_json::from_slice(&body)?;

        if !decoded.message.is_empty() {
            tracing::debug!(group = %group, message = %decoded.message, "Lag service message");
        }

        Ok(decoded.into())
    }
}

fn parse_base_url(addr: &str) -> Result<Url, SetupError> {
    let invalid = |reason: String| SetupError::InvalidAddress {
        addr: addr.to_string(),
        reason,
    };

    let trimmed = addr.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(invalid("address is empty".into()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    let url = Url::parse(&candidate).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("not a base URL".into()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {:?}", url.scheme())));
    }

    Ok(url)
}
