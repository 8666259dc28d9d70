//! Wire model for the Burrow consumer lag endpoint.
//!
//! Only the fields the exporter needs are required. Everything else Burrow
//! sends (`request`, `maxlag`, `partition_count`, per-partition offsets...)
//! is ignored by serde.

use serde::{Deserialize, Deserializer};

/// Body of `GET /v3/kafka/{cluster}/consumer/{group}/lag`.
#[derive(Debug, Clone, Deserialize)]
pub struct LagResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    pub status: LagStatus,
}

/// The `status` object of a lag response.
#[derive(Debug, Clone, Deserialize)]
pub struct LagStatus {
    pub totallag: i64,
    /// Burrow sends `null` for groups with no partition detail.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub partitions: Vec<PartitionStatus>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of `status.partitions`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PartitionStatus {
    pub topic: String,
    pub partition: i32,
    pub current_lag: i64,
}

/// Decoded result of a successful fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LagReport {
    pub total_lag: i64,
    pub partitions: Vec<PartitionStatus>,
}

impl From<LagResponse> for LagReport {
    fn from(resp: LagResponse) -> Self {
        Self {
            total_lag: resp.status.totallag,
            partitions: resp.status.partitions,
        }
    }
}
