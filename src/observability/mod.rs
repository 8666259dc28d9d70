//! Observability infrastructure.
//!
//! Provides:
//! - Structured logging via `tracing`
//! - The lag collector that renders the store as Prometheus gauges
//! - HTTP endpoints for Prometheus scraping

pub mod collector;
pub mod prometheus;
pub mod tracing;
