//! Burrow exporter: Kafka consumer-group lag as Prometheus gauges.
//!
//! A background poller fetches lag for one consumer group from Burrow on a
//! fixed interval and writes it into an in-memory store. Every Prometheus
//! scrape reads a snapshot of that store; scrapes never trigger upstream
//! calls and never wait on the poller.
//!
//! # Behaviour
//!
//! - **Last write wins**: each successful poll overwrites the total and the
//!   partitions it reports
//! - **Stale entries persist**: partitions that stop being reported keep
//!   their last value
//! - **Failures skip a tick**: a failed poll leaves the store unchanged
//!
//! # Modules
//!
//! - [`config`]: CLI and environment configuration
//! - [`burrow`]: Lag service client and response model
//! - [`store`]: Concurrent lag store
//! - [`poller`]: Timer-driven poll loop
//! - [`observability`]: Logging, lag collector and scrape endpoint
//! - [`server`]: Process wiring

// Lint configuration
#![warn(clippy::all)]
#![allow(
    clippy::module_name_repetitions, // store::MetricStore is fine
    clippy::must_use_candidate,      // Not all functions need #[must_use]
    clippy::missing_errors_doc,      // Error docs can be verbose
    clippy::missing_panics_doc       // Panic docs can be verbose
)]

pub mod burrow;
pub mod config;
pub mod observability;
pub mod poller;
pub mod server;
pub mod store;
