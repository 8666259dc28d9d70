//! Test utilities and a scripted Burrow stand-in.
//!
//! Provides:
//! - In-process mock lag service (axum) serving queued responses
//! - Exporter harness bound to a random local port
//! - Polling helpers for async conditions

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;

use burrow_exporter::burrow::LagFetcher;
use burrow_exporter::config::Config;
use burrow_exporter::poller::Poller;
use burrow_exporter::server::Exporter;
use burrow_exporter::store::{ConsumerGroupKey, MetricStore};

/// One scripted reply of the mock lag service.
#[derive(Clone, Debug)]
pub struct MockReply {
    pub status: StatusCode,
    pub body: String,
    pub delay: Option<Duration>,
}

impl MockReply {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: body.into(),
            delay: None,
        }
    }

    pub fn status(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[derive(Default)]
struct MockState {
    replies: Mutex<VecDeque<MockReply>>,
    last: Mutex<Option<MockReply>>,
    requests: Mutex<Vec<(String, String)>>,
    hits: AtomicUsize,
}

/// Mock Burrow server answering `/v3/kafka/:cluster/consumer/:group/lag`.
///
/// Replies are served in the order they were queued; once the queue is
/// empty the last reply is repeated (503 if nothing was ever queued).
pub struct MockBurrow {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

async fn lag_handler(
    State(state): State<Arc<MockState>>,
    Path((cluster, group)): Path<(String, String)>,
) -> impl IntoResponse {
    state.hits.fetch_add(1, Ordering::SeqCst);
    state.requests.lock().unwrap().push((cluster, group));

    let next = state.replies.lock().unwrap().pop_front();
    let reply = match next {
        Some(reply) => {
            *state.last.lock().unwrap() = Some(reply.clone());
            Some(reply)
        }
        None => state.last.lock().unwrap().clone(),
    };

    match reply {
        Some(reply) => {
            if let Some(delay) = reply.delay {
                tokio::time::sleep(delay).await;
            }
            (reply.status, reply.body)
        }
        None => (StatusCode::SERVICE_UNAVAILABLE, "no reply queued".to_string()),
    }
}

impl MockBurrow {
    /// Start the mock on a random local port.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/v3/kafka/:cluster/consumer/:group/lag", get(lag_handler))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock burrow");
        let addr = listener.local_addr().expect("mock burrow has no address");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("mock burrow failed");
        });

        Self {
            addr,
            state,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    /// Address to pass as the exporter's `--server`.
    pub fn addr(&self) -> String {
        self.addr.to_string()
    }

    /// Queue a reply.
    pub fn push(&self, reply: MockReply) {
        self.state.replies.lock().unwrap().push_back(reply);
    }

    /// Queue a 200 reply with a lag body built from `total` and partitions.
    pub fn push_lag(&self, total: i64, partitions: &[(&str, i32, i64)]) {
        self.push(MockReply::ok(lag_body(total, partitions)));
    }

    /// Number of lag requests received.
    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    /// `(cluster, group)` path parameters of every request so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.requests.lock().unwrap().clone()
    }

    /// Stop the server and wait until its listener is closed.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

/// Burrow-shaped JSON body.
pub fn lag_body(total: i64, partitions: &[(&str, i32, i64)]) -> String {
    let partitions: Vec<serde_json::Value> = partitions
        .iter()
        .map(|(topic, partition, lag)| {
            serde_json::json!({
                "topic": topic,
                "partition": partition,
                "owner": "/10.0.0.1",
                "status": "OK",
                "current_lag": lag,
                "complete": 1,
            })
        })
        .collect();

    serde_json::json!({
        "error": false,
        "message": "consumer status returned",
        "status": {
            "cluster": "cluster",
            "group": "g",
            "status": "OK",
            "complete": 1,
            "partition_count": partitions.len(),
            "partitions": partitions,
            "totallag": total,
        },
        "request": {"url": "/v3/kafka/cluster/consumer/g/lag", "host": "mock"},
    })
    .to_string()
}

/// A poller against `server` writing into a fresh store.
pub fn poller_for(server: &str, timeout: Duration) -> (Poller, Arc<MetricStore>) {
    let store = Arc::new(MetricStore::new());
    let fetcher = LagFetcher::new(server, timeout).expect("invalid mock address");
    let poller = Poller::new(
        fetcher,
        Arc::clone(&store),
        ConsumerGroupKey::new("cluster", "g"),
        Duration::from_secs(10),
    );
    (poller, store)
}

/// Exporter running in-process on a random port.
pub struct TestExporter {
    pub metrics_addr: SocketAddr,
    pub store: Arc<MetricStore>,
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl TestExporter {
    /// Start an exporter polling `server` every `interval_secs`.
    pub async fn start(server: &str, interval_secs: u64) -> Self {
        let config = Config {
            interval: interval_secs,
            server: server.to_string(),
            cluster: "cluster".into(),
            group: "g".into(),
            host: "127.0.0.1".into(),
            port: 0,
            request_timeout: 1,
            ..Config::default()
        };

        let exporter = Exporter::build(&config).expect("failed to build exporter");
        let store = Arc::clone(&exporter.store);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind metrics listener");
        let metrics_addr = listener.local_addr().expect("listener has no address");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(exporter.run(listener, shutdown_rx));

        Self {
            metrics_addr,
            store,
            shutdown_tx,
            handle,
        }
    }

    /// Fetch `/metrics` and return the body.
    pub async fn scrape(&self) -> String {
        let response = reqwest::get(format!("http://{}/metrics", self.metrics_addr))
            .await
            .expect("scrape failed");
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        response.text().await.expect("scrape body unreadable")
    }

    /// Signal shutdown and wait for the exporter to stop.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        let result = tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("exporter did not stop in time")
            .expect("exporter task panicked");
        result.expect("exporter returned an error");
    }
}

/// Wait for a condition to become true with timeout.
///
/// # Returns
///
/// `true` if condition was met, `false` if timeout expired
pub async fn wait_for<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// An address nothing is listening on.
pub fn unused_addr() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("failed to bind");
    let addr = listener.local_addr().expect("listener has no address");
    drop(listener);
    addr.to_string()
}
