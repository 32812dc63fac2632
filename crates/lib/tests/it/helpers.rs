use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use spamscope::backend::{Backend, InMemory, JsonFile};
use spamscope::{ConversationSession, ConversationStore, FixedClock};
use tempfile::TempDir;
use tokio::sync::oneshot;

// ==========================
// BACKEND FACTORIES
// ==========================

/// A backend plus whatever must outlive it.
pub struct TestBackend {
    pub backend: Arc<dyn Backend>,
    _dir: Option<TempDir>,
}

/// Creates a test backend based on the TEST_BACKEND env var.
///
/// Supported values:
/// - "inmemory" or unset: InMemory backend (default)
/// - "jsonfile": JsonFile backend in a fresh temporary directory
///
/// # Example
/// ```bash
/// TEST_BACKEND=jsonfile cargo test
/// ```
pub async fn test_backend() -> TestBackend {
    match std::env::var("TEST_BACKEND").as_deref() {
        Ok("jsonfile") => {
            let dir = tempfile::tempdir().expect("Failed to create temp dir");
            let backend = JsonFile::open(dir.path().join("spamscope.json"))
                .await
                .expect("Failed to open JsonFile backend");
            TestBackend {
                backend: Arc::new(backend),
                _dir: Some(dir),
            }
        }
        Ok("inmemory") | Ok("") | Err(_) => TestBackend {
            backend: Arc::new(InMemory::new()),
            _dir: None,
        },
        Ok(other) => panic!("Unknown TEST_BACKEND value: {other}. Supported: inmemory, jsonfile"),
    }
}

/// Store over [`test_backend`]. Keep the returned guard alive for the test.
pub async fn test_store() -> (ConversationStore, TestBackend) {
    let backend = test_backend().await;
    (ConversationStore::new(backend.backend.clone()), backend)
}

/// Session over a fresh store, with a [`FixedClock`].
pub async fn test_session() -> (ConversationSession, Arc<FixedClock>, TestBackend) {
    let (store, guard) = test_store().await;
    let clock = Arc::new(FixedClock::default());
    let session = ConversationSession::open(store, clock.clone())
        .await
        .expect("Failed to open session");
    (session, clock, guard)
}

// ==========================
// STUB CLASSIFIER SERVICE
// ==========================

/// Counters shared with the stub's handlers.
#[derive(Debug, Default)]
pub struct StubStats {
    pub pings: AtomicUsize,
    pub classified: AtomicUsize,
}

/// A local HTTP service speaking the classifier's protocol.
///
/// `/api/classify` answers spam (class 1, 0.92) for texts containing "prize",
/// a 500 with an error body for texts containing "crash", a body without
/// probabilities for texts containing "partial", and ham (class 0, 0.85)
/// otherwise. `/api/generate-reply` echoes the prompt unless it contains
/// "silent", in which case the reply is omitted.
pub struct StubServer {
    pub addr: SocketAddr,
    pub stats: Arc<StubStats>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl StubServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop serving. Later requests fail to connect.
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn ping(State(stats): State<Arc<StubStats>>) -> Json<Value> {
    stats.pings.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "ok" }))
}

async fn classify(State(stats): State<Arc<StubStats>>, Json(body): Json<Value>) -> Response {
    stats.classified.fetch_add(1, Ordering::SeqCst);
    let text = body["text"].as_str().unwrap_or_default();
    if text.contains("crash") {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "model exploded" })),
        )
            .into_response();
    }
    if text.contains("partial") {
        return Json(json!({ "predicted_class": 1 })).into_response();
    }
    if text.contains("prize") {
        Json(json!({ "predicted_class": 1, "probabilities": [0.08, 0.92] })).into_response()
    } else {
        Json(json!({ "predicted_class": 0, "probabilities": [0.85, 0.15] })).into_response()
    }
}

async fn generate_reply(Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["prompt"].as_str().unwrap_or_default();
    if prompt.contains("silent") {
        Json(json!({}))
    } else {
        Json(json!({ "reply": format!("Re: {prompt}") }))
    }
}

/// Start a [`StubServer`] on an ephemeral local port.
pub async fn start_stub_server() -> StubServer {
    let stats = Arc::new(StubStats::default());
    let router = Router::new()
        .route("/api/ping", get(ping))
        .route("/api/classify", post(classify))
        .route("/api/generate-reply", post(generate_reply))
        .with_state(stats.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind address");
    let addr = listener.local_addr().expect("Failed to get local address");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("Server failed");
    });

    StubServer {
        addr,
        stats,
        shutdown: Some(shutdown_tx),
    }
}

/// A URL nothing listens on.
pub async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind address");
    let addr = listener.local_addr().expect("Failed to get local address");
    drop(listener);
    format!("http://{addr}")
}
