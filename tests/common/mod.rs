//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use tokio::net::TcpListener;

use modsec_gate::config::GateServerConfig;
use modsec_gate::http::HttpServer;
use modsec_gate::lifecycle::Shutdown;

/// A request as seen by a mock server.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Seen {
    pub method: String,
    pub path_and_query: String,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl Seen {
    #[allow(dead_code)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Log of requests received by a mock server.
pub type Recorder = Arc<Mutex<Vec<Seen>>>;

#[derive(Clone)]
struct MockState {
    status: u16,
    headers: Vec<(&'static str, &'static str)>,
    body: &'static str,
    seen: Recorder,
}

async fn respond(State(state): State<MockState>, request: Request<Body>) -> Response {
    let (parts, body) = request.into_parts();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .unwrap_or_default();

    state.seen.lock().unwrap().push(Seen {
        method: parts.method.to_string(),
        path_and_query: parts
            .uri
            .path_and_query()
            .map(|pq| pq.to_string())
            .unwrap_or_default(),
        headers: parts
            .headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_str().unwrap_or_default().to_string()))
            .collect(),
        body,
    });

    let mut builder = Response::builder().status(StatusCode::from_u16(state.status).unwrap());
    for (name, value) in &state.headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(state.body)).unwrap()
}

/// Start a mock HTTP server answering every request with a fixed response.
/// Returns its address and the log of requests it received.
pub async fn start_mock(
    status: u16,
    headers: Vec<(&'static str, &'static str)>,
    body: &'static str,
) -> (SocketAddr, Recorder) {
    let seen = Recorder::default();
    let state = MockState {
        status,
        headers,
        body,
        seen: seen.clone(),
    };
    let app = Router::new().fallback(respond).with_state(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (addr, seen)
}

/// An address nothing listens on.
pub fn unreachable_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap()
}

/// Start the gate server for `config` on an ephemeral port.
pub async fn start_gate(mut config: GateServerConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    (addr, shutdown)
}

/// HTTP client for talking to the gate.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .unwrap()
}
