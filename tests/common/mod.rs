//! Shared utilities for relay integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, Uri},
    middleware::{self, Next},
    response::{AppendHeaders, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use crawler_relay::relay::{DefaultScheme, Executor, Identity, ReqwestTransport};
use crawler_relay::{HttpServer, Shutdown};

/// Records what the upstream observed.
#[derive(Clone, Default)]
pub struct Spy {
    hits: Arc<AtomicUsize>,
    last_headers: Arc<Mutex<Option<HeaderMap>>>,
    last_uri: Arc<Mutex<Option<Uri>>>,
}

impl Spy {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn last_headers(&self) -> HeaderMap {
        self.last_headers
            .lock()
            .unwrap()
            .clone()
            .expect("upstream saw no request")
    }

    pub fn last_uri(&self) -> Uri {
        self.last_uri
            .lock()
            .unwrap()
            .clone()
            .expect("upstream saw no request")
    }
}

async fn record(State(spy): State<Spy>, request: Request, next: Next) -> Response {
    spy.hits.fetch_add(1, Ordering::SeqCst);
    *spy.last_headers.lock().unwrap() = Some(request.headers().clone());
    *spy.last_uri.lock().unwrap() = Some(request.uri().clone());
    next.run(request).await
}

pub struct MockUpstream {
    pub addr: SocketAddr,
    pub spy: Spy,
}

impl MockUpstream {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

/// Start a mock upstream website on an ephemeral port.
pub async fn start_mock_upstream() -> MockUpstream {
    let spy = Spy::default();
    let app = Router::new()
        .route("/test", get(|| async { (StatusCode::OK, "TEST") }))
        .route("/410", get(|| async { (StatusCode::GONE, "GONE") }))
        .route(
            "/headers",
            get(|| async {
                (
                    AppendHeaders([("x-upstream", "one"), ("x-upstream", "two")]),
                    "HEADERS",
                )
            }),
        )
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(spy.clone(), record));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockUpstream { addr, spy }
}

/// Relay whose scheme-less targets default to plain HTTP.
pub fn test_server() -> HttpServer {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    let executor = Executor::new(ReqwestTransport::from_client(client), Identity::googlebot());
    HttpServer::from_executor(executor, DefaultScheme::Http)
}

/// Start the relay on an ephemeral port.
pub async fn start_relay() -> (SocketAddr, Shutdown) {
    let server = test_server();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Target URL encoded as a single path component.
pub fn encode_component(s: &str) -> String {
    urlencoding::encode(s).into_owned()
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
