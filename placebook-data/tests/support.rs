//! Local axum service answering Nominatim requests with a canned body.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri, header};
use axum::response::IntoResponse;
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

/// One request as the service saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub params: Vec<(String, String)>,
}

#[derive(Clone)]
struct Canned {
    status: StatusCode,
    body: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

/// Serves the same canned answer on every path and records each request.
///
/// The server runs on its own runtime so the blocking resolver under test
/// can call it from a plain test thread.
pub struct CannedService {
    pub base_url: String,
    seen: Arc<Mutex<Vec<SeenRequest>>>,
    server: JoinHandle<std::io::Result<()>>,
    _runtime: Runtime,
}

impl CannedService {
    pub fn start(status: StatusCode, body: String) -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_io()
            .build()
            .expect("service runtime");
        let listener = runtime
            .block_on(tokio::net::TcpListener::bind("127.0.0.1:0"))
            .expect("bind local listener");
        let port = listener.local_addr().expect("local address").port();

        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().fallback(answer).with_state(Canned {
            status,
            body,
            seen: Arc::clone(&seen),
        });
        let server = runtime.spawn(async move { axum::serve(listener, app).await });

        Self {
            base_url: format!("http://127.0.0.1:{port}"),
            seen,
            server,
            _runtime: runtime,
        }
    }

    /// Requests seen so far, oldest first.
    pub fn requests(&self) -> Vec<SeenRequest> {
        self.seen.lock().expect("request log").clone()
    }
}

impl Drop for CannedService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn answer(
    State(canned): State<Canned>,
    uri: Uri,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    canned.seen.lock().expect("request log").push(SeenRequest {
        path: uri.path().to_owned(),
        params,
    });
    (
        canned.status,
        [(header::CONTENT_TYPE, "application/json")],
        canned.body,
    )
}

/// Base URL of a port nothing is listening on.
pub fn closed_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind local listener");
    let port = listener.local_addr().expect("local address").port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}
