//! Stub SRU backend.
//!
//! Serves a canned response for every path and records each call, so tests
//! can check both what the gateway sent and whether it sent anything at all.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

/// One call received by the stub.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// Request path, e.g. `/bibdk`.
    pub path: String,
    /// Decoded query pairs in order.
    pub params: Vec<(String, String)>,
    /// The `Accept` header, if any.
    pub accept: Option<String>,
}

impl RecordedCall {
    /// First value of query parameter `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Canned {
    status: StatusCode,
    body: String,
}

/// A running stub backend.
#[derive(Clone)]
pub struct StubSru {
    url: String,
    canned: Arc<Mutex<Canned>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl StubSru {
    /// Starts the stub on 127.0.0.1 with an OS-assigned port.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub SRU backend");
        let addr = listener.local_addr().expect("Stub has no local address");

        let stub = Self {
            url: format!("http://{}", addr),
            canned: Arc::new(Mutex::new(Canned {
                status: StatusCode::OK,
                body: super::fixtures::sru_response(0, &[]),
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new().fallback(handle).with_state(stub.clone());
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Stub SRU backend failed");
        });

        stub
    }

    /// Base URL to configure as the SRU target.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Answers every following call with `status` and `body`.
    pub fn respond_with(&self, status: StatusCode, body: impl Into<String>) {
        let mut canned = self.canned.lock().unwrap();
        canned.status = status;
        canned.body = body.into();
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of calls received so far.
    pub fn hit_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

async fn handle(State(stub): State<StubSru>, headers: axum::http::HeaderMap, uri: Uri) -> Response {
    let params = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    stub.calls.lock().unwrap().push(RecordedCall {
        path: uri.path().to_string(),
        params,
        accept: headers
            .get(header::ACCEPT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
    });

    let (status, body) = {
        let canned = stub.canned.lock().unwrap();
        (canned.status, canned.body.clone())
    };
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
