//! Stub formatting service.
//!
//! Answers every call with a canned status and body and keeps what the
//! client sent: method, query, content type and the posted document.

use std::sync::{Arc, Mutex};

use axum::{
    Router,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

/// One call received by the stub.
#[derive(Debug, Clone)]
pub struct FormatCall {
    /// HTTP method.
    pub method: Method,
    /// Request path.
    pub path: String,
    /// Decoded query pairs in order.
    pub params: Vec<(String, String)>,
    /// The `Content-Type` header, if any.
    pub content_type: Option<String>,
    /// The posted body.
    pub body: String,
}

impl FormatCall {
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

/// A running stub formatting service.
#[derive(Clone)]
pub struct StubFormatService {
    url: String,
    canned: Arc<Mutex<Canned>>,
    calls: Arc<Mutex<Vec<FormatCall>>>,
}

impl StubFormatService {
    /// Starts the stub on 127.0.0.1 with an OS-assigned port.
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub formatting service");
        let addr = listener.local_addr().expect("Stub has no local address");

        let stub = Self {
            url: format!("http://{}/format", addr),
            canned: Arc::new(Mutex::new(Canned {
                status: StatusCode::OK,
                body: "<formatted/>".to_string(),
            })),
            calls: Arc::new(Mutex::new(Vec::new())),
        };

        let app = Router::new().fallback(handle).with_state(stub.clone());
        tokio::spawn(async move {
            axum::serve(listener, app)
                .await
                .expect("Stub formatting service failed");
        });

        stub
    }

    /// Endpoint URL to configure as the formatting service.
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
    pub fn calls(&self) -> Vec<FormatCall> {
        self.calls.lock().unwrap().clone()
    }
}

async fn handle(
    State(stub): State<StubFormatService>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
    body: String,
) -> Response {
    let params = uri
        .query()
        .map(|q| {
            url::form_urlencoded::parse(q.as_bytes())
                .into_owned()
                .collect()
        })
        .unwrap_or_default();
    stub.calls.lock().unwrap().push(FormatCall {
        method,
        path: uri.path().to_string(),
        params,
        content_type: headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let (status, body) = {
        let canned = stub.canned.lock().unwrap();
        (canned.status, canned.body.clone())
    };
    (status, [(header::CONTENT_TYPE, "application/xml")], body).into_response()
}
