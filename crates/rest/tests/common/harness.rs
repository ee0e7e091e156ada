//! Search gateway test harness.
//!
//! Wires the real router to a stub SRU backend and a [`FakeFormatter`].

use std::sync::Arc;

use axum_test::{TestResponse, TestServer};
use ess_rest::{ServerConfig, WorkerPool, create_app_with_config};

use super::formatter::FakeFormatter;
use super::stub_sru::StubSru;

/// Test harness for the search API.
///
/// # Example
///
/// ```rust,ignore
/// let harness = SearchHarness::new().await;
/// harness.sru.respond_with(StatusCode::OK, sru_response(0, &[]));
/// let response = harness.search("/", &[("base", "bibdk"), ("query", "x"), ("format", "f")]).await;
/// assert_status(&response, 200);
/// ```
pub struct SearchHarness {
    /// The test server instance.
    pub server: TestServer,

    /// Stub SRU backend.
    pub sru: StubSru,

    /// Formatter shared with the app.
    pub formatter: Arc<FakeFormatter>,

    /// Worker pool shared with the app.
    pub pool: Arc<WorkerPool>,

    /// Server configuration.
    pub config: ServerConfig,
}

impl SearchHarness {
    /// Creates a harness with an immediate formatter and test configuration.
    pub async fn new() -> Self {
        Self::with(FakeFormatter::new(), |_| {}).await
    }

    /// Creates a harness with `formatter` and a configuration tweak.
    pub async fn with(formatter: FakeFormatter, adjust: impl FnOnce(&mut ServerConfig)) -> Self {
        let sru = StubSru::start().await;

        let mut config = ServerConfig {
            sru_target_url: sru.url().to_string(),
            ..ServerConfig::for_testing()
        };
        adjust(&mut config);

        let formatter = Arc::new(formatter);
        let pool = Arc::new(WorkerPool::current());
        let app = create_app_with_config(Arc::clone(&formatter), Arc::clone(&pool), config.clone())
            .expect("Failed to create app");
        let server = TestServer::new(app).expect("Failed to create test server");

        Self {
            server,
            sru,
            formatter,
            pool,
            config,
        }
    }

    /// Sends a GET to `path` with the given query parameters.
    pub async fn search(&self, path: &str, params: &[(&str, &str)]) -> TestResponse {
        let mut request = self.server.get(path);
        for (name, value) in params {
            request = request.add_query_param(name, value);
        }
        request.await
    }
}
