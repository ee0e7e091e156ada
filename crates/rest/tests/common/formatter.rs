//! Scriptable record formatter.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ess_rest::error::FormattingError;
use ess_rest::formatting::{FormatRequest, RecordFormatter};

/// Formats every record as `<formatted id=".." format=".."/>`.
///
/// Individual identifiers can be delayed or made to fail.
#[derive(Default)]
pub struct FakeFormatter {
    delays: HashMap<String, Duration>,
    failing: HashSet<String>,
    calls: Mutex<Vec<FormatRequest>>,
}

impl FakeFormatter {
    /// Creates a formatter that answers immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays the answer for `identifier`.
    pub fn with_delay(mut self, identifier: &str, delay: Duration) -> Self {
        self.delays.insert(identifier.to_string(), delay);
        self
    }

    /// Fails formatting of `identifier`.
    pub fn failing_for(mut self, identifier: &str) -> Self {
        self.failing.insert(identifier.to_string());
        self
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<FormatRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordFormatter for FakeFormatter {
    fn formatter_name(&self) -> &'static str {
        "fake"
    }

    async fn format(&self, request: &FormatRequest) -> Result<String, FormattingError> {
        self.calls.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delays.get(&request.identifier) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(&request.identifier) {
            return Err(FormattingError::Status { status: 500 });
        }
        Ok(format!(
            r#"<formatted id="{}" format="{}"/>"#,
            request.identifier, request.output_format
        ))
    }
}
