//! HTTP response assertions.

use axum_test::TestResponse;

/// Asserts that the response has the expected status code.
pub fn assert_status(response: &TestResponse, expected: u16) {
    let actual = response.status_code().as_u16();
    assert_eq!(
        actual,
        expected,
        "Expected status {}, got {}: {}",
        expected,
        actual,
        response.text()
    );
}

/// Asserts a plain-text error response with the given status and body.
pub fn assert_plain_error(response: &TestResponse, status: u16, body: &str) {
    assert_status(response, status);
    let content_type = response.header("content-type");
    assert!(
        content_type.to_str().unwrap().starts_with("text/plain"),
        "Expected text/plain, got {:?}",
        content_type
    );
    assert_eq!(response.text(), body);
}

/// A parsed `essResponse` document.
#[derive(Debug)]
pub struct ParsedEss {
    /// `hits`.
    pub hits: u64,
    /// `trackingId`.
    pub tracking_id: String,
    /// One entry per record: the `id` attribute of a formatted record, or
    /// `error: <message>` for a placeholder.
    pub records: Vec<String>,
}

/// Asserts a successful XML response and parses it.
pub fn parse_ess(response: &TestResponse) -> ParsedEss {
    assert_status(response, 200);
    assert_eq!(response.header("content-type"), "application/xml");

    let body = response.text();
    let doc = roxmltree::Document::parse(&body).expect("response is not XML");
    let root = doc.root_element();
    assert_eq!(root.tag_name().name(), "essResponse");

    let child = |name: &str| {
        root.children()
            .find(|c| c.has_tag_name(name))
            .unwrap_or_else(|| panic!("missing <{}>", name))
    };

    let records = child("records")
        .children()
        .filter(|c| c.is_element())
        .map(|c| match c.tag_name().name() {
            "error" => format!("error: {}", c.text().unwrap_or_default()),
            _ => c.attribute("id").unwrap_or_default().to_string(),
        })
        .collect();

    ParsedEss {
        hits: child("hits").text().unwrap().parse().unwrap(),
        tracking_id: child("trackingId").text().unwrap_or_default().to_string(),
        records,
    }
}
