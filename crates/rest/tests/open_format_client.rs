//! Integration tests for the HTTP formatting service client.
//!
//! The client talks to a stub service on an ephemeral port, covering the
//! request it sends and how each kind of answer maps to a result.

mod common;

use std::time::Duration;

use axum::http::{Method, StatusCode};
use ess_rest::error::FormattingError;
use ess_rest::formatting::FormatRequest;
use ess_rest::{OpenFormatClient, RecordFormatter};

use common::fixtures::marc_record;
use common::stub_format::StubFormatService;

fn request(document: String) -> FormatRequest {
    FormatRequest {
        document,
        output_format: "netpunkt_standard".to_string(),
        identifier: "base: 870970-12345".to_string(),
        tracking_id: "track-42".to_string(),
    }
}

fn client(url: &str) -> OpenFormatClient {
    OpenFormatClient::new(url, Duration::from_secs(5)).expect("Failed to create client")
}

#[tokio::test]
async fn test_posts_document_with_format_parameters() {
    let service = StubFormatService::start().await;
    service.respond_with(StatusCode::OK, "<netpunkt>ok</netpunkt>");
    let document = marc_record(Some("870970-12345"), "Hobbitten");

    client(service.url())
        .format(&request(document.clone()))
        .await
        .unwrap();

    let calls = service.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.method, Method::POST);
    assert_eq!(call.path, "/format");
    assert_eq!(call.body, document);
    assert_eq!(call.content_type.as_deref(), Some("application/xml"));
    assert_eq!(call.param("outputFormat"), Some("netpunkt_standard"));
    assert_eq!(call.param("id"), Some("base: 870970-12345"));
    assert_eq!(call.param("trackingId"), Some("track-42"));
}

#[tokio::test]
async fn test_reply_is_returned_without_declaration() {
    let service = StubFormatService::start().await;
    service.respond_with(
        StatusCode::OK,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<dkabm:record xmlns:dkabm="http://biblstandard.dk/abm/namespace/dkabm/"><dkabm:title>Hobbitten</dkabm:title></dkabm:record>"#,
    );

    let formatted = client(service.url())
        .format(&request("<record/>".to_string()))
        .await
        .unwrap();

    assert!(formatted.starts_with("<dkabm:record"), "{}", formatted);
    assert!(!formatted.contains("<?xml"));
    assert!(formatted.contains("<dkabm:title>Hobbitten</dkabm:title>"));
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let service = StubFormatService::start().await;
    service.respond_with(StatusCode::INTERNAL_SERVER_ERROR, "<error/>");

    let err = client(service.url())
        .format(&request("<record/>".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, FormattingError::Status { status: 500 }), "{:?}", err);
}

#[tokio::test]
async fn test_garbage_reply_is_malformed_output() {
    let service = StubFormatService::start().await;
    service.respond_with(StatusCode::OK, "this is not xml");

    let err = client(service.url())
        .format(&request("<record/>".to_string()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, FormattingError::MalformedOutput { .. }),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_unreachable_service_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{}/format", addr))
        .format(&request("<record/>".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, FormattingError::Transport(_)), "{:?}", err);
}
