//! Tests for the HTTP client against a mockito server

use super::*;
use shortener_bench_core::{
    RequestRecord, ServiceClient, ServiceError, TransportConfig, VerificationFailure,
    VerificationOutcome, Verifier,
};

use mockito::{Matcher, Server};
use serde_json::json;
use std::sync::Arc;

// ============================================================================
// Helper functions
// ============================================================================

fn client_for(server: &Server) -> HttpServiceClient {
    HttpServiceClient::new(&format!("{}/api/v1", server.url()), &TransportConfig::default())
        .expect("Failed to build client")
}

async fn mock_round_trip(server: &mut Server, original: &str, shortened: &str) {
    server
        .mock("POST", "/api/v1/encode")
        .match_header("content-type", "application/json")
        .match_body(Matcher::Json(json!({ "originalUrl": original })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "shortenedUrl": shortened }).to_string())
        .create_async()
        .await;

    server
        .mock("GET", "/api/v1/decode")
        .match_query(Matcher::UrlEncoded(
            "shortenedUrl".into(),
            shortened.into(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "originalUrl": original }).to_string())
        .create_async()
        .await;
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[tokio::test]
async fn test_transform_posts_original_url() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v1/encode")
        .match_body(Matcher::Json(json!({ "originalUrl": "http://mydomain.com/test0" })))
        .with_status(200)
        .with_body(r#"{"shortenedUrl":"http://mydomain.com/test0abc123"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let shortened = client
        .transform("http://mydomain.com/test0")
        .await
        .expect("transform failed");

    assert_eq!(shortened, "http://mydomain.com/test0abc123");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_inverse_sends_encoded_query() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v1/decode")
        .match_query(Matcher::UrlEncoded(
            "shortenedUrl".into(),
            "http://mydomain.com/test0abc123".into(),
        ))
        .with_status(200)
        .with_body(r#"{"originalUrl":"http://mydomain.com/test0"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let original = client
        .inverse("http://mydomain.com/test0abc123")
        .await
        .expect("inverse failed");

    assert_eq!(original, "http://mydomain.com/test0");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_200_is_status_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/encode")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;
    server
        .mock("GET", "/api/v1/decode")
        .match_query(Matcher::Any)
        .with_status(404)
        .create_async()
        .await;

    let client = client_for(&server);

    let err = client.transform("http://mydomain.com/test1").await.unwrap_err();
    assert_eq!(err, ServiceError::Status { code: 500 });
    assert!(err.is_availability());

    let err = client.inverse("http://mydomain.com/nope").await.unwrap_err();
    assert_eq!(err, ServiceError::Status { code: 404 });
}

#[tokio::test]
async fn test_created_is_not_success() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/encode")
        .with_status(201)
        .with_body(r#"{"shortenedUrl":"http://mydomain.com/test1abc123"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.transform("http://mydomain.com/test1").await.unwrap_err();
    assert_eq!(err, ServiceError::Status { code: 201 });
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let mut server = Server::new_async().await;
    server
        .mock("POST", "/api/v1/encode")
        .with_status(200)
        .with_body(r#"{"somethingElse":"x"}"#)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.transform("http://mydomain.com/test2").await.unwrap_err();

    assert!(matches!(err, ServiceError::Decode { .. }));
    assert!(!err.is_availability());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    // Nothing listens on port 1
    let client = HttpServiceClient::new("http://127.0.0.1:1/api/v1", &TransportConfig::default())
        .expect("Failed to build client");

    let err = client.transform("http://mydomain.com/test3").await.unwrap_err();
    assert!(matches!(err, ServiceError::Transport { .. }));
}

// ============================================================================
// Round-trip Tests
// ============================================================================

#[tokio::test]
async fn test_round_trip_literal_inputs() {
    for (original, shortened) in [
        ("http://mydomain.com/test0", "http://mydomain.com/test0Ab3dE9"),
        ("http://mydomain.com/test9999", "http://mydomain.com/test9999zZ0aB1"),
        (
            "http://mydomain.com/test?q=a b&x=1#frag",
            "http://mydomain.com/test?q=a b&x=1#fragq1W2e3",
        ),
    ] {
        let mut server = Server::new_async().await;
        mock_round_trip(&mut server, original, shortened).await;

        let client: Arc<dyn ServiceClient> = Arc::new(client_for(&server));
        let verifier = Verifier::new(Arc::clone(&client));
        let record = RequestRecord::new(original, 6);

        let transformed = client.transform(original).await.expect("transform failed");
        let outcome = verifier
            .verify(&record, &transformed)
            .await
            .expect("inverse call faulted");

        assert_eq!(outcome, VerificationOutcome::Passed, "input {original}");
    }
}

#[tokio::test]
async fn test_round_trip_detects_wrong_original() {
    let mut server = Server::new_async().await;
    mock_round_trip(
        &mut server,
        "http://mydomain.com/test7",
        "http://mydomain.com/test7abcdef",
    )
    .await;

    let client: Arc<dyn ServiceClient> = Arc::new(client_for(&server));
    let verifier = Verifier::new(client);
    // The server answers for test7 but the record claims test8
    let record = RequestRecord::with_expected_length("http://mydomain.com/test8", 31);

    let outcome = verifier
        .verify(&record, "http://mydomain.com/test7abcdef")
        .await
        .expect("inverse call faulted");

    match outcome {
        VerificationOutcome::Failed(VerificationFailure::RoundTrip { recovered, .. }) => {
            assert_eq!(recovered.as_deref(), Some("http://mydomain.com/test7"));
        }
        other => panic!("expected round-trip failure, got {other:?}"),
    }
}
