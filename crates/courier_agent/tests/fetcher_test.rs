//! Tests for the HTTP content fetcher against a mock generation service.

use courier_agent::{ContentSource, HttpContentFetcher};
use courier_error::{FetchErrorKind, RetryableError};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/next"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

fn fetcher(server: &MockServer) -> HttpContentFetcher {
    HttpContentFetcher::new(format!("{}/next", server.uri()), Duration::from_millis(500))
        .expect("Client builds")
}

#[tokio::test]
async fn test_plain_text_body() {
    let server = serve(ResponseTemplate::new(200).set_body_string("Hello forum\n")).await;

    let item = fetcher(&server).fetch_content().await.expect("Fetched");

    assert!(item.title().is_none());
    assert_eq!(item.body(), "Hello forum");
}

#[tokio::test]
async fn test_structured_body() {
    let server = serve(ResponseTemplate::new(200).set_body_json(json!({
        "topic": "Release notes",
        "forumPost": "Version 2 is out."
    })))
    .await;

    let item = fetcher(&server).fetch_content().await.expect("Fetched");

    assert_eq!(item.title().as_deref(), Some("Release notes"));
    assert_eq!(item.body(), "Version 2 is out.");
}

#[tokio::test]
async fn test_empty_body_is_invalid() {
    let server = serve(ResponseTemplate::new(200).set_body_string("   ")).await;

    let err = fetcher(&server).fetch_content().await.unwrap_err();

    assert!(matches!(err.kind, FetchErrorKind::InvalidPayload(_)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_server_error_is_unreachable() {
    let server = serve(ResponseTemplate::new(503)).await;

    let err = fetcher(&server).fetch_content().await.unwrap_err();

    assert!(matches!(err.kind, FetchErrorKind::Unreachable(_)));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_rate_limit_is_unreachable() {
    let server = serve(ResponseTemplate::new(429)).await;

    let err = fetcher(&server).fetch_content().await.unwrap_err();

    assert!(matches!(err.kind, FetchErrorKind::Unreachable(_)));
}

#[tokio::test]
async fn test_client_error_is_invalid() {
    let server = serve(ResponseTemplate::new(404)).await;

    let err = fetcher(&server).fetch_content().await.unwrap_err();

    assert!(matches!(err.kind, FetchErrorKind::InvalidPayload(_)));
}

#[tokio::test]
async fn test_slow_service_times_out() {
    let server = serve(
        ResponseTemplate::new(200)
            .set_body_string("late")
            .set_delay(Duration::from_secs(2)),
    )
    .await;

    let err = fetcher(&server).fetch_content().await.unwrap_err();

    assert!(matches!(err.kind, FetchErrorKind::Unreachable(_)));
}
