//! HTTP behaviour of the outage client against a mock server.

use std::time::Duration;

use outage_source::{OutageClient, OutageSource, RetryConfig, SourceConfig, SourceError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> SourceConfig {
    SourceConfig::default()
        .with_endpoint(format!("{}/outages?nomarxiaki_enothta_id={{ne_id}}", server.uri()))
        .with_timeout(Duration::from_secs(5))
        .with_retry(RetryConfig {
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            ..RetryConfig::default()
        })
}

#[tokio::test]
async fn test_fetch_returns_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .and(query_param("nomarxiaki_enothta_id", "0205"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OutageClient::new(config_for(&server)).unwrap();
    let records = client.fetch("0205").await.unwrap();
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_fetch_retries_transient_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OutageClient::new(config_for(&server)).unwrap();
    let records = client.fetch("0205").await.unwrap();
    assert_eq!(records, vec![json!({"id": 7})]);
}

#[tokio::test]
async fn test_fetch_object_is_unexpected_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"})))
        .mount(&server)
        .await;

    let client = OutageClient::new(config_for(&server)).unwrap();
    let err = client.fetch("0205").await.unwrap_err();
    assert!(matches!(err, SourceError::UnexpectedShape { found: "object", .. }));
}

#[tokio::test]
async fn test_fetch_non_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let client = OutageClient::new(config_for(&server)).unwrap();
    let err = client.fetch("0205").await.unwrap_err();
    assert!(matches!(err, SourceError::Json { .. }));
}

#[tokio::test]
async fn test_non_200_body_is_still_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/outages"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = OutageClient::new(config_for(&server)).unwrap();
    assert!(client.fetch("0205").await.unwrap().is_empty());
}

#[test]
fn test_client_rejects_endpoint_without_placeholder() {
    let config = SourceConfig::default().with_endpoint("http://localhost/outages");
    assert!(matches!(OutageClient::new(config), Err(SourceError::Config(_))));
}
