//! Webhook delivery against a mock endpoint.

use outage_core::RenderedMessage;
use outage_notify::{Notifier, NotifyError, WebhookConfig, WebhookNotifier};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message() -> RenderedMessage {
    RenderedMessage {
        subject: "DEDDIE Power Outage Updates".to_string(),
        text: "ΝΕΕΣ ΔΙΑΚΟΠΕΣ ΔΕΔΔΗΕ\n1. Αχαΐας | NE_ID: 0205".to_string(),
        html: Some("<html></html>".to_string()),
    }
}

#[tokio::test]
async fn test_webhook_posts_title_and_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .and(body_json(json!({
            "title": "DEDDIE Power Outage Updates",
            "text": "ΝΕΕΣ ΔΙΑΚΟΠΕΣ ΔΕΔΔΗΕ\n1. Αχαΐας | NE_ID: 0205",
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(WebhookConfig::new(format!("{}/hook", server.uri()))).unwrap();
    assert_eq!(notifier.name(), "webhook");
    notifier.send(&message()).await.unwrap();
}

#[tokio::test]
async fn test_webhook_rejection_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/hook"))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let notifier = WebhookNotifier::new(WebhookConfig::new(format!("{}/hook", server.uri()))).unwrap();
    let err = notifier.send(&message()).await.unwrap_err();
    match err {
        NotifyError::Rejected { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}
