//! Integration tests for Telegram delivery

use pivotwatch::services::notifier::{Notifier, NotifyError, TelegramNotifier};
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn sends_message_to_chat() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .and(body_json(json!({ "chat_id": 42, "text": "hello" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
        .expect(1)
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::with_client(server.uri(), "test-token", reqwest::Client::new());
    notifier.send(42, "hello").await.expect("delivered");
}

#[tokio::test]
async fn rejected_message_surfaces_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bottest-token/sendMessage"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "ok": false,
            "error_code": 403,
            "description": "Forbidden: bot was blocked by the user"
        })))
        .mount(&server)
        .await;

    let notifier = TelegramNotifier::with_client(server.uri(), "test-token", reqwest::Client::new());
    match notifier.send(7, "hi").await {
        Err(NotifyError::Rejected { status, description }) => {
            assert_eq!(status, 403);
            assert!(description.contains("blocked"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
}
