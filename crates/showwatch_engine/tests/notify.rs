use std::time::Duration;

use serde_json::json;
use showwatch_core::{ChatMessage, LinkButton};
use showwatch_engine::{
    CallTrigger, ChatNotifier, DeliveryError, TelegramNotifier, TelegramSettings,
    WebhookCallTrigger,
};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn message() -> ChatMessage {
    ChatMessage {
        text: "🎬 *ALERT*".to_string(),
        parse_mode: "Markdown".to_string(),
        buttons: vec![LinkButton {
            text: "🎟️ Book Now".to_string(),
            url: "https://in.bookmyshow.com/buytickets/x".to_string(),
        }],
    }
}

fn telegram(server: &MockServer) -> TelegramNotifier {
    let settings = TelegramSettings {
        api_base: server.uri(),
        ..TelegramSettings::new("123:secret", "-10042")
    };
    TelegramNotifier::new(settings).unwrap()
}

#[tokio::test]
async fn telegram_posts_markdown_with_book_now_button() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/bot123:secret/sendMessage"))
        .and(body_json(json!({
            "chat_id": "-10042",
            "text": "🎬 *ALERT*",
            "parse_mode": "Markdown",
            "reply_markup": {
                "inline_keyboard": [[
                    { "text": "🎟️ Book Now", "url": "https://in.bookmyshow.com/buytickets/x" }
                ]]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "result": {} })))
        .expect(1)
        .mount(&server)
        .await;

    telegram(&server).send_message(&message()).await.unwrap();
}

#[tokio::test]
async fn telegram_rejection_carries_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "ok": false,
            "error_code": 400,
            "description": "Bad Request: chat not found"
        })))
        .mount(&server)
        .await;

    let err = telegram(&server).send_message(&message()).await.unwrap_err();
    assert_eq!(
        err,
        DeliveryError::Rejected("Bad Request: chat not found".to_string())
    );
}

#[tokio::test]
async fn telegram_non_json_error_is_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = telegram(&server).send_message(&message()).await.unwrap_err();
    assert_eq!(err, DeliveryError::HttpStatus(502));
}

#[tokio::test]
async fn telegram_errors_do_not_leak_token() {
    // Nothing listens on port 9; the request fails before any response.
    let settings = TelegramSettings {
        api_base: "http://127.0.0.1:9".to_string(),
        timeout: Duration::from_secs(2),
        ..TelegramSettings::new("123:secret", "-10042")
    };
    let err = TelegramNotifier::new(settings)
        .unwrap()
        .send_message(&message())
        .await
        .unwrap_err();
    assert!(matches!(err, DeliveryError::Request(_)));
    assert!(!err.to_string().contains("secret"), "{err}");
}

#[tokio::test]
async fn webhook_posts_value1() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/trigger/call/with/key/abc"))
        .and(body_json(json!({ "value1": "Devara" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("Congratulations!"))
        .expect(1)
        .mount(&server)
        .await;

    let trigger = WebhookCallTrigger::new(
        format!("{}/trigger/call/with/key/abc", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap();
    trigger.trigger_call("Devara").await.unwrap();
}

#[tokio::test]
async fn webhook_error_status_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid key"))
        .mount(&server)
        .await;

    let trigger = WebhookCallTrigger::new(server.uri(), Duration::from_secs(5)).unwrap();
    let err = trigger.trigger_call("Devara").await.unwrap_err();
    assert_eq!(err, DeliveryError::HttpStatus(401));
}

#[test]
fn webhook_rejects_invalid_endpoint() {
    assert!(WebhookCallTrigger::new("::nope::", Duration::from_secs(5)).is_err());
}
