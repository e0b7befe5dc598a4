//! Discord relay tests against a local webhook mock.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use gomibi_core::{
    CollectionScheduleCalculator, Delivery, DeliveryStatus, EraTable, NotificationWindow,
    NotifyOutcome, NotifyService, RelayError, RelayPort, WebhookTarget,
};
use gomibi_relay_discord::{DiscordRelay, relay};
use reqwest::Client;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const HOOK_PATH: &str = "/api/webhooks/42/secret";

fn endpoint(server: &MockServer) -> WebhookTarget {
    let url = Url::parse(&format!("{}{HOOK_PATH}", server.uri())).expect("mock url");
    WebhookTarget::Endpoint(url)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[tokio::test]
async fn posts_content_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({ "content": "hello" })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let relay = DiscordRelay::new(Client::new(), endpoint(&server));
    let delivery = relay.send("hello").await.expect("delivered");

    assert_eq!(delivery, Delivery::Sent { status: 204 });
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "You are being rate limited." })),
        )
        .mount(&server)
        .await;

    let relay = DiscordRelay::new(Client::new(), endpoint(&server));
    let err = relay.send("hello").await.expect_err("rejected");

    match err {
        RelayError::Status { status, body } => {
            assert_eq!(status, 429);
            assert!(body.contains("rate limited"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn unconfigured_target_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let relay = DiscordRelay::new(Client::new(), WebhookTarget::Unconfigured);
    let delivery = relay.send("hello").await.expect("skip is not an error");

    assert_eq!(delivery, Delivery::NotConfigured);
}

#[tokio::test]
async fn invalid_target_is_an_error() {
    let target = WebhookTarget::parse("https://example.com/not-a-webhook");
    let relay = DiscordRelay::new(Client::new(), target);

    let err = relay.send("hello").await.expect_err("invalid endpoint");

    assert!(matches!(err, RelayError::InvalidEndpoint(_)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_network_error() {
    // Nothing listens on port 1.
    let url = Url::parse(&format!("http://127.0.0.1:1{HOOK_PATH}")).expect("url");
    let target = WebhookTarget::Endpoint(url);

    let relay = DiscordRelay::new(Client::new(), target);
    let err = relay.send("hello").await.expect_err("connection refused");

    assert!(matches!(err, RelayError::Network(_)));
    let shown = err.to_string();
    assert!(!shown.contains("secret"), "webhook token leaked: {shown}");
    assert!(!shown.contains(HOOK_PATH), "webhook path leaked: {shown}");
}

#[tokio::test]
async fn timeout_error_hides_webhook_token() {
    let target = WebhookTarget::parse("https://discord.com/api/webhooks/1/SUPERSECRETTOKEN");
    let client = Client::builder()
        .timeout(Duration::from_millis(1))
        .build()
        .expect("client");

    let relay = DiscordRelay::new(client, target);
    let err = relay.send("hello").await.expect_err("timed out");

    assert!(matches!(err, RelayError::Network(_)));
    assert!(!err.to_string().contains("SUPERSECRETTOKEN"));
    assert!(!format!("{err:?}").contains("SUPERSECRETTOKEN"));
}

#[tokio::test]
async fn service_posts_morning_notification() {
    let server = MockServer::start().await;

    let expected = "今日は燃えるごみの回収日です。\n\
        さらに情報は http://saga.5374.jp/ で確認できます。\n\
        詳細はこちらをご覧ください: https://www.city.saga.lg.jp/site_files/file/2025/202503/p1imh8o2fr1o401dob41qscd378.pdf\n";

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(body_json(json!({ "content": expected })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let service = NotifyService::new(
        CollectionScheduleCalculator::default(),
        EraTable::saga_default(),
        NotificationWindow::default(),
        relay(Client::new(), endpoint(&server)),
    );

    let now = date(2025, 4, 7).and_time(NaiveTime::from_hms_opt(6, 30, 0).expect("valid time"));
    let outcome = service.run(now, None).await;

    assert!(matches!(
        outcome,
        NotifyOutcome::Delivered {
            status: DeliveryStatus::Sent,
            ..
        }
    ));
}

#[tokio::test]
async fn digest_keeps_going_after_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let discord: Arc<dyn RelayPort> = relay(Client::new(), endpoint(&server));
    let service = NotifyService::new(
        CollectionScheduleCalculator::default(),
        EraTable::saga_default(),
        NotificationWindow::default(),
        discord,
    );

    let report = service
        .digest(date(2025, 4, 1), 7, Duration::from_millis(10))
        .await;

    assert_eq!(report.total, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.sent, 3);

    let received = server.received_requests().await.expect("recording enabled");
    assert_eq!(received.len(), 4);
}
