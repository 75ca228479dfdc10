use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use alertmanager_gotify_bridge::{
    config::{Config, GotifyConfig},
    server::Server,
    sinks::{GotifyClient, GotifyMessage, Notifier},
    Error, Result,
};
use async_trait::async_trait;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use axum_test::TestServer;
use chrono::{DateTime, Local};
use serde_json::json;

#[derive(Debug, Clone)]
struct Received {
    token: Option<String>,
    content_type: Option<String>,
    message: GotifyMessage,
}

type Inbox = Arc<Mutex<Vec<Received>>>;

async fn gotify_message(
    State(inbox): State<Inbox>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(message): Json<GotifyMessage>,
) -> StatusCode {
    // Anything titled `Slow` answers long after any test client has given up.
    if message.title.contains("Slow") {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        return StatusCode::OK;
    }
    inbox.lock().unwrap().push(Received {
        token: query.get("token").cloned(),
        content_type: headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
        message,
    });
    StatusCode::OK
}

/// Starts a stand-in Gotify on an ephemeral port and returns its base URL.
async fn spawn_gotify() -> (String, Inbox) {
    let inbox: Inbox = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/message", post(gotify_message))
        .with_state(inbox.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), inbox)
}

fn gotify_config(url: &str) -> GotifyConfig {
    GotifyConfig {
        url: url.to_string(),
        token: "test-token".to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn local(raw: &str) -> String {
    DateTime::parse_from_rfc3339(raw)
        .unwrap()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

fn bridge(notifier: Arc<dyn Notifier>) -> TestServer {
    let app = Server::new(&Config::default(), notifier).build_router();
    TestServer::new(app).unwrap()
}

/// Fails anything titled with `Unreachable`, sends the rest for real.
struct FlakyNotifier {
    inner: GotifyClient,
    attempts: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for FlakyNotifier {
    async fn send(&self, message: &GotifyMessage) -> Result<u16> {
        self.attempts.lock().unwrap().push(message.title.clone());
        if message.title.contains("Unreachable") {
            return Err(Error::Delivery("connection refused".to_string()));
        }
        self.inner.send(message).await
    }
}

#[tokio::test]
async fn test_firing_alert_is_forwarded() {
    let (url, inbox) = spawn_gotify().await;
    let server = bridge(Arc::new(GotifyClient::new(&gotify_config(&url))));

    let response = server
        .post("/webhook")
        .json(&json!({
            "status": "firing",
            "alerts": [{
                "status": "firing",
                "labels": {"alertname": "HighCPU", "severity": "critical"},
                "annotations": {"summary": "CPU high", "description": "CPU > 90%"},
                "startsAt": "2024-01-01T10:00:00Z",
                "endsAt": "0001-01-01T00:00:00Z"
            }]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");

    let received = inbox.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].token.as_deref(), Some("test-token"));
    assert_eq!(received[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(received[0].message.title, "[critical] HighCPU (FIRING)");
    assert_eq!(received[0].message.priority, 8);
    assert_eq!(
        received[0].message.message,
        format!("CPU high\nCPU > 90%\nTriggered: {}", local("2024-01-01T10:00:00Z"))
    );
}

#[tokio::test]
async fn test_alert_without_labels_uses_defaults() {
    let (url, inbox) = spawn_gotify().await;
    let server = bridge(Arc::new(GotifyClient::new(&gotify_config(&url))));

    let response = server
        .post("/webhook")
        .json(&json!({
            "status": "firing",
            "alerts": [{"status": "firing", "startsAt": "2024-01-01T10:00:00Z"}]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let received = inbox.lock().unwrap().clone();
    assert_eq!(received[0].message.title, "[unknown] unknown (FIRING)");
    assert_eq!(received[0].message.priority, 5);
    assert_eq!(
        received[0].message.message,
        format!("no summary\nno details\nTriggered: {}", local("2024-01-01T10:00:00Z"))
    );
}

#[tokio::test]
async fn test_malformed_payload_is_rejected() {
    let (url, inbox) = spawn_gotify().await;
    let server = bridge(Arc::new(GotifyClient::new(&gotify_config(&url))));

    let response = server.post("/webhook").text("this is not json").await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(response.text().contains("Decode error"));
    assert!(inbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_one_failed_delivery_does_not_block_the_next() {
    let (url, inbox) = spawn_gotify().await;
    let notifier = Arc::new(FlakyNotifier {
        inner: GotifyClient::new(&gotify_config(&url)),
        attempts: Mutex::new(Vec::new()),
    });
    let server = bridge(notifier.clone());

    let response = server
        .post("/webhook")
        .json(&json!({
            "status": "firing",
            "alerts": [
                {"status": "firing", "labels": {"alertname": "Unreachable"}},
                {"status": "firing", "labels": {"alertname": "DiskFull", "severity": "warning"}}
            ]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");
    assert_eq!(notifier.attempts.lock().unwrap().len(), 2);

    let received = inbox.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message.title, "[warning] DiskFull (FIRING)");
}

#[tokio::test]
async fn test_send_times_out_as_delivery_error() {
    let (url, inbox) = spawn_gotify().await;
    let mut config = gotify_config(&url);
    config.timeout = Duration::from_millis(100);
    let client = GotifyClient::new(&config);

    let slow = GotifyMessage {
        title: "[warning] SlowDisk (FIRING)".to_string(),
        message: "m".to_string(),
        priority: 5,
    };
    match client.send(&slow).await {
        Err(Error::Delivery(msg)) => assert!(msg.contains("timed out")),
        other => panic!("expected delivery error, got {:?}", other),
    }
    assert!(inbox.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_timed_out_alert_does_not_block_the_next() {
    let (url, inbox) = spawn_gotify().await;
    let mut config = gotify_config(&url);
    config.timeout = Duration::from_millis(100);
    let server = bridge(Arc::new(GotifyClient::new(&config)));

    let response = server
        .post("/webhook")
        .json(&json!({
            "status": "firing",
            "alerts": [
                {"status": "firing", "labels": {"alertname": "SlowDisk"}},
                {"status": "firing", "labels": {"alertname": "HighCPU", "severity": "critical"}}
            ]
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");

    let received = inbox.lock().unwrap().clone();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].message.title, "[critical] HighCPU (FIRING)");
}

#[tokio::test]
async fn test_resolved_alert_reports_resolution_time() {
    let (url, inbox) = spawn_gotify().await;
    let server = bridge(Arc::new(GotifyClient::new(&gotify_config(&url))));

    server
        .post("/webhook")
        .json(&json!({
            "status": "resolved",
            "alerts": [{
                "status": "resolved",
                "labels": {"alertname": "HighCPU", "severity": "info"},
                "annotations": {"summary": "CPU back to normal"},
                "startsAt": "2024-01-01T10:00:00Z",
                "endsAt": "2024-01-01T10:45:00Z"
            }]
        }))
        .await;

    let received = inbox.lock().unwrap().clone();
    assert_eq!(received[0].message.title, "[info] HighCPU (RESOLVED)");
    assert_eq!(received[0].message.priority, 3);
    assert!(received[0]
        .message
        .message
        .ends_with(&format!("Resolved: {}", local("2024-01-01T10:45:00Z"))));
}

#[tokio::test]
async fn test_gotify_down_still_acknowledges() {
    // Nothing listens on the discard port.
    let server = bridge(Arc::new(GotifyClient::new(&gotify_config("http://127.0.0.1:9"))));

    let response = server
        .post("/webhook")
        .json(&json!({"status": "firing", "alerts": [{"status": "firing"}]}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.text(), "ok");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (url, _inbox) = spawn_gotify().await;
    let server = bridge(Arc::new(GotifyClient::new(&gotify_config(&url))));

    server
        .post("/webhook")
        .json(&json!({"status": "firing", "alerts": [{"status": "firing"}]}))
        .await;

    let response = server.get("/metrics").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let text = response.text();
    assert!(text.contains("alertbridge_alerts_received_total"));
    assert!(text.contains("alertbridge_notifications_total{outcome=\"delivered\"}"));
}
