//! Webhook transport tests against a local HTTP server.
//!
//! Spins up a real axum listener on a loopback port and checks signing,
//! outcome classification, and timeout handling.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use assert_matches::assert_matches;
use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use relay_core::scope::EventScope;
use relay_core::signing::{verify_signature, SIGNATURE_HEADER};
use relay_engine::transport::{EventEnvelope, Outcome, WebhookTransport};

const SECRET: &str = "s3cret";

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Body and signature captured by the receiving handler.
#[derive(Default, Clone)]
struct Captured {
    inner: Arc<Mutex<Option<(String, Vec<u8>)>>>,
}

impl Captured {
    fn take(&self) -> Option<(String, Vec<u8>)> {
        self.inner.lock().unwrap().take()
    }
}

async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn envelope() -> EventEnvelope {
    EventEnvelope {
        event_id: 42,
        event_type: "project:created".to_string(),
        timestamp: chrono::Utc::now(),
        scope: EventScope {
            project_uuid: Some("11111111-1111-1111-1111-111111111111".to_string()),
            ..Default::default()
        },
        payload: serde_json::json!({"name": "demo"}),
    }
}

fn transport() -> WebhookTransport {
    WebhookTransport::new(Duration::from_secs(1)).unwrap()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn delivers_signed_body() {
    let captured = Captured::default();
    let handler_capture = captured.clone();
    let app = Router::new().route(
        "/hook",
        post(move |headers: HeaderMap, body: Bytes| {
            let captured = handler_capture.clone();
            async move {
                let signature = headers
                    .get(SIGNATURE_HEADER)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                *captured.inner.lock().unwrap() = Some((signature, body.to_vec()));
                StatusCode::NO_CONTENT
            }
        }),
    );
    let base = spawn_server(app).await;

    let outcome = transport()
        .send(&format!("{base}/hook"), SECRET, true, &envelope())
        .await;
    assert_matches!(
        outcome,
        Outcome::Success {
            status_code: Some(204)
        }
    );

    // The receiver can authenticate the body with the shared secret.
    let (signature, body) = captured.take().unwrap();
    assert!(verify_signature(SECRET, &body, &signature));
    assert!(!verify_signature("wrong", &body, &signature));

    let decoded: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(decoded["event_id"], 42);
    assert_eq!(decoded["type"], "project:created");
    assert_eq!(
        decoded["scope"]["project_uuid"],
        "11111111-1111-1111-1111-111111111111"
    );
    assert_eq!(decoded["payload"]["name"], "demo");
}

#[tokio::test]
async fn server_error_is_transient() {
    let app = Router::new().route(
        "/hook",
        post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    );
    let base = spawn_server(app).await;

    let outcome = transport()
        .send(&format!("{base}/hook"), SECRET, true, &envelope())
        .await;
    assert_matches!(outcome, Outcome::Transient { reason } if reason == "HTTP 500");
}

#[tokio::test]
async fn too_many_requests_is_transient() {
    let app = Router::new().route("/hook", post(|| async { StatusCode::TOO_MANY_REQUESTS }));
    let base = spawn_server(app).await;

    let outcome = transport()
        .send(&format!("{base}/hook"), SECRET, true, &envelope())
        .await;
    assert_matches!(outcome, Outcome::Transient { reason } if reason == "HTTP 429");
}

#[tokio::test]
async fn client_error_is_permanent() {
    let app = Router::new().route("/hook", post(|| async { StatusCode::NOT_FOUND }));
    let base = spawn_server(app).await;

    let outcome = transport()
        .send(&format!("{base}/hook"), SECRET, true, &envelope())
        .await;
    assert_matches!(outcome, Outcome::Permanent { reason } if reason == "HTTP 404");
}

#[tokio::test]
async fn unreachable_host_is_transient() {
    // Nothing listens on this port.
    let outcome = transport()
        .send("http://127.0.0.1:1/hook", SECRET, true, &envelope())
        .await;
    assert_matches!(outcome, Outcome::Transient { .. });
}

#[tokio::test]
async fn slow_endpoint_times_out_as_transient() {
    let app = Router::new().route(
        "/hook",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            StatusCode::OK
        }),
    );
    let base = spawn_server(app).await;

    // 1 s client timeout against a 5 s handler.
    let outcome = transport()
        .send(&format!("{base}/hook"), SECRET, true, &envelope())
        .await;
    assert_matches!(outcome, Outcome::Transient { .. });
}
