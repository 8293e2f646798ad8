//! Common test utilities for hook-runner integration tests
//!
//! This module provides:
//! - A recording callback to observe dispatched events
//! - Independent HMAC signing of request bodies
//! - Request builders and response helpers

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use hmac::{Hmac, Mac};
use hook_runner_core::{Event, EventCallback};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

// ============================================================================
// Recording callback
// ============================================================================

/// One callback invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct RecordedEvent {
    pub delivery_id: String,
    pub event_type: String,
}

/// Callback that records every event it receives.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct RecordingCallback {
    calls: Arc<Mutex<Vec<RecordedEvent>>>,
}

impl RecordingCallback {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> Vec<RecordedEvent> {
        self.calls.lock().unwrap().clone()
    }

    #[allow(dead_code)]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl EventCallback for RecordingCallback {
    async fn on_event(&self, delivery_id: &str, event: Box<dyn Event>) {
        self.calls.lock().unwrap().push(RecordedEvent {
            delivery_id: delivery_id.to_string(),
            event_type: event.event_type().to_string(),
        });
    }
}

// ============================================================================
// Signing
// ============================================================================

/// `X-Hub-Signature` value for `body`, computed without the crate under test.
#[allow(dead_code)]
pub fn github_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<sha1::Sha1>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    format!("sha1={}", hex::encode(mac.finalize().into_bytes()))
}

/// `X-Gitea-Signature` value for `body`, computed without the crate under test.
#[allow(dead_code)]
pub fn gitea_signature(secret: &str, body: &[u8]) -> String {
    let mut mac = Hmac::<sha2::Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

// ============================================================================
// Requests
// ============================================================================

/// POST request signed GitHub-style.
#[allow(dead_code)]
pub fn github_request(event_type: &str, delivery_id: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("x-github-event", event_type)
        .header("x-github-delivery", delivery_id)
        .header("x-hub-signature", github_signature(SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// POST request signed Gitea-style.
#[allow(dead_code)]
pub fn gitea_request(event_type: &str, delivery_id: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .header("x-github-event", event_type)
        .header("x-github-delivery", delivery_id)
        .header("x-gitea-signature", gitea_signature(SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Send `request` through `router` and collect status and body text.
#[allow(dead_code)]
pub async fn send(router: Router, request: Request<Body>) -> (StatusCode, String) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body: Bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// Minimal push payload for `owner/name` on `branch`.
#[allow(dead_code)]
pub fn push_payload(owner: &str, name: &str, branch: &str) -> String {
    serde_json::json!({
        "ref": format!("refs/heads/{branch}"),
        "before": "0000000000000000000000000000000000000000",
        "after": "d6fde92930d4715a2b49857d24b940956b26d2d3",
        "repository": {
            "name": name,
            "full_name": format!("{owner}/{name}"),
            "owner": { "name": owner, "login": owner }
        }
    })
    .to_string()
}
