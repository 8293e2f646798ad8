//! Tests for server startup and graceful shutdown.

use super::*;
use crate::dispatch::ActionDispatcher;
use hook_runner_core::SecretKey;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::oneshot;

fn test_router() -> Router {
    let handler = WebhookHandler::new(
        SecretKey::new("verysecret"),
        Arc::new(ActionDispatcher::default()),
    );
    build_router(handler)
}

async fn raw_request(addr: std::net::SocketAddr, request: &str) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream.write_all(request.as_bytes()).await.unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).await.unwrap();
    response
}

#[test]
fn test_exit_codes() {
    let bind = ServiceError::BindFailed {
        address: "0.0.0.0:80".to_string(),
        message: "permission denied".to_string(),
    };
    let server = ServiceError::ServerFailed {
        message: "boom".to_string(),
    };
    let config = ServiceError::Configuration(ConfigError::MissingVariable {
        name: "HOOK_RUNNER_SECRET".to_string(),
    });

    assert_eq!(bind.exit_code(), 1);
    assert_eq!(server.exit_code(), 2);
    assert_eq!(config.exit_code(), 3);
}

#[test]
fn test_display_address() {
    assert_eq!(display_address("0.0.0.0", 8080), "0.0.0.0:8080");
    assert_eq!(display_address("::1", 8080), "[::1]:8080");
}

#[tokio::test]
async fn test_bind_failure_is_reported() {
    let occupied = bind("127.0.0.1", 0).await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let err = bind("127.0.0.1", port).await.unwrap_err();

    match err {
        ServiceError::BindFailed { address, .. } => {
            assert_eq!(address, format!("127.0.0.1:{port}"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_serves_until_shutdown() {
    let listener = bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, test_router(), async move {
        let _ = stop_rx.await;
    }));

    let response = raw_request(
        addr,
        "GET /anything HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
    )
    .await;
    assert!(
        response.starts_with("HTTP/1.1 405"),
        "unexpected response: {response}"
    );
    assert!(response.ends_with("method not allowed"), "{response}");

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_unsigned_post_is_unauthorized() {
    let listener = bind("127.0.0.1", 0).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let server = tokio::spawn(serve(listener, test_router(), async move {
        let _ = stop_rx.await;
    }));

    let response = raw_request(
        addr,
        "POST / HTTP/1.1\r\nHost: localhost\r\nX-GitHub-Event: ping\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
    )
    .await;
    assert!(
        response.starts_with("HTTP/1.1 401"),
        "unexpected response: {response}"
    );

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();
}
