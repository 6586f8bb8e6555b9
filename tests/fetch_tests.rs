//! Fetcher behavior against a local socket serving canned HTTP responses.

use secfacts::core::config::EngineConfig;
use secfacts::edgar::fetch::{EdgarClient, EdgarError};
use std::net::SocketAddr;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn serve_statuses(responses: Vec<(&'static str, &'static str)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        for (status, body) in responses {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });

    addr
}

fn test_config() -> EngineConfig {
    EngineConfig {
        use_cache: false,
        max_attempts: 4,
        retry_delay_ms: 10,
        ..EngineConfig::default()
    }
}

#[tokio::test]
async fn returns_payload_after_transient_failures() {
    let addr = serve_statuses(vec![
        ("503 Service Unavailable", ""),
        ("503 Service Unavailable", ""),
        ("200 OK", "payload"),
    ])
    .await;

    let client = EdgarClient::new(&test_config()).unwrap();
    let bytes = client.fetch(&format!("http://{}/doc", addr)).await.unwrap();
    assert_eq!(bytes, b"payload");
}

#[tokio::test]
async fn not_found_fails_immediately_without_retry() {
    // Only one response is served; a retry would hang on the dead listener.
    let addr = serve_statuses(vec![("404 Not Found", "")]).await;

    let client = EdgarClient::new(&test_config()).unwrap();
    let err = client
        .fetch(&format!("http://{}/missing", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, EdgarError::Permanent(404)));
}

#[tokio::test]
async fn exhausted_retries_surface_a_transient_error() {
    let addr = serve_statuses(vec![
        ("503 Service Unavailable", ""),
        ("503 Service Unavailable", ""),
        ("503 Service Unavailable", ""),
        ("503 Service Unavailable", ""),
    ])
    .await;

    let client = EdgarClient::new(&test_config()).unwrap();
    let err = client
        .fetch(&format!("http://{}/doc", addr))
        .await
        .unwrap_err();
    assert!(err.is_transient());
    assert!(matches!(
        err,
        EdgarError::Transient {
            status: 503,
            attempts: 4
        }
    ));
}

#[tokio::test]
async fn fetched_but_empty_is_success_not_failure() {
    let addr = serve_statuses(vec![("200 OK", "")]).await;

    let client = EdgarClient::new(&test_config()).unwrap();
    let bytes = client.fetch(&format!("http://{}/doc", addr)).await.unwrap();
    assert!(bytes.is_empty());
}
