//! Integration tests for dd_client's HTTP API client.
//!
//! Tests network error handling against unreachable servers and request
//! shapes against a minimal local HTTP responder.

use dd_client::api_client::{ApiClient, Credentials};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Generate unique username for tests
fn unique_username(prefix: &str) -> String {
    let rand_id: u32 = rand::random();
    format!("{}_{}", prefix, rand_id % 100000)
}

/// A base URL nothing is listening on.
async fn closed_server_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

/// Answer exactly one HTTP request with `status` and `body`, returning the
/// raw request text.
async fn respond_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });
    (format!("http://{addr}"), handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

const GAME_JSON: &str = r#"{"id": "194659", "players": [1], "player1_score": 0, "player2_score": 0, "finished": false, "winner": null}"#;

// ============================================================================
// Network Error Scenario Tests
// ============================================================================

#[tokio::test]
async fn test_connection_refused() {
    let client = ApiClient::new(closed_server_url().await);

    let result = client.register(&unique_username("alice"), "password").await;

    assert!(result.is_err(), "Should fail when server is not available");
    let error_msg = result.unwrap_err().to_string();
    assert!(
        error_msg.contains("Failed to send register request"),
        "Error should indicate connection failure, got: {error_msg}"
    );
}

#[tokio::test]
async fn test_timeout_handling() {
    // Non-routable documentation address
    let client = ApiClient::new("http://192.0.2.1:80");

    let result = timeout(Duration::from_secs(3), client.create_game()).await;

    assert!(
        result.is_err() || result.unwrap().is_err(),
        "Should fail when connecting to unreachable host"
    );
}

#[tokio::test]
async fn test_malformed_url() {
    let client = ApiClient::new("not-a-valid-url");

    let result = client.register("testuser", "password").await;

    assert!(result.is_err(), "Should fail with malformed URL");
}

#[tokio::test]
async fn test_network_error_on_get_game() {
    let client = ApiClient::new(closed_server_url().await);

    let result = client.get_game("194659").await;

    assert!(result.is_err());
    assert!(result.unwrap_err().to_string().contains("Failed to fetch game"));
}

// ============================================================================
// Request / Response Tests
// ============================================================================

#[tokio::test]
async fn test_register_posts_credentials() {
    let (url, server) = respond_once(
        "201 Created",
        r#"{"id": 7, "username": "alice", "games": []}"#,
    )
    .await;
    let client = ApiClient::new(url);

    let user = client.register("alice", "hunter2").await.unwrap();
    assert_eq!(user.id, 7);
    assert_eq!(user.username, "alice");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/users/ HTTP/1.1"));
    assert!(request.contains(r#""username":"alice""#));
    assert!(request.contains(r#""password":"hunter2""#));
}

#[tokio::test]
async fn test_register_failure_reports_body() {
    let (url, server) = respond_once(
        "400 Bad Request",
        r#"{"username": ["A user with that username already exists."]}"#,
    )
    .await;
    let client = ApiClient::new(url);

    let err = client.register("alice", "hunter2").await.unwrap_err();
    assert!(err.to_string().contains("Registration failed"));
    assert!(err.to_string().contains("already exists"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_create_game_sends_basic_auth() {
    let (url, server) = respond_once("201 Created", GAME_JSON).await;
    let credentials = Credentials::new("alice", "secret");
    let client = ApiClient::new(url).with_credentials(credentials.clone());

    let game = client.create_game().await.unwrap();
    assert_eq!(game.id, "194659");
    assert!(!game.finished);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /api/games/ HTTP/1.1"));
    let auth_line = request
        .lines()
        .find(|line| line.to_ascii_lowercase().starts_with("authorization:"))
        .expect("authorization header");
    assert!(auth_line.ends_with(&credentials.basic_header()));
}

#[tokio::test]
async fn test_get_game_without_credentials() {
    let (url, server) = respond_once("200 OK", GAME_JSON).await;
    let client = ApiClient::new(url);

    let game = client.get_game("194659").await.unwrap();
    assert_eq!(game.players, vec![1]);

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /api/games/194659/ HTTP/1.1"));
    assert!(!request.to_ascii_lowercase().contains("authorization:"));
}

#[tokio::test]
async fn test_get_game_not_found() {
    let (url, server) = respond_once("404 Not Found", r#"{"detail": "Not found."}"#).await;
    let client = ApiClient::new(url);

    let err = client.get_game("000000").await.unwrap_err();
    assert!(err.to_string().contains("404"));
    server.await.unwrap();
}

// ============================================================================
// URL Tests
// ============================================================================

#[test]
fn test_websocket_url_matches_server_route() {
    let client = ApiClient::new("http://127.0.0.1:8000");
    let url = client.websocket_url("194659");
    assert_eq!(url, "ws://127.0.0.1:8000/ws/game/194659/");
    assert!(dice_duel::Session::new(dice_duel::Username::new("alice"), "194659", url).is_ok());
}
