//! HTTP API client for the dice game server.

use anyhow::{Context, Result};
use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};

/// Username and password sent as HTTP Basic auth.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Value for the `Authorization` header.
    pub fn basic_header(&self) -> String {
        let encoded = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {encoded}")
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// API client for communicating with the game server
pub struct ApiClient {
    base_url: String,
    client: reqwest::Client,
    credentials: Option<Credentials>,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub games: Vec<String>,
}

/// A game as stored by the server. Players and the winner are user ids.
#[derive(Debug, Deserialize)]
pub struct GameInfo {
    pub id: String,
    #[serde(default)]
    pub players: Vec<i64>,
    pub player1_score: i64,
    pub player2_score: i64,
    pub finished: bool,
    pub winner: Option<i64>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
            credentials: None,
        }
    }

    /// Authenticate every following request with HTTP Basic auth.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    fn authorised(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credentials {
            Some(credentials) => request.header("Authorization", credentials.basic_header()),
            None => request,
        }
    }

    /// Register a new user account
    pub async fn register(&self, username: &str, password: &str) -> Result<UserInfo> {
        let response = self
            .client
            .post(format!("{}/api/users/", self.base_url))
            .json(&RegisterRequest { username, password })
            .send()
            .await
            .context("Failed to send register request")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            anyhow::bail!("Registration failed: {error_text}");
        }

        response
            .json()
            .await
            .context("Failed to parse register response")
    }

    /// Create a new game owned by the authenticated user
    pub async fn create_game(&self) -> Result<GameInfo> {
        let response = self
            .authorised(self.client.post(format!("{}/api/games/", self.base_url)))
            .json(&serde_json::json!({}))
            .send()
            .await
            .context("Failed to send create game request")?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|e| format!("Failed to read error response: {e}"));
            anyhow::bail!("Creating a game failed: {error_text}");
        }

        response
            .json()
            .await
            .context("Failed to parse created game")
    }

    /// Fetch a game, e.g. for its final scores
    pub async fn get_game(&self, game_id: &str) -> Result<GameInfo> {
        let response = self
            .authorised(
                self.client
                    .get(format!("{}/api/games/{game_id}/", self.base_url)),
            )
            .send()
            .await
            .context("Failed to fetch game")?;

        if !response.status().is_success() {
            anyhow::bail!("Fetching game {game_id} failed: {}", response.status());
        }

        response.json().await.context("Failed to parse game")
    }

    /// Get the WebSocket URL for a game
    pub fn websocket_url(&self, game_id: &str) -> String {
        let ws_url = self
            .base_url
            .replacen("https://", "wss://", 1)
            .replacen("http://", "ws://", 1);
        format!("{ws_url}/ws/game/{game_id}/")
    }
}
