//! Per-run session data.

use thiserror::Error;

use crate::game::entities::Username;

#[derive(Debug, Eq, Error, PartialEq)]
pub enum SessionError {
    #[error("username can't be empty")]
    EmptyUsername,
    #[error("invalid game code '{0}': use letters, digits or underscores")]
    InvalidGameId(String),
    #[error("invalid socket url '{0}': must start with ws:// or wss://")]
    InvalidSocketUrl(String),
}

/// Who is playing which game over which socket. Fixed for the whole run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Session {
    local_player: Username,
    game_id: String,
    socket_url: String,
}

impl Session {
    /// # Errors
    ///
    /// Returns a [`SessionError`] for an empty username, a game code the
    /// server can't route, or a non-websocket URL.
    pub fn new(
        local_player: Username,
        game_id: &str,
        socket_url: String,
    ) -> Result<Self, SessionError> {
        if local_player.is_empty() {
            return Err(SessionError::EmptyUsername);
        }
        if !is_valid_game_id(game_id) {
            return Err(SessionError::InvalidGameId(game_id.to_string()));
        }
        if !(socket_url.starts_with("ws://") || socket_url.starts_with("wss://")) {
            return Err(SessionError::InvalidSocketUrl(socket_url));
        }
        Ok(Self {
            local_player,
            game_id: game_id.to_string(),
            socket_url,
        })
    }

    pub fn local_player(&self) -> &Username {
        &self.local_player
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }
}

/// Game codes are word characters only.
pub fn is_valid_game_id(game_id: &str) -> bool {
    !game_id.is_empty() && game_id.chars().all(|c| c.is_alphanumeric() || c == '_')
}
