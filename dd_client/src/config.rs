//! Client configuration management.
//!
//! Consolidates all environment variable reads and command line overrides
//! into one validated configuration.

use std::path::PathBuf;
use std::time::Duration;

use dice_duel::{DEFAULT_ROLL_DURATION, session::is_valid_game_id};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";
pub const DEFAULT_LOG_FILE: &str = "dd_client.log";

/// Complete client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the game server's HTTP API
    pub server_url: String,
    /// Username to play as
    pub username: String,
    /// Password for HTTP Basic auth, if the server requires it
    pub password: Option<String>,
    /// Game code to join; a new game is created when absent
    pub game_id: Option<String>,
    /// Minimum time a roll animation runs
    pub animation: Duration,
    /// Where logs go in TUI mode
    pub log_file: PathBuf,
    /// Whether to run the full-screen terminal UI
    pub use_tui: bool,
}

/// Values given on the command line. They win over environment variables.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub game_id: Option<String>,
    pub animation_ms: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub use_tui: bool,
}

impl ClientConfig {
    /// Load configuration from environment variables and overrides
    ///
    /// # Errors
    ///
    /// Returns error if the loaded configuration fails [`Self::validate`]
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        let server_url = overrides
            .server_url
            .or_else(|| std::env::var("DICE_SERVER_URL").ok())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let username = overrides
            .username
            .or_else(|| std::env::var("DICE_USERNAME").ok())
            .unwrap_or_else(whoami::username);

        let password = overrides
            .password
            .or_else(|| std::env::var("DICE_PASSWORD").ok());

        let game_id = overrides
            .game_id
            .or_else(|| std::env::var("DICE_GAME").ok());

        let animation_ms = overrides
            .animation_ms
            .unwrap_or_else(|| parse_env_or("DICE_ANIMATION_MS", millis(DEFAULT_ROLL_DURATION)));

        let log_file = overrides
            .log_file
            .or_else(|| std::env::var("DICE_LOG_FILE").ok().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

        let config = ClientConfig {
            server_url: server_url.trim_end_matches('/').to_string(),
            username: username.trim().to_string(),
            password,
            game_id,
            animation: Duration::from_millis(animation_ms),
            log_file,
            use_tui: overrides.use_tui,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting found
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                var: "DICE_SERVER_URL".to_string(),
                reason: format!("'{}' must start with http:// or https://", self.server_url),
            });
        }

        if self.username.is_empty() {
            return Err(ConfigError::Invalid {
                var: "DICE_USERNAME".to_string(),
                reason: "Must not be empty".to_string(),
            });
        }

        if self.animation.is_zero() {
            return Err(ConfigError::Invalid {
                var: "DICE_ANIMATION_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if let Some(game_id) = &self.game_id
            && !is_valid_game_id(game_id)
        {
            return Err(ConfigError::Invalid {
                var: "DICE_GAME".to_string(),
                reason: format!("'{game_id}' must only contain letters, digits or underscores"),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
