//! Protocol error types for decoding server messages.

use thiserror::Error;

use crate::game::entities::RollError;

/// Errors that can occur while decoding a server message.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame isn't JSON or a field has the wrong type
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),

    /// The `message` field names a kind this client doesn't know
    #[error("Unknown message kind '{0}'")]
    UnknownKind(String),

    /// A field the kind requires is absent
    #[error("'{kind}' message is missing field '{field}'")]
    MissingField { kind: String, field: &'static str },

    /// The roll payload doesn't describe a legal roll
    #[error("Invalid roll in '{kind}' message: {source}")]
    InvalidRoll {
        kind: String,
        #[source]
        source: RollError,
    },
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
