//! Wire protocol spoken with the game server.
//!
//! The server pushes JSON objects tagged by a `message` field; the client
//! only ever answers with an empty acknowledgement object.

/// Protocol decoding errors.
pub mod errors;

/// Server events and the client acknowledgement.
pub mod messages;
