use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::{ProtocolError, Result};
use crate::game::entities::{Face, Roll, Username};

pub const PLAYER_DISCONNECTED: &str = "player disconnected";
pub const WAITING_FOR_PLAYER: &str = "waiting for another player";
pub const NOT_YOUR_TURN: &str = "not your turn";
pub const READY: &str = "ready";
pub const UPDATE: &str = "update";
pub const YOUR_ROLL: &str = "your roll";
pub const END: &str = "end";
pub const GAME_DOES_NOT_EXIST: &str = "game does not exist";
pub const GAME_FINISHED: &str = "game has finished";
pub const UNAUTHORISED: &str = "unauthorised";

/// Opponent rolls arrive as `"<name>'s roll"`.
pub const OPPONENT_ROLL_SUFFIX: &str = "'s roll";

/// Why the server refused the socket before the game started.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RejectReason {
    GameDoesNotExist,
    GameFinished,
    Unauthorised,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::GameDoesNotExist => "That game doesn't exist.",
            Self::GameFinished => "That game has already finished.",
            Self::Unauthorised => "You must be logged in to play.",
        };
        write!(f, "{repr}")
    }
}

/// How a finished game ended, as reported by the server.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GameOutcome {
    pub winner: Option<Username>,
    pub score: Option<u32>,
    /// Whether the game was decided by a tiebreak.
    pub tie: bool,
}

/// A message pushed by the game server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ServerEvent {
    PlayerDisconnected,
    WaitingForPlayer,
    NotYourTurn,
    Ready {
        player1: Username,
        player2: Username,
    },
    Update {
        player: Username,
        score: u32,
        round: u32,
        roll: Option<Vec<Face>>,
    },
    /// The local player may roll these pre-decided faces.
    YourRoll(Roll),
    /// The opponent acknowledged their roll; replay it locally.
    OpponentRoll {
        player: Username,
        roll: Roll,
    },
    End(GameOutcome),
    Rejected(RejectReason),
}

impl ServerEvent {
    /// Decode a single text frame.
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the frame isn't a known, well-formed
    /// message.
    pub fn decode(text: &str) -> Result<Self> {
        let wire: WireMessage = serde_json::from_str(text)?;
        Self::try_from(wire)
    }

    /// Gated events wait until no roll is in progress.
    pub fn is_gated(&self) -> bool {
        matches!(
            self,
            Self::YourRoll(_) | Self::OpponentRoll { .. } | Self::End(_)
        )
    }

    pub fn roll(&self) -> Option<&Roll> {
        match self {
            Self::YourRoll(roll) | Self::OpponentRoll { roll, .. } => Some(roll),
            _ => None,
        }
    }
}

impl fmt::Display for ServerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlayerDisconnected => write!(f, "{PLAYER_DISCONNECTED}"),
            Self::WaitingForPlayer => write!(f, "{WAITING_FOR_PLAYER}"),
            Self::NotYourTurn => write!(f, "{NOT_YOUR_TURN}"),
            Self::Ready { player1, player2 } => write!(f, "{player1} vs {player2}"),
            Self::Update {
                player,
                score,
                round,
                ..
            } => write!(f, "round {round}: {player} has {score}"),
            Self::YourRoll(roll) => write!(f, "your roll {roll}"),
            Self::OpponentRoll { player, roll } => write!(f, "{player} rolled {roll}"),
            Self::End(outcome) => match &outcome.winner {
                Some(winner) => write!(f, "game over, {winner} wins"),
                None => write!(f, "game over"),
            },
            Self::Rejected(reason) => write!(f, "rejected: {reason}"),
        }
    }
}

/// Raw shape shared by every server message.
#[derive(Debug, Deserialize)]
struct WireMessage {
    message: String,
    player1: Option<Username>,
    player2: Option<Username>,
    player: Option<Username>,
    score: Option<u32>,
    round: Option<u32>,
    roll: Option<Vec<Face>>,
    double: Option<bool>,
    tiebreaker: Option<bool>,
    winner: Option<Username>,
    tie: Option<bool>,
}

impl WireMessage {
    fn require<T>(&self, value: Option<T>, field: &'static str) -> Result<T> {
        value.ok_or_else(|| ProtocolError::MissingField {
            kind: self.message.clone(),
            field,
        })
    }

    fn roll(&self) -> Result<Roll> {
        let faces = self.require(self.roll.clone(), "roll")?;
        Roll::new(
            faces,
            self.double.unwrap_or(false),
            self.tiebreaker.unwrap_or(false),
        )
        .map_err(|source| ProtocolError::InvalidRoll {
            kind: self.message.clone(),
            source,
        })
    }
}

impl TryFrom<WireMessage> for ServerEvent {
    type Error = ProtocolError;

    fn try_from(wire: WireMessage) -> Result<Self> {
        let event = match wire.message.as_str() {
            PLAYER_DISCONNECTED => Self::PlayerDisconnected,
            WAITING_FOR_PLAYER => Self::WaitingForPlayer,
            NOT_YOUR_TURN => Self::NotYourTurn,
            READY => Self::Ready {
                player1: wire.require(wire.player1.clone(), "player1")?,
                player2: wire.require(wire.player2.clone(), "player2")?,
            },
            UPDATE => Self::Update {
                player: wire.require(wire.player.clone(), "player")?,
                score: wire.require(wire.score, "score")?,
                round: wire.require(wire.round, "round")?,
                roll: wire.roll.clone(),
            },
            YOUR_ROLL => Self::YourRoll(wire.roll()?),
            END => Self::End(GameOutcome {
                winner: wire.winner.clone(),
                score: wire.score,
                tie: wire.tie.unwrap_or(false),
            }),
            GAME_DOES_NOT_EXIST => Self::Rejected(RejectReason::GameDoesNotExist),
            GAME_FINISHED => Self::Rejected(RejectReason::GameFinished),
            UNAUTHORISED => Self::Rejected(RejectReason::Unauthorised),
            other => match other.strip_suffix(OPPONENT_ROLL_SUFFIX) {
                Some(name) if !name.trim().is_empty() => Self::OpponentRoll {
                    player: Username::new(name),
                    roll: wire.roll()?,
                },
                _ => return Err(ProtocolError::UnknownKind(other.to_string())),
            },
        };
        Ok(event)
    }
}

/// Sent once the local player's turn has fully played out.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Acknowledgement {}

impl Acknowledgement {
    /// # Errors
    ///
    /// Returns an error only if JSON serialization fails.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
