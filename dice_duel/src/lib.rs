//! # Dice Duel
//!
//! Client-side core for a two-player online dice game. The server decides
//! every roll; this crate replays those rolls with a timed animation and
//! keeps the local screen in step with the server's turn order.
//!
//! ## Architecture
//!
//! - **Protocol** ([`net`]): decodes server events and encodes the
//!   acknowledgement sent after a local turn
//! - **Turn state machine** ([`game::TurnMachine`]): queues server events
//!   behind in-flight animations and decides when to acknowledge
//! - **Animation sequencer** ([`game::Sequencer`]): marks dice as rolling
//!   and enforces a minimum roll duration
//! - **View updater** ([`view`]): scoreboard text derived from server events
//!
//! The state machine is sans-IO: it returns [`game::Effect`]s for its
//! driver to carry out, which keeps it independent of the socket and the
//! terminal.
//!
//! ## Example
//!
//! ```
//! use dice_duel::{Effect, Sequencer, ServerEvent, TurnMachine, Username};
//!
//! let mut machine = TurnMachine::new(Username::new("alice"), Sequencer::default());
//! let event = ServerEvent::decode(
//!     r#"{"message": "your roll", "roll": [3, 5], "double": false, "tiebreaker": false}"#,
//! )
//! .unwrap();
//!
//! assert!(machine.handle_event(event).is_empty());
//! assert!(matches!(machine.roll_clicked().as_slice(), [Effect::Animate(_)]));
//! assert!(matches!(machine.animation_finished().as_slice(), [Effect::SendAck]));
//! ```

/// Roll data, display model, animation and turn state machine.
pub mod game;
pub use game::{
    Animation, DEFAULT_ROLL_DURATION, Effect, Phase, Route, Sequencer, TurnMachine,
    entities::{self, DiceTray, DieSlot, Face, Roll, RollStage, Table, Username},
};

/// Wire protocol with the game server.
pub mod net;
pub use net::{
    errors::ProtocolError,
    messages::{self, Acknowledgement, GameOutcome, RejectReason, ServerEvent},
};

/// User-facing notices.
pub mod notify;
pub use notify::{Notice, Notifier, Severity};

/// Per-run session data.
pub mod session;
pub use session::Session;

/// Scoreboard text.
pub mod view;
