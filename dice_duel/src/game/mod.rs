//! Dice game client core.
//!
//! This module provides:
//! - Roll data and the on-screen display model (dice tray, roll button)
//! - The timed roll animation sequencer
//! - The turn state machine that gates server events behind animations

pub mod animation;
pub mod entities;
pub mod state_machine;

pub use animation::{Animation, DEFAULT_ROLL_DURATION, Sequencer};
pub use state_machine::{Effect, Phase, Route, TurnMachine};
