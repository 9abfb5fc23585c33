//! Scoreboard text shown next to the dice.
//!
//! The scoreboard is only ever updated from server events; it never
//! computes scores on its own.

use crate::game::entities::Username;
use crate::net::messages::ServerEvent;

/// Whose turn the scoreboard announces.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum TurnIndicator {
    #[default]
    Unknown,
    Yours,
    Opponents,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Scoreboard {
    pub opponent: Option<Username>,
    pub round: u32,
    pub own_score: u32,
    pub opponent_score: u32,
    pub turn: TurnIndicator,
}

impl Scoreboard {
    /// Reflect an event's data on the scoreboard.
    ///
    /// Events that carry nothing to display are ignored.
    pub fn apply(&mut self, local_player: &Username, event: &ServerEvent) {
        match event {
            ServerEvent::Ready { player1, player2 } => {
                let opponent = if player1 == local_player {
                    player2
                } else {
                    player1
                };
                self.opponent = Some(opponent.clone());
                self.round = 1;
                self.own_score = 0;
                self.opponent_score = 0;
            }
            ServerEvent::Update {
                player,
                score,
                round,
                ..
            } => {
                if player == local_player {
                    self.own_score = *score;
                } else {
                    self.opponent_score = *score;
                }
                self.round = *round;
                self.turn = TurnIndicator::Opponents;
            }
            ServerEvent::YourRoll(_) => self.turn = TurnIndicator::Yours,
            ServerEvent::OpponentRoll { .. } => self.turn = TurnIndicator::Opponents,
            _ => {}
        }
    }

    pub fn opponent_label(&self) -> String {
        match &self.opponent {
            Some(opponent) => format!("Opponent: {opponent}"),
            None => "Opponent: waiting...".to_string(),
        }
    }

    pub fn round_label(&self) -> String {
        format!("Round: {}", self.round)
    }

    pub fn own_score_label(&self) -> String {
        format!("Your score: {}", self.own_score)
    }

    pub fn opponent_score_label(&self) -> String {
        format!("Opponent's score: {}", self.opponent_score)
    }

    pub fn turn_label(&self) -> &'static str {
        match self.turn {
            TurnIndicator::Unknown => "",
            TurnIndicator::Yours => "Your turn!",
            TurnIndicator::Opponents => "Opponent's turn...",
        }
    }
}
