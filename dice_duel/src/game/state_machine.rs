//! Client-side turn synchronisation.
//!
//! The [`TurnMachine`] sits between the socket and the screen. It decides
//! whether a server event can be shown right away or has to wait for the
//! current roll to play out, and it tells its driver what to do next through
//! a list of [`Effect`]s:
//!
//! - **Animate**: wait for the animation deadline, then call
//!   [`TurnMachine::animation_finished`]
//! - **SendAck**: write the acknowledgement to the server
//! - **Notify**: put a notice in front of the user
//! - **Navigate**: leave the game screen
//!
//! Roll events and the end-of-game event are *gated*. While a roll is
//! pending or animating they queue up in arrival order and are replayed as
//! soon as the machine is idle again. Scoreboard events are never gated.

use log::{debug, info, warn};
use std::collections::VecDeque;

use super::animation::{Animation, Sequencer};
use super::entities::{DieSlot, Roll, RollHandler, RollStage, Table, Username};
use crate::net::messages::{GameOutcome, ServerEvent};
use crate::notify::{
    CONNECTION_LOST_NOTICE, DISCONNECTED_NOTICE, LOCAL_DOUBLE_NOTICE, Notice,
    REMOTE_DOUBLE_NOTICE, Severity, TIEBREAK_NOTICE,
};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Nothing pending; gated events are processed immediately.
    Idle,
    /// The roll button is armed for the local player's turn.
    AwaitingClick,
    /// The local player's dice are rolling.
    AnimatingLocal { roll: Roll, stage: RollStage },
    /// The local player rolled a double and must roll the bonus die.
    AwaitingDoubleReroll,
    /// The opponent's pre-decided roll is being replayed.
    AnimatingRemote { roll: Roll, stage: RollStage },
    /// The session has left the game screen. Terminal.
    Finished,
}

impl Phase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_animating(&self) -> bool {
        matches!(
            self,
            Self::AnimatingLocal { .. } | Self::AnimatingRemote { .. }
        )
    }
}

/// Where the frontend should go once the game screen is done.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Route {
    Home,
    Results(GameOutcome),
}

#[derive(Debug)]
pub enum Effect {
    Animate(Animation),
    SendAck,
    Notify(Notice),
    Navigate(Route),
}

pub struct TurnMachine {
    local_player: Username,
    sequencer: Sequencer,
    phase: Phase,
    tiebreak_entered: bool,
    pending: VecDeque<ServerEvent>,
    table: Table,
}

impl TurnMachine {
    pub fn new(local_player: Username, sequencer: Sequencer) -> Self {
        Self {
            local_player,
            sequencer,
            phase: Phase::Idle,
            tiebreak_entered: false,
            pending: VecDeque::new(),
            table: Table::default(),
        }
    }

    pub fn local_player(&self) -> &Username {
        &self.local_player
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn tiebreak_entered(&self) -> bool {
        self.tiebreak_entered
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// Number of gated events waiting for the current roll to finish.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.phase, Phase::Finished)
    }

    /// Feed one event from the server, in the order it was received.
    pub fn handle_event(&mut self, event: ServerEvent) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.is_finished() {
            debug!("Ignoring '{event}' after the game screen closed");
            return effects;
        }

        if event.is_gated() {
            if self.phase.is_idle() && self.pending.is_empty() {
                self.process(event, &mut effects);
            } else {
                debug!("Deferring '{event}' while {:?}", self.phase);
                self.pending.push_back(event);
            }
            return effects;
        }

        match event {
            ServerEvent::WaitingForPlayer | ServerEvent::NotYourTurn => {
                debug!("Ignoring informational '{event}'");
            }
            ServerEvent::Ready { .. } | ServerEvent::Update { .. } => {
                self.table.scoreboard.apply(&self.local_player, &event);
            }
            ServerEvent::PlayerDisconnected => {
                info!("Opponent disconnected, leaving the game");
                let notice = Notice::new(DISCONNECTED_NOTICE, Severity::Warning).blocking();
                self.abort(notice, &mut effects);
            }
            ServerEvent::Rejected(reason) => {
                warn!("Server rejected the session: {reason}");
                let notice = Notice::new(reason.to_string(), Severity::Error).blocking();
                self.abort(notice, &mut effects);
            }
            gated => warn!("Gated event '{gated}' reached the ungated path"),
        }
        effects
    }

    /// The local player pressed the roll button.
    ///
    /// Presses are ignored unless a roll handler is armed.
    pub fn roll_clicked(&mut self) -> Vec<Effect> {
        if !matches!(
            self.phase,
            Phase::AwaitingClick | Phase::AwaitingDoubleReroll
        ) {
            debug!("Ignoring roll press while {:?}", self.phase);
            return Vec::new();
        }
        let Some(RollHandler { roll, stage }) = self.table.roll_button.take() else {
            warn!("Roll press while {:?} but no handler armed", self.phase);
            return Vec::new();
        };

        let animation = self.sequencer.play(&mut self.table.dice, &roll, stage);
        self.phase = Phase::AnimatingLocal { roll, stage };
        vec![Effect::Animate(animation)]
    }

    /// The in-flight animation reached its deadline.
    pub fn animation_finished(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        self.table.dice.settle();

        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::AnimatingLocal {
                roll,
                stage: RollStage::First,
            } if roll.is_double() => {
                effects.push(Effect::Notify(Notice::new(
                    LOCAL_DOUBLE_NOTICE,
                    Severity::Success,
                )));
                self.table.dice.show_single();
                self.table.roll_button.install(RollHandler {
                    roll,
                    stage: RollStage::Bonus,
                });
                self.phase = Phase::AwaitingDoubleReroll;
            }
            Phase::AnimatingLocal { .. } => {
                self.table.dice.hide_all();
                effects.push(Effect::SendAck);
                self.drain(&mut effects);
            }
            Phase::AnimatingRemote {
                roll,
                stage: RollStage::First,
            } if roll.is_double() => {
                effects.push(Effect::Notify(Notice::new(
                    REMOTE_DOUBLE_NOTICE,
                    Severity::Success,
                )));
                self.table.dice.show_single();
                let animation = self
                    .sequencer
                    .play(&mut self.table.dice, &roll, RollStage::Bonus);
                self.phase = Phase::AnimatingRemote {
                    roll,
                    stage: RollStage::Bonus,
                };
                effects.push(Effect::Animate(animation));
            }
            Phase::AnimatingRemote { stage, .. } => {
                if stage == RollStage::Bonus {
                    self.table.dice.hide(DieSlot::Centre);
                }
                self.drain(&mut effects);
            }
            other => {
                warn!("Animation finished while {other:?}");
                self.phase = other;
            }
        }
        effects
    }

    /// The socket closed or errored.
    ///
    /// A close that follows a queued end-of-game event is the server
    /// finishing the match and is not treated as a disconnect.
    pub fn transport_closed(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.is_finished() {
            return effects;
        }
        if self
            .pending
            .iter()
            .any(|event| matches!(event, ServerEvent::End(_)))
        {
            info!("Socket closed after the end of the match");
            return effects;
        }
        warn!("Socket closed mid-game");
        let notice = Notice::new(CONNECTION_LOST_NOTICE, Severity::Error).blocking();
        self.abort(notice, &mut effects);
        effects
    }

    /// Handle a gated event. Only called while idle.
    fn process(&mut self, event: ServerEvent, effects: &mut Vec<Effect>) {
        self.table.scoreboard.apply(&self.local_player, &event);
        match event {
            ServerEvent::YourRoll(roll) => self.begin_local_turn(roll, effects),
            ServerEvent::OpponentRoll { player, roll } => {
                debug!("Replaying {player}'s roll {roll}");
                self.begin_remote_turn(roll, effects);
            }
            ServerEvent::End(outcome) => {
                info!("Game over, showing results");
                self.table.roll_button.take();
                self.pending.clear();
                self.phase = Phase::Finished;
                effects.push(Effect::Navigate(Route::Results(outcome)));
            }
            other => warn!("'{other}' is not a gated event"),
        }
    }

    fn begin_local_turn(&mut self, roll: Roll, effects: &mut Vec<Effect>) {
        self.enter_tiebreak(&roll, effects);
        self.table.dice.show_for(&roll);
        let handler = RollHandler {
            roll,
            stage: RollStage::First,
        };
        if let Some(stale) = self.table.roll_button.install(handler) {
            warn!("Replaced a stale roll handler for {}", stale.roll);
        }
        self.phase = Phase::AwaitingClick;
    }

    fn begin_remote_turn(&mut self, roll: Roll, effects: &mut Vec<Effect>) {
        self.enter_tiebreak(&roll, effects);
        self.table.roll_button.hide();
        self.table.dice.show_for(&roll);
        let animation = self
            .sequencer
            .play(&mut self.table.dice, &roll, RollStage::First);
        self.phase = Phase::AnimatingRemote {
            roll,
            stage: RollStage::First,
        };
        effects.push(Effect::Animate(animation));
    }

    fn enter_tiebreak(&mut self, roll: &Roll, effects: &mut Vec<Effect>) {
        if roll.is_tiebreaker() && !self.tiebreak_entered {
            self.tiebreak_entered = true;
            effects.push(Effect::Notify(
                Notice::new(TIEBREAK_NOTICE, Severity::Info).blocking(),
            ));
        }
    }

    /// Replay deferred events until one of them makes the machine busy.
    fn drain(&mut self, effects: &mut Vec<Effect>) {
        while self.phase.is_idle() {
            let Some(event) = self.pending.pop_front() else {
                break;
            };
            self.process(event, effects);
        }
    }

    fn abort(&mut self, notice: Notice, effects: &mut Vec<Effect>) {
        self.pending.clear();
        self.table.roll_button.take();
        self.phase = Phase::Finished;
        effects.push(Effect::Notify(notice));
        effects.push(Effect::Navigate(Route::Home));
    }
}
