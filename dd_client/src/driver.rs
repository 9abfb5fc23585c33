//! Carries out what the turn state machine asks for.
//!
//! Both frontends own one [`GameDriver`] and feed it socket messages, roll
//! presses and animation deadlines from a single `tokio::select!` loop.

use anyhow::Result;
use dice_duel::{Animation, Effect, Notifier, Route, Sequencer, Table, TurnMachine, Username};
use tokio::time::Instant;

use crate::websocket_client::{ConnectionHandle, Incoming};

pub struct GameDriver<N> {
    machine: TurnMachine,
    connection: ConnectionHandle,
    notifier: N,
    animation: Option<Animation>,
    route: Option<Route>,
    acks_sent: usize,
}

impl<N: Notifier> GameDriver<N> {
    pub fn new(
        local_player: Username,
        sequencer: Sequencer,
        connection: ConnectionHandle,
        notifier: N,
    ) -> Self {
        Self {
            machine: TurnMachine::new(local_player, sequencer),
            connection,
            notifier,
            animation: None,
            route: None,
            acks_sent: 0,
        }
    }

    pub fn machine(&self) -> &TurnMachine {
        &self.machine
    }

    pub fn table(&self) -> &Table {
        self.machine.table()
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    /// Where the game screen navigated to, once it has.
    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn into_route(self) -> Option<Route> {
        self.route
    }

    pub fn acks_sent(&self) -> usize {
        self.acks_sent
    }

    /// When the in-flight animation may finish.
    pub fn animation_deadline(&self) -> Option<Instant> {
        self.animation.as_ref().map(Animation::deadline)
    }

    pub fn on_incoming(&mut self, incoming: Incoming) -> Result<()> {
        let effects = match incoming {
            Incoming::Event(event) => {
                tracing::debug!("Received '{event}'");
                self.machine.handle_event(event)
            }
            Incoming::Malformed { error, .. } => {
                tracing::debug!("Dropped malformed message: {error}");
                return Ok(());
            }
            Incoming::Closed(reason) => {
                tracing::info!(reason = reason.as_deref(), "Game socket closed");
                self.machine.transport_closed()
            }
        };
        self.apply(effects)
    }

    /// The player asked to roll. Returns whether the press was accepted.
    pub fn roll(&mut self) -> Result<bool> {
        let effects = self.machine.roll_clicked();
        let accepted = !effects.is_empty();
        self.apply(effects)?;
        Ok(accepted)
    }

    /// Call once [`Self::animation_deadline`] has passed.
    pub fn finish_animation(&mut self) -> Result<()> {
        if self.animation.take().is_none() {
            return Ok(());
        }
        let effects = self.machine.animation_finished();
        self.apply(effects)
    }

    fn apply(&mut self, effects: Vec<Effect>) -> Result<()> {
        for effect in effects {
            match effect {
                Effect::Animate(animation) => {
                    if self.animation.replace(animation).is_some() {
                        tracing::warn!("Started an animation while another was in flight");
                    }
                }
                Effect::SendAck => {
                    self.connection.send_ack()?;
                    self.acks_sent += 1;
                }
                Effect::Notify(notice) => self.notifier.notify(&notice),
                Effect::Navigate(route) => {
                    self.animation = None;
                    if self.route.is_none() {
                        tracing::info!(?route, "Leaving the game screen");
                        self.route = Some(route);
                        self.connection.close();
                    }
                }
            }
        }
        Ok(())
    }
}

/// Resolves at `deadline`, or never when there is nothing to wait for.
pub async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
