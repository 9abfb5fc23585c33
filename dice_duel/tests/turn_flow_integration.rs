//! Integration tests for full turn sequences through the state machine.

use dice_duel::{
    DieSlot, Effect, GameOutcome, Notice, Phase, Roll, Route, Sequencer, ServerEvent,
    TurnMachine, Username,
    notify::{LOCAL_DOUBLE_NOTICE, REMOTE_DOUBLE_NOTICE, TIEBREAK_NOTICE},
};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Helpers
// ============================================================================

fn new_machine() -> TurnMachine {
    TurnMachine::new(Username::new("alice"), Sequencer::default())
}

fn your_roll(roll: Roll) -> ServerEvent {
    ServerEvent::YourRoll(roll)
}

fn opponent_roll(roll: Roll) -> ServerEvent {
    ServerEvent::OpponentRoll {
        player: Username::new("bob"),
        roll,
    }
}

/// Everything the driver was asked to do, flattened over a scenario.
#[derive(Default)]
struct Recorder {
    animations: usize,
    acks: usize,
    notices: Vec<Notice>,
    routes: Vec<Route>,
}

impl Recorder {
    fn record(&mut self, effects: Vec<Effect>) -> bool {
        let mut animating = false;
        for effect in effects {
            match effect {
                Effect::Animate(_) => {
                    self.animations += 1;
                    animating = true;
                }
                Effect::SendAck => self.acks += 1,
                Effect::Notify(notice) => self.notices.push(notice),
                Effect::Navigate(route) => self.routes.push(route),
            }
        }
        animating
    }

    fn notices_with(&self, message: &str) -> usize {
        self.notices.iter().filter(|n| n.message == message).count()
    }
}

/// Finish animations until the machine stops asking for more.
fn finish_all(machine: &mut TurnMachine, recorder: &mut Recorder) {
    while machine.phase().is_animating() {
        let effects = machine.animation_finished();
        recorder.record(effects);
    }
}

// ============================================================================
// Local turns
// ============================================================================

#[test]
fn test_plain_local_roll() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    recorder.record(machine.handle_event(your_roll(Roll::pair(3, 5).unwrap())));
    assert!(recorder.record(machine.roll_clicked()));

    let dice = &machine.table().dice;
    assert!(dice.die(DieSlot::Left).rolling);
    assert!(dice.die(DieSlot::Right).rolling);
    assert!(!dice.die(DieSlot::Centre).visible);

    finish_all(&mut machine, &mut recorder);

    assert_eq!(recorder.animations, 1);
    assert_eq!(recorder.acks, 1);
    assert!(recorder.notices.is_empty());
    assert!(machine.phase().is_idle());
}

#[test]
fn test_local_double_needs_second_click() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    recorder.record(machine.handle_event(your_roll(Roll::double(3, 5, 6).unwrap())));
    recorder.record(machine.roll_clicked());
    finish_all(&mut machine, &mut recorder);

    assert_eq!(recorder.acks, 0);
    assert_eq!(recorder.notices_with(LOCAL_DOUBLE_NOTICE), 1);
    assert_eq!(machine.phase(), &Phase::AwaitingDoubleReroll);
    assert!(machine.table().roll_button.is_visible());
    assert_eq!(machine.table().dice.visible_slots(), vec![DieSlot::Centre]);

    recorder.record(machine.roll_clicked());
    assert_eq!(machine.table().dice.die(DieSlot::Centre).face, Some(6));
    finish_all(&mut machine, &mut recorder);

    assert_eq!(recorder.animations, 2);
    assert_eq!(recorder.acks, 1);
    assert!(machine.phase().is_idle());
    assert!(machine.table().dice.visible_slots().is_empty());
}

#[test]
fn test_no_ack_for_opponent_double() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    recorder.record(machine.handle_event(opponent_roll(Roll::double(2, 2, 4).unwrap())));
    finish_all(&mut machine, &mut recorder);

    assert_eq!(recorder.animations, 2);
    assert_eq!(recorder.acks, 0);
    assert_eq!(recorder.notices_with(REMOTE_DOUBLE_NOTICE), 1);
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_gated_events_keep_arrival_order() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    recorder.record(machine.handle_event(opponent_roll(Roll::pair(1, 1).unwrap())));
    recorder.record(machine.handle_event(your_roll(Roll::pair(2, 3).unwrap())));
    recorder.record(machine.handle_event(opponent_roll(Roll::pair(4, 5).unwrap())));
    recorder.record(machine.handle_event(ServerEvent::End(GameOutcome {
        winner: Some(Username::new("bob")),
        score: Some(40),
        tie: false,
    })));
    assert_eq!(machine.pending_len(), 3);

    // First the opponent roll finishes and the local turn is armed.
    finish_all(&mut machine, &mut recorder);
    assert_eq!(machine.phase(), &Phase::AwaitingClick);
    assert_eq!(machine.pending_len(), 2);

    // The second opponent roll waits for our acknowledgement.
    recorder.record(machine.roll_clicked());
    let effects = machine.animation_finished();
    assert!(matches!(
        effects.as_slice(),
        [Effect::SendAck, Effect::Animate(_)]
    ));
    recorder.record(effects);
    assert_eq!(
        machine.table().dice.die(DieSlot::Right).face,
        Some(5),
        "second opponent roll should now be on the table"
    );

    finish_all(&mut machine, &mut recorder);
    assert!(machine.is_finished());
    assert_eq!(recorder.acks, 1);
    assert!(matches!(
        recorder.routes.as_slice(),
        [Route::Results(outcome)] if outcome.winner == Some(Username::new("bob"))
    ));
}

#[test]
fn test_score_updates_apply_mid_animation() {
    let mut machine = new_machine();
    machine.handle_event(ServerEvent::Ready {
        player1: Username::new("alice"),
        player2: Username::new("bob"),
    });
    machine.handle_event(opponent_roll(Roll::pair(6, 4).unwrap()));
    machine.handle_event(ServerEvent::Update {
        player: Username::new("bob"),
        score: 20,
        round: 1,
        roll: Some(vec![6, 4]),
    });

    let board = &machine.table().scoreboard;
    assert_eq!(board.opponent_label(), "Opponent: bob");
    assert_eq!(board.opponent_score_label(), "Opponent's score: 20");
    assert!(machine.phase().is_animating());
}

// ============================================================================
// Tiebreak
// ============================================================================

#[test]
fn test_tiebreak_notice_shown_once() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    for round in 0..3 {
        recorder.record(machine.handle_event(your_roll(Roll::tiebreak(3).unwrap())));
        recorder.record(machine.roll_clicked());
        finish_all(&mut machine, &mut recorder);

        recorder.record(machine.handle_event(opponent_roll(Roll::tiebreak(3).unwrap())));
        finish_all(&mut machine, &mut recorder);
        assert!(machine.phase().is_idle(), "round {round} should settle");
    }

    assert_eq!(recorder.notices_with(TIEBREAK_NOTICE), 1);
    assert_eq!(recorder.acks, 3);
    assert!(machine.tiebreak_entered());
}

#[test]
fn test_tiebreak_entered_by_opponent_first() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    recorder.record(machine.handle_event(opponent_roll(Roll::tiebreak(2).unwrap())));
    assert_eq!(machine.table().dice.visible_slots(), vec![DieSlot::Centre]);
    finish_all(&mut machine, &mut recorder);
    recorder.record(machine.handle_event(your_roll(Roll::tiebreak(5).unwrap())));

    assert_eq!(recorder.notices_with(TIEBREAK_NOTICE), 1);
}

// ============================================================================
// Disconnects
// ============================================================================

#[test]
fn test_disconnect_navigates_home_once() {
    let mut machine = new_machine();
    let mut recorder = Recorder::default();

    recorder.record(machine.handle_event(opponent_roll(Roll::pair(1, 2).unwrap())));
    recorder.record(machine.handle_event(ServerEvent::PlayerDisconnected));
    recorder.record(machine.handle_event(your_roll(Roll::pair(3, 4).unwrap())));
    recorder.record(machine.handle_event(ServerEvent::PlayerDisconnected));
    recorder.record(machine.transport_closed());
    recorder.record(machine.animation_finished());
    recorder.record(machine.roll_clicked());

    assert_eq!(recorder.routes, vec![Route::Home]);
    assert_eq!(recorder.acks, 0);
    assert_eq!(recorder.animations, 1);
    assert!(recorder.notices.iter().all(|n| n.blocking));
}

// ============================================================================
// Timing
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_queued_roll_waits_for_animation_deadline() {
    let mut machine = TurnMachine::new(
        Username::new("alice"),
        Sequencer::new(Duration::from_millis(2000)),
    );
    let start = Instant::now();

    let mut effects = machine.handle_event(opponent_roll(Roll::pair(1, 2).unwrap()));
    let Some(Effect::Animate(animation)) = effects.pop() else {
        panic!("expected an animation");
    };

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(
        machine
            .handle_event(your_roll(Roll::pair(3, 4).unwrap()))
            .is_empty()
    );
    assert!(!animation.is_finished());

    animation.finished().await;
    assert!(start.elapsed() >= Duration::from_millis(2000));

    machine.animation_finished();
    assert_eq!(machine.phase(), &Phase::AwaitingClick);
}
