use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use dice_duel::{Roll, Sequencer, ServerEvent, TurnMachine, Username};
use std::hint::black_box;

const YOUR_ROLL: &str =
    r#"{"message": "your roll", "roll": [3, 5, 6], "double": true, "tiebreaker": false}"#;
const OPPONENT_ROLL: &str =
    r#"{"message": "bob's roll", "roll": [2, 4], "double": false, "tiebreaker": false}"#;
const UPDATE: &str = r#"{"message": "update", "player": "bob", "score": 16, "round": 2, "roll": [2, 4]}"#;

/// Benchmark decoding each kind of frequent server message
fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    for (name, raw) in [
        ("your_roll", YOUR_ROLL),
        ("opponent_roll", OPPONENT_ROLL),
        ("update", UPDATE),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(name), raw, |b, raw| {
            b.iter(|| ServerEvent::decode(black_box(raw)));
        });
    }
    group.finish();
}

/// Benchmark a backlog of queued opponent rolls draining one by one
fn bench_drain_backlog(c: &mut Criterion) {
    let mut group = c.benchmark_group("drain_backlog");
    for backlog in [1usize, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(backlog),
            &backlog,
            |b, &backlog| {
                b.iter(|| {
                    let mut machine =
                        TurnMachine::new(Username::new("alice"), Sequencer::default());
                    for _ in 0..backlog {
                        machine.handle_event(ServerEvent::OpponentRoll {
                            player: Username::new("bob"),
                            roll: Roll::pair(2, 4).unwrap(),
                        });
                    }
                    while machine.phase().is_animating() {
                        black_box(machine.animation_finished());
                    }
                    machine
                });
            },
        );
    }
    group.finish();
}

/// Benchmark a full local turn: arm, click, finish
fn bench_local_turn(c: &mut Criterion) {
    let roll = Roll::double(3, 5, 6).unwrap();
    c.bench_function("local_double_turn", |b| {
        b.iter(|| {
            let mut machine = TurnMachine::new(Username::new("alice"), Sequencer::default());
            machine.handle_event(ServerEvent::YourRoll(roll.clone()));
            machine.roll_clicked();
            machine.animation_finished();
            machine.roll_clicked();
            black_box(machine.animation_finished())
        });
    });
}

criterion_group!(benches, bench_decode, bench_drain_backlog, bench_local_turn);
criterion_main!(benches);
