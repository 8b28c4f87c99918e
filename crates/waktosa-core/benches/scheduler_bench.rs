use criterion::{black_box, criterion_group, criterion_main, Criterion};
use waktosa_core::combatant::{Side, Stats};
use waktosa_core::config::{BattleConfig, ControlMode, Stage, TargetPolicy};
use waktosa_core::roster::Roster;
use waktosa_core::scheduler::Scheduler;
use waktosa_core::session::BattleSession;

fn crowded_roster(count: u32) -> Roster {
    let mut roster = Roster::new();
    for i in 0..count {
        let side = if i % 2 == 0 { Side::Ally } else { Side::Enemy };
        // Spread speeds so ties are rare but present
        let speed = 60 + (i * 37) % 140;
        roster
            .spawn(format!("C{i}"), side, Stats::new(500, 10, 2, speed))
            .expect("bench stats are valid");
    }
    roster
}

fn bench_compute_order(c: &mut Criterion) {
    let scheduler = Scheduler::default();
    let mut roster = crowded_roster(32);
    scheduler.initialize(&mut roster);

    c.bench_function("compute_order_32", |b| {
        b.iter(|| black_box(scheduler.compute_order(black_box(&roster))))
    });
}

fn bench_turn_cycle(c: &mut Criterion) {
    let scheduler = Scheduler::default();
    let mut roster = crowded_roster(32);
    scheduler.initialize(&mut roster);

    c.bench_function("prepare_and_advance_32", |b| {
        b.iter(|| {
            if let Some(actor) = scheduler.prepare_turn(&mut roster) {
                scheduler.advance_after_action(&mut roster, black_box(actor));
            }
        })
    });
}

fn bench_auto_battle(c: &mut Criterion) {
    let config = BattleConfig {
        control: ControlMode::Auto,
        target_policy: TargetPolicy::Random,
        seed: 7,
        ..BattleConfig::for_stage(Stage::Darkness)
    };

    c.bench_function("auto_battle_darkness", |b| {
        b.iter(|| {
            let mut session = BattleSession::new(config.clone());
            session.start_from_config().expect("preset roster is valid");
            black_box(session.battle_state())
        })
    });
}

criterion_group!(benches, bench_compute_order, bench_turn_cycle, bench_auto_battle);
criterion_main!(benches);
