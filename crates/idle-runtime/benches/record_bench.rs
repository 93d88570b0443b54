use criterion::{criterion_group, criterion_main, Criterion};
use idle_core::{CurrencyKind, EconConfig, GameEvent, GameKind};
use idle_runtime::{Player, Record};
use std::sync::Arc;

fn bench_record(c: &mut Criterion) {
    let config = EconConfig::default();
    let record = Record::new(config.missions.clone());
    let action = GameEvent::ActionPerformed {
        game: GameKind::Language,
    };
    let earned = GameEvent::CurrencyEarned {
        currency: CurrencyKind::Gold,
        amount: 3,
    };
    c.bench_function("record_event", |b| {
        b.iter(|| {
            let _ = record.record(&action);
            let _ = record.record(&earned);
        })
    });

    let player = Player::new("bench", "bench", Arc::new(config));
    c.bench_function("perform_action", |b| {
        b.iter(|| {
            let _ = player.perform_action(GameKind::Coding);
        })
    });
}

criterion_group!(benches, bench_record);
criterion_main!(benches);
