//! Full-duel throughput benchmarks
//!
//! Runs seeded strategy-vs-strategy duels to completion and measures
//! whole-duel latency per difficulty pairing.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use duel_forge_rs::game::{
    Difficulty, DuelState, OpponentStrategy, OutputMode, Side, VerbosityLevel,
};
use duel_forge_rs::loader::{CardCatalog, DeckLoader};
use duel_forge_rs::zones::CardPile;

fn run_duel(catalog: &CardCatalog, p1: Difficulty, p2: Difficulty, seed: u64) -> u32 {
    let mut state = DuelState::new("Seat 1", "Seat 2", Side::Player, false);
    state.logger.set_verbosity(VerbosityLevel::Silent);
    state.logger.set_output_mode(OutputMode::Stdout);
    state.seed_rng(seed);

    for (side, difficulty) in [(Side::Player, p1), (Side::Opponent, p2)] {
        let list = if difficulty == Difficulty::Easy {
            DeckLoader::EASY_OPPONENT_DECK
        } else {
            DeckLoader::STARTER_DECK
        };
        let deck = DeckLoader::build(catalog, list).expect("builtin deck list");
        state.duelist_mut(side).deck = CardPile::from_cards(deck);
        state.shuffle_deck(side);
        state.duelist_mut(side).draw_initial_hand();
    }

    let seats = [
        OpponentStrategy::new(p1, Side::Player),
        OpponentStrategy::new(p2, Side::Opponent),
    ];
    while !state.ended && state.turn.turn_number <= 200 {
        let seat = &seats[state.turn.active.index()];
        seat.take_turn(&mut state);
        if state.ended {
            break;
        }
        state.end_turn();
    }
    state.turn.turn_number
}

fn bench_full_duels(c: &mut Criterion) {
    let catalog = CardCatalog::builtin();
    let mut group = c.benchmark_group("full_duel");

    for (label, p1, p2) in [
        ("easy_vs_easy", Difficulty::Easy, Difficulty::Easy),
        ("normal_vs_normal", Difficulty::Normal, Difficulty::Normal),
        ("hard_vs_hard", Difficulty::Hard, Difficulty::Hard),
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(label), &(p1, p2), |b, &(p1, p2)| {
            let mut seed = 0u64;
            b.iter(|| {
                seed = seed.wrapping_add(1);
                run_duel(&catalog, p1, p2, seed)
            });
        });
    }
    group.finish();
}

fn bench_catalog_load(c: &mut Criterion) {
    c.bench_function("catalog_builtin", |b| b.iter(CardCatalog::builtin));
}

criterion_group!(benches, bench_full_duels, bench_catalog_load);
criterion_main!(benches);
