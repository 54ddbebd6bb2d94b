//! End-to-end duel scenarios
//!
//! Drives the engine through whole turns and battles, checking combat
//! math, turn sequencing, invariants, and determinism.

use duel_forge_rs::core::{
    CardDefinition, CardEffect, CardInstance, CardKind, CardName, EffectKind, EffectTrigger,
    Position,
};
use duel_forge_rs::game::{
    Difficulty, DuelState, LogKind, OpponentStrategy, OutputMode, Phase, Side,
};
use duel_forge_rs::loader::{CardCatalog, DeckLoader};
use duel_forge_rs::zones::CardPile;
use similar_asserts::assert_eq;
use smallvec::SmallVec;
use std::sync::Arc;

fn monster_def(name: &str, attack: i32, defense: i32, level: u8) -> Arc<CardDefinition> {
    Arc::new(CardDefinition {
        name: CardName::new(name),
        kind: CardKind::Monster,
        attack,
        defense,
        level,
        effect: None,
        trap_trigger: None,
        tags: SmallVec::new(),
        text: String::new(),
    })
}

fn monster(name: &str, attack: i32, defense: i32, level: u8) -> CardInstance {
    CardInstance::new(monster_def(name, attack, defense, level))
}

fn piercing_monster(name: &str, attack: i32, defense: i32, level: u8) -> CardInstance {
    let mut def = (*monster_def(name, attack, defense, level)).clone();
    def.effect = Some(CardEffect {
        trigger: EffectTrigger::OnActivate,
        kind: EffectKind::Piercing,
    });
    CardInstance::new(Arc::new(def))
}

fn quiet_state() -> DuelState {
    let mut state = DuelState::new("Alice", "Rival", Side::Player, false);
    state.logger.set_output_mode(OutputMode::Memory);
    state
}

/// Put a duel straight into a battle-ready position for combat-math tests
fn battle_ready(state: &mut DuelState) {
    state.turn.turn_number = 3;
    state.turn.phase = Phase::Battle;
}

fn place_attacker(state: &mut DuelState, side: Side, slot: usize, card: CardInstance) {
    let mut card = card;
    card.position = Position::Attack;
    state.duelist_mut(side).field.monsters[slot] = Some(card);
}

fn place_defender(state: &mut DuelState, side: Side, slot: usize, card: CardInstance) {
    let mut card = card;
    card.position = Position::Defense;
    state.duelist_mut(side).field.monsters[slot] = Some(card);
}

// --- combat math (literal cases) ---

#[test]
fn attack_position_win_deals_difference_damage() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("striker", 1800, 1000, 4));
    place_attacker(&mut state, Side::Opponent, 1, monster("victim", 1200, 800, 3));

    assert!(state.attack(Side::Player, 0, Some(1)));

    assert!(state.duelist(Side::Opponent).field.monster(1).is_none());
    assert_eq!(state.duelist(Side::Opponent).graveyard.len(), 1);
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000 - 600);
    assert_eq!(state.duelist(Side::Player).life_points, 8000);
}

#[test]
fn equal_attacks_destroy_both_with_no_damage() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("a", 1500, 1000, 4));
    place_attacker(&mut state, Side::Opponent, 0, monster("b", 1500, 1000, 4));

    assert!(state.attack(Side::Player, 0, Some(0)));

    assert!(state.duelist(Side::Player).field.monster(0).is_none());
    assert!(state.duelist(Side::Opponent).field.monster(0).is_none());
    assert_eq!(state.duelist(Side::Player).graveyard.len(), 1);
    assert_eq!(state.duelist(Side::Opponent).graveyard.len(), 1);
    assert_eq!(state.duelist(Side::Player).life_points, 8000);
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000);
}

#[test]
fn attacking_into_higher_defense_bounces_damage_back() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("striker", 1800, 1000, 4));
    place_defender(&mut state, Side::Opponent, 0, monster("wall", 500, 2000, 4));

    assert!(state.attack(Side::Player, 0, Some(0)));

    // No destruction either way, attacker's owner takes the difference
    assert!(state.duelist(Side::Player).field.monster(0).is_some());
    assert!(state.duelist(Side::Opponent).field.monster(0).is_some());
    assert_eq!(state.duelist(Side::Player).life_points, 8000 - 200);
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000);
}

#[test]
fn piercing_attacker_carries_damage_through_defense() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(
        &mut state,
        Side::Player,
        0,
        piercing_monster("lancer", 2500, 1500, 6),
    );
    place_defender(&mut state, Side::Opponent, 0, monster("wall", 500, 1200, 3));

    assert!(state.attack(Side::Player, 0, Some(0)));

    assert!(state.duelist(Side::Opponent).field.monster(0).is_none());
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000 - 1300);
}

#[test]
fn defense_destruction_without_piercing_deals_no_damage() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("striker", 1900, 1000, 4));
    place_defender(&mut state, Side::Opponent, 0, monster("wall", 500, 1200, 3));

    assert!(state.attack(Side::Player, 0, Some(0)));

    assert!(state.duelist(Side::Opponent).field.monster(0).is_none());
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000);
}

#[test]
fn equal_attack_and_defense_changes_nothing() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("striker", 1500, 1000, 4));
    place_defender(&mut state, Side::Opponent, 0, monster("wall", 500, 1500, 3));

    assert!(state.attack(Side::Player, 0, Some(0)));

    assert!(state.duelist(Side::Player).field.monster(0).is_some());
    assert!(state.duelist(Side::Opponent).field.monster(0).is_some());
    assert_eq!(state.duelist(Side::Player).life_points, 8000);
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000);
}

#[test]
fn direct_attack_hits_life_points() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("striker", 1900, 1000, 4));

    assert!(state.attack(Side::Player, 0, None));
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000 - 1900);
}

#[test]
fn a_monster_attacks_once_per_turn() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    place_attacker(&mut state, Side::Player, 0, monster("striker", 1900, 1000, 4));

    assert!(state.attack(Side::Player, 0, None));
    assert!(!state.attack(Side::Player, 0, None));
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000 - 1900);
}

// --- turn sequencing ---

#[test]
fn first_turn_battle_phase_is_blocked() {
    let mut state = quiet_state();
    state.duelists[0].hand.push(monster("striker", 1900, 1000, 4));
    assert!(state.summon(Side::Player, 0, 0, &[]));

    assert!(!state.enter_battle_phase(Side::Player));
    assert_eq!(state.turn.phase, Phase::Main1);
    // And attacking outside the battle phase is rejected too
    assert!(!state.attack(Side::Player, 0, None));
    assert_eq!(state.duelist(Side::Opponent).life_points, 8000);
}

#[test]
fn spec_scenario_defense_battle_across_turns() {
    // A summons a 1900-ATK monster on turn 1 and cannot attack; B sets a
    // monster with 1200 DEF on turn 2; A destroys it through defense on
    // turn 3 without dealing life-point damage.
    let mut state = quiet_state();
    state.duelists[0].hand.push(monster("striker", 1900, 1000, 4));
    state.duelists[1].hand.push(monster("lurker", 1000, 1200, 3));
    // Stock decks so turn draws have something to take
    for _ in 0..4 {
        state.duelists[0].deck.add(monster("filler-a", 400, 400, 2));
        state.duelists[1].deck.add(monster("filler-b", 400, 400, 2));
    }

    assert!(state.summon(Side::Player, 0, 0, &[]));
    assert!(!state.enter_battle_phase(Side::Player));
    state.end_turn();

    assert_eq!(state.turn.turn_number, 2);
    assert!(state.set_monster(Side::Opponent, 0, 0));
    state.end_turn();

    assert_eq!(state.turn.turn_number, 3);
    assert!(state.enter_battle_phase(Side::Player));
    assert!(state.attack(Side::Player, 0, Some(0)));

    let defender = state.duelist(Side::Opponent);
    assert_eq!(defender.life_points, 8000);
    assert_eq!(defender.graveyard.len(), 1);
    assert!(defender.field.occupied_monsters().next().is_none());
}

#[test]
fn normal_summon_limit_holds_within_a_turn() {
    let mut state = quiet_state();
    state.duelists[0].hand.push(monster("a", 1000, 1000, 3));
    state.duelists[0].hand.push(monster("b", 1100, 1000, 3));

    assert!(state.summon(Side::Player, 0, 0, &[]));
    assert!(!state.summon(Side::Player, 0, 1, &[]));
    assert!(!state.set_monster(Side::Player, 0, 1));
    assert_eq!(state.duelist(Side::Player).hand.len(), 1);
}

#[test]
fn end_turn_resets_flags_regardless_of_prior_state() {
    let mut state = quiet_state();
    let mut card = monster("striker", 1900, 1000, 4);
    card.has_attacked = true;
    card.cannot_attack = true;
    card.can_change_position = false;
    state.duelists[0].field.monsters[3] = Some(card);
    state.duelists[0].has_normal_summoned = true;

    state.end_turn();

    let player = state.duelist(Side::Player);
    assert!(!player.has_normal_summoned);
    let monster = player.field.monster(3).unwrap();
    assert!(!monster.has_attacked);
    assert!(!monster.cannot_attack);
    assert!(monster.can_change_position);
}

#[test]
fn fresh_summons_cannot_change_position_until_next_turn() {
    let mut state = quiet_state();
    state.duelists[0].hand.push(monster("a", 1000, 1000, 3));
    assert!(state.summon(Side::Player, 0, 0, &[]));
    assert!(!state.change_position(Side::Player, 0));

    // After a full round the monster may change position again
    state.end_turn();
    state.end_turn();
    assert!(state.change_position(Side::Player, 0));
    assert_eq!(
        state.duelist(Side::Player).field.monster(0).unwrap().position,
        Position::Defense
    );
}

// --- boundaries and documented gaps ---

#[test]
fn deck_out_is_flagged_but_not_lethal() {
    // Known gap preserved from the original rules: drawing from an empty
    // deck is a logged no-op, not a loss. This test pins the current
    // behavior; a real deck-out loss rule would invalidate it.
    let mut state = quiet_state();
    assert!(state.duelist(Side::Player).deck.is_empty());

    let drew = state.draw_for(Side::Player);

    assert!(!drew);
    assert!(state.duelist(Side::Player).hand.is_empty());
    assert!(state.duelist(Side::Player).deck_out);
    assert!(!state.duelist(Side::Player).has_lost());
    assert!(!state.ended);
}

#[test]
fn life_points_clamp_to_zero_and_end_the_duel() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    state.duelists[1].life_points = 1000;
    place_attacker(&mut state, Side::Player, 0, monster("striker", 2500, 1000, 5));

    assert!(state.attack(Side::Player, 0, None));

    assert_eq!(state.duelist(Side::Opponent).life_points, 0);
    assert!(state.ended);
    let outcome = state.outcome.clone().unwrap();
    assert!(outcome.player_won());
    assert_eq!(outcome.reward, 100);
    assert_eq!(outcome.stats.mvp_card.unwrap().as_str(), "striker");
}

#[test]
fn no_attacks_resolve_after_the_duel_ends() {
    let mut state = quiet_state();
    battle_ready(&mut state);
    state.duelists[1].life_points = 100;
    place_attacker(&mut state, Side::Player, 0, monster("a", 1500, 1000, 4));
    place_attacker(&mut state, Side::Player, 1, monster("b", 1500, 1000, 4));

    assert!(state.attack(Side::Player, 0, None));
    assert!(state.ended);
    // Second attack is ignored outright
    assert!(!state.attack(Side::Player, 1, None));
    assert_eq!(state.duelist(Side::Opponent).life_points, 0);
}

// --- full strategy-vs-strategy duels ---

fn run_full_duel(p1: Difficulty, p2: Difficulty, seed: u64) -> DuelState {
    let catalog = CardCatalog::builtin();
    let mut state = DuelState::new("Seat 1", "Seat 2", Side::Player, false);
    state.logger.set_output_mode(OutputMode::Memory);
    state.seed_rng(seed);

    for (side, difficulty) in [(Side::Player, p1), (Side::Opponent, p2)] {
        let list = if difficulty == Difficulty::Easy {
            DeckLoader::EASY_OPPONENT_DECK
        } else {
            DeckLoader::STARTER_DECK
        };
        let deck = DeckLoader::build(&catalog, list).unwrap();
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

        // Reachable-state invariants
        for side in [Side::Player, Side::Opponent] {
            let duelist = state.duelist(side);
            assert!(duelist.life_points >= 0);
            assert!(duelist.field.monster_count() <= 5);
            assert!(duelist.field.spell_trap_count() <= 5);
        }
    }
    state
}

#[test]
fn full_duels_uphold_invariants_across_difficulties() {
    for (p1, p2, seed) in [
        (Difficulty::Easy, Difficulty::Easy, 7),
        (Difficulty::Normal, Difficulty::Normal, 42),
        (Difficulty::Hard, Difficulty::Hard, 1234),
        (Difficulty::Hard, Difficulty::Easy, 99),
    ] {
        let state = run_full_duel(p1, p2, seed);
        // The duel either finished or hit the turn cap without breaking
        if state.ended {
            assert!(state.outcome.is_some());
        }
    }
}

#[test]
fn same_seed_produces_identical_duels() {
    let a = run_full_duel(Difficulty::Hard, Difficulty::Normal, 42);
    let b = run_full_duel(Difficulty::Hard, Difficulty::Normal, 42);

    let logs_a: Vec<(LogKind, String)> = a
        .logger
        .logs()
        .iter()
        .map(|e| (e.kind, e.message.clone()))
        .collect();
    let logs_b: Vec<(LogKind, String)> = b
        .logger
        .logs()
        .iter()
        .map(|e| (e.kind, e.message.clone()))
        .collect();
    assert_eq!(logs_a, logs_b);
    assert_eq!(
        a.duelist(Side::Player).life_points,
        b.duelist(Side::Player).life_points
    );
    assert_eq!(
        a.duelist(Side::Opponent).life_points,
        b.duelist(Side::Opponent).life_points
    );
}
