//! Duel engine facade
//!
//! `DuelEngine` wires a `DuelState` to an `OpponentStrategy` and exposes
//! the inbound action surface a UI or test harness drives. Player-facing
//! methods act for `Side::Player`; after the player ends a turn, the
//! opponent's whole turn runs synchronously before control returns.

use crate::core::Position;
use crate::game::cues::{DuelOutcome, PresentationCue};
use crate::game::logger::LogKind;
use crate::game::phase::{Phase, Side};
use crate::game::state::DuelState;
use crate::game::strategy::{Difficulty, OpponentStrategy};
use crate::game::targeting::SpellOrigin;
use crate::loader::catalog::CardCatalog;
use crate::loader::deck::DeckLoader;
use crate::store::KeyValueStore;
use crate::zones::CardPile;
use crate::Result;

/// Duel setup parameters
#[derive(Debug, Clone)]
pub struct DuelConfig {
    pub difficulty: Difficulty,
    pub tutorial: bool,
    pub starting: Side,
    /// RNG seed for deterministic shuffles and strategy rolls
    pub seed: Option<u64>,
    pub player_name: String,
    pub opponent_name: String,
}

impl Default for DuelConfig {
    fn default() -> Self {
        DuelConfig {
            difficulty: Difficulty::Normal,
            tutorial: false,
            starting: Side::Player,
            seed: None,
            player_name: "Player".to_string(),
            opponent_name: "Opponent".to_string(),
        }
    }
}

/// The duel engine: match state plus the opponent's strategy
#[derive(Debug, Clone)]
pub struct DuelEngine {
    pub state: DuelState,
    strategy: OpponentStrategy,
}

impl DuelEngine {
    /// Set up and start a duel: build decks, draw opening hands, and (when
    /// the opponent goes first) run its opening turn.
    pub fn start_duel(
        catalog: &CardCatalog,
        config: DuelConfig,
        store: &dyn KeyValueStore,
    ) -> Result<Self> {
        let mut state = DuelState::new(
            config.player_name.clone(),
            config.opponent_name.clone(),
            config.starting,
            config.tutorial,
        );
        if let Some(seed) = config.seed {
            state.seed_rng(seed);
        }

        if config.tutorial {
            // Forced decks, unshuffled; the opponent starts with one weak
            // monster already on the field instead of a hand.
            let deck = DeckLoader::build(catalog, DeckLoader::TUTORIAL_PLAYER_DECK)?;
            state.duelist_mut(Side::Player).deck = CardPile::from_cards(deck);

            let mut monster = catalog.instantiate(DeckLoader::TUTORIAL_OPPONENT_MONSTER)?;
            monster.position = Position::Attack;
            monster.face_down = false;
            let name = monster.name().to_string();
            state.duelist_mut(Side::Opponent).field.monsters[2] = Some(monster);
            let opponent_name = state.duelist_name(Side::Opponent);
            state.narrate(
                LogKind::Summon,
                &format!("{opponent_name} starts with {name} on the field"),
            );
        } else {
            let deck = DeckLoader::saved_or_starter(catalog, store)?;
            state.duelist_mut(Side::Player).deck = CardPile::from_cards(deck);
            state.shuffle_deck(Side::Player);

            let list = if config.difficulty == Difficulty::Easy {
                DeckLoader::EASY_OPPONENT_DECK
            } else {
                DeckLoader::STARTER_DECK
            };
            let deck = DeckLoader::build(catalog, list)?;
            state.duelist_mut(Side::Opponent).deck = CardPile::from_cards(deck);
            state.shuffle_deck(Side::Opponent);
        }

        state.duelist_mut(Side::Player).draw_initial_hand();
        if !config.tutorial {
            state.duelist_mut(Side::Opponent).draw_initial_hand();
        }
        let starter_name = state.duelist_name(config.starting);
        state.narrate(
            LogKind::TurnStart,
            &format!("{starter_name} starts the duel!"),
        );

        let mut engine = DuelEngine {
            state,
            strategy: OpponentStrategy::new(config.difficulty, Side::Opponent),
        };
        engine.run_opponent_turns();
        Ok(engine)
    }

    // --- inbound action surface (acts for the player) ---

    pub fn select_card_from_hand(&mut self, hand_index: usize) -> bool {
        self.state.select_card_from_hand(Side::Player, hand_index)
    }

    pub fn summon(&mut self, hand_index: usize, field_slot: usize, tributes: &[usize]) -> bool {
        self.state.summon(Side::Player, hand_index, field_slot, tributes)
    }

    pub fn set_monster(&mut self, hand_index: usize, field_slot: usize) -> bool {
        self.state.set_monster(Side::Player, hand_index, field_slot)
    }

    pub fn set_spell_trap(&mut self, hand_index: usize, field_slot: usize) -> bool {
        self.state.set_spell_trap(Side::Player, hand_index, field_slot)
    }

    /// Activate a spell from the hand, or flip a set card on the field
    pub fn activate_spell_or_trap(&mut self, origin: SpellOrigin) -> bool {
        self.state.activate_spell_trap(Side::Player, origin)
    }

    pub fn change_monster_position(&mut self, field_slot: usize) -> bool {
        self.state.change_position(Side::Player, field_slot)
    }

    /// Advance the phase: Main 1 into Battle, or Battle into Main 2
    pub fn enter_battle_phase(&mut self) -> bool {
        match self.state.turn.phase {
            Phase::Main1 => self.state.enter_battle_phase(Side::Player),
            Phase::Battle => self.state.advance_to_main2(Side::Player),
            Phase::Main2 => false,
        }
    }

    pub fn attack(&mut self, attacker_slot: usize, target_slot: Option<usize>) -> bool {
        self.state.attack(Side::Player, attacker_slot, target_slot)
    }

    /// Resolve a pending manual-target effect with the chosen slot
    pub fn select_target(&mut self, field_slot: usize) -> bool {
        self.state.select_target(field_slot)
    }

    /// End the player's turn, then run the opponent's full turn
    pub fn end_turn(&mut self) -> bool {
        if self.state.ended || self.state.turn.active != Side::Player {
            return false;
        }
        self.state.end_turn();
        self.run_opponent_turns();
        true
    }

    fn run_opponent_turns(&mut self) {
        while !self.state.ended && self.state.turn.active == self.strategy.side {
            self.strategy.take_turn(&mut self.state);
            if self.state.ended {
                break;
            }
            self.state.end_turn();
        }
    }

    // --- observation ---

    pub fn is_over(&self) -> bool {
        self.state.ended
    }

    pub fn outcome(&self) -> Option<&DuelOutcome> {
        self.state.outcome.as_ref()
    }

    /// Drain pending presentation cues for the embedding layer
    pub fn drain_cues(&self) -> Vec<PresentationCue> {
        self.state.cues.drain()
    }
}
