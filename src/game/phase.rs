//! Turn phases and the per-turn structure

use serde::{Deserialize, Serialize};

/// The two seats at the table. `Player` is the locally driven duelist,
/// `Opponent` the strategy-driven one; the engine itself treats both
/// uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }
}

/// Phases of a turn, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Main1,
    Battle,
    Main2,
}

impl Phase {
    /// Next phase within the same turn
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Main1 => Some(Phase::Battle),
            Phase::Battle => Some(Phase::Main2),
            Phase::Main2 => None, // Turn end
        }
    }

    pub fn is_main(self) -> bool {
        matches!(self, Phase::Main1 | Phase::Main2)
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Main1 => "Main Phase 1",
            Phase::Battle => "Battle Phase",
            Phase::Main2 => "Main Phase 2",
        }
    }
}

/// Current turn structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number (starts at 1, increments at each turn end)
    pub turn_number: u32,

    /// Whose turn it is
    pub active: Side,

    /// Current phase
    pub phase: Phase,
}

impl TurnState {
    pub fn new(starting: Side) -> Self {
        TurnState {
            turn_number: 1,
            active: starting,
            phase: Phase::Main1,
        }
    }

    /// Start the next turn: hand over to the other duelist in Main 1
    pub fn next_turn(&mut self) {
        self.turn_number += 1;
        self.active = self.active.other();
        self.phase = Phase::Main1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_progression() {
        assert_eq!(Phase::Main1.next(), Some(Phase::Battle));
        assert_eq!(Phase::Battle.next(), Some(Phase::Main2));
        assert_eq!(Phase::Main2.next(), None);
        assert!(Phase::Main1.is_main());
        assert!(!Phase::Battle.is_main());
    }

    #[test]
    fn test_turn_alternation() {
        let mut turn = TurnState::new(Side::Player);
        assert_eq!(turn.turn_number, 1);
        assert_eq!(turn.active, Side::Player);

        turn.phase = Phase::Main2;
        turn.next_turn();
        assert_eq!(turn.turn_number, 2);
        assert_eq!(turn.active, Side::Opponent);
        assert_eq!(turn.phase, Phase::Main1);

        turn.next_turn();
        assert_eq!(turn.active, Side::Player);
    }

    #[test]
    fn test_side_other() {
        assert_eq!(Side::Player.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Player);
        assert_eq!(Side::Player.index(), 0);
        assert_eq!(Side::Opponent.index(), 1);
    }
}
