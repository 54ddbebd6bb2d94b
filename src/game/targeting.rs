//! Pending-target sub-state for manually targeted spells
//!
//! Activating a spell that needs a player-chosen target does not resolve it
//! immediately; the match enters `AwaitingTarget` and every other action is
//! rejected until `select_target` lands on a valid slot (resolving the
//! effect) or an invalid one (cancelling it). An explicit tagged value, not
//! a stored closure.

use crate::game::phase::Side;
use serde::{Deserialize, Serialize};

/// Where the pending spell is waiting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpellOrigin {
    Hand { index: usize },
    Field { slot: usize },
}

/// What happens once a target slot is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetAction {
    /// Boost the chosen friendly monster's attack until end of turn
    BoostMonster { amount: i32 },
}

/// The targeting state machine: idle, or holding one in-flight effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetingState {
    #[default]
    Idle,
    AwaitingTarget {
        side: Side,
        origin: SpellOrigin,
        action: TargetAction,
    },
}

impl TargetingState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TargetingState::AwaitingTarget { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_detection() {
        assert!(!TargetingState::Idle.is_pending());
        let pending = TargetingState::AwaitingTarget {
            side: Side::Player,
            origin: SpellOrigin::Hand { index: 0 },
            action: TargetAction::BoostMonster { amount: 1000 },
        };
        assert!(pending.is_pending());
    }
}
