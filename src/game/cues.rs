//! Presentation cues and duel outcome reporting
//!
//! The rules engine is synchronous and never sleeps; anything a UI would
//! animate is queued here as a typed cue for the embedding layer to drain
//! and pace however it likes.

use crate::core::CardName;
use crate::game::phase::Side;
use crate::zones::FieldZone;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;

/// Fire-and-forget animation/refresh requests
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PresentationCue {
    /// An attack was declared
    Attack {
        side: Side,
        attacker_slot: usize,
        target_slot: Option<usize>,
    },
    /// A card left the field for the graveyard
    Destruction {
        side: Side,
        zone: FieldZone,
        slot: usize,
    },
    /// Life points dropped
    Damage { side: Side, amount: i32 },
    /// Full board refresh requested
    Refresh,
    /// The duel is over
    DuelOver(DuelOutcome),
}

/// End-of-duel statistics, from the player's perspective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatistics {
    pub turns: u32,
    pub player_final_lp: i32,
    pub opponent_final_lp: i32,
    /// Strongest monster the player fielded, temporary boosts excluded
    pub mvp_card: Option<CardName>,
}

/// Terminal result of a duel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub winner: Side,
    /// Credits awarded for a player win (0 on loss or in tutorial mode)
    pub reward: u32,
    pub stats: MatchStatistics,
}

impl DuelOutcome {
    pub fn player_won(&self) -> bool {
        self.winner == Side::Player
    }
}

/// FIFO queue of presentation cues
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CueQueue {
    cues: RefCell<Vec<PresentationCue>>,
}

impl CueQueue {
    pub fn new() -> Self {
        CueQueue::default()
    }

    pub fn push(&self, cue: PresentationCue) {
        self.cues.borrow_mut().push(cue);
    }

    /// Remove and return all pending cues in emission order
    pub fn drain(&self) -> Vec<PresentationCue> {
        std::mem::take(&mut *self.cues.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.cues.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.borrow().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drain_order() {
        let queue = CueQueue::new();
        queue.push(PresentationCue::Refresh);
        queue.push(PresentationCue::Damage {
            side: Side::Opponent,
            amount: 600,
        });

        let cues = queue.drain();
        assert_eq!(cues.len(), 2);
        assert_eq!(cues[0], PresentationCue::Refresh);
        assert!(queue.is_empty());
    }
}
