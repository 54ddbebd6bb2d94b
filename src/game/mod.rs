//! Duel state, turn structure, battle resolution, effects, and strategy

pub mod battle;
pub mod cues;
pub mod effect_engine;
pub mod engine;
pub mod logger;
pub mod phase;
pub mod state;
pub mod strategy;
pub mod targeting;

pub use cues::{CueQueue, DuelOutcome, MatchStatistics, PresentationCue};
pub use effect_engine::{CardLocation, EffectContext};
pub use engine::{DuelConfig, DuelEngine};
pub use logger::{DuelLogger, LogEntry, LogGuard, LogKind, OutputMode, VerbosityLevel};
pub use phase::{Phase, Side, TurnState};
pub use state::{DuelState, VICTORY_REWARD};
pub use strategy::{Difficulty, OpponentStrategy};
pub use targeting::{SpellOrigin, TargetAction, TargetingState};
