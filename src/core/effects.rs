//! Card effects as a closed, typed variant set
//!
//! Effect descriptors are parsed once at catalog load (see
//! `loader::catalog`) into these enums; the resolution engine dispatches on
//! the variants and never re-parses strings at play time.

use crate::core::Tag;
use serde::{Deserialize, Serialize};

/// When a card's effect resolves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTrigger {
    /// Resolves when the spell/trap is deliberately activated
    OnActivate,
    /// Resolves when the monster is normal-summoned
    OnSummon,
    /// Resolves when this card is destroyed in battle (attacker side)
    OnThisCardDestroyed,
    /// Resolves when this card is sent to the graveyard (defender side)
    OnSentToGraveyard,
}

/// Events a face-down trap can respond to
///
/// The first face-down trap of the non-active duelist whose trigger matches
/// is revealed, discarded, and resolved against the acting duelist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrapTrigger {
    DirectAttackDeclaration,
    AttackDeclaration,
    SpecialSummon,
    Summon,
    SpellTarget,
}

/// The closed set of effect behaviors
///
/// Every card effect in the catalog is one of these variants. Amounts are
/// fixed per card at load time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    /// Passive marker: battle damage against defense position carries over
    Piercing,
    /// Move the first deck card carrying `tag` to the owner's hand
    SearchByTag { tag: Tag },
    /// As `SearchByTag`, but draw one card when no match is found
    SearchByTagOrDraw { tag: Tag },
    /// Lower the strongest opposing monster's attack
    WeakenStrongest { amount: i32 },
    /// Cancel the incoming attack and end the battle phase
    NegateAttackEndBattle,
    /// Owner draws cards
    DrawCards { count: u8 },
    /// Return the strongest level<=4 monster from the owner's graveyard to
    /// the field in defense position
    ReviveWeakest,
    /// Raise a chosen friendly monster's attack until end of turn
    BoostTarget { amount: i32 },
    /// Halve the strongest opposing monster's attack
    HalveStrongestAtk,
    /// Move the strongest opposing monster to the owner's field
    StealStrongest,
    /// Both duelists discard their hands and draw anew
    ResetHands { redraw: u8 },
    /// Return the strongest monster from the owner's graveyard to hand
    RecoverStrongestFromGraveyard,
    /// The opponent's most recently placed monster cannot attack next turn
    DisableNewestAttacker,
    /// Permanent attack bonus when the summoned monster is level 5 or higher
    TributeSummonBonus { amount: i32 },
    /// Pure negation: the responded-to action is aborted, nothing else
    Negate,
    /// Send every spell/trap card on both fields to the graveyard
    DestroyAllSpellTraps,
    /// Lower the attacking monster's attack
    WeakenAttacker { amount: i32 },
}

impl EffectKind {
    /// Effects that suspend activation until the player picks a field slot
    pub fn needs_manual_target(&self) -> bool {
        matches!(self, EffectKind::BoostTarget { .. })
    }
}

/// A card's effect: trigger condition plus behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardEffect {
    pub trigger: EffectTrigger,
    pub kind: EffectKind,
}

impl CardEffect {
    pub fn activated(kind: EffectKind) -> Self {
        CardEffect {
            trigger: EffectTrigger::OnActivate,
            kind,
        }
    }
}
