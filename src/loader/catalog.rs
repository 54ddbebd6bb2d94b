//! Card catalog loading
//!
//! Catalog records arrive as JSON (or the builtin set) with string effect
//! descriptors; parsing happens once here, producing typed
//! `CardDefinition`s the engine dispatches on without ever re-reading the
//! text. Unrecognized handler keys load the card without an effect and are
//! reported as load warnings.
//!
//! Descriptor grammar, by example:
//!   `(Handler: onSummon) -> search ('core')`
//!   `-> boost (1000)`
//!   `(Handler: direct_attack_declaration) -> negateAndEndPhase`

use crate::core::{
    CardDefinition, CardEffect, CardInstance, CardKind, CardName, EffectKind, EffectTrigger, Tag,
    TrapTrigger,
};
use crate::{DuelError, Result};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::path::Path;
use std::sync::Arc;

/// One raw catalog record as supplied externally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardRecord {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub atk: i32,
    #[serde(default)]
    pub def: i32,
    #[serde(default)]
    pub level: u8,
    #[serde(default)]
    pub effect: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Immutable card-definition table with a name index
#[derive(Debug, Clone)]
pub struct CardCatalog {
    cards: Vec<Arc<CardDefinition>>,
    by_name: FxHashMap<String, usize>,
    /// Non-fatal problems found while parsing effect descriptors
    pub load_warnings: Vec<String>,
}

impl CardCatalog {
    pub fn from_records(records: Vec<CardRecord>) -> Result<Self> {
        let mut cards = Vec::with_capacity(records.len());
        let mut by_name = FxHashMap::default();
        let mut load_warnings = Vec::new();

        for record in records {
            let def = parse_record(&record, &mut load_warnings)?;
            let index = cards.len();
            if by_name.insert(def.name.as_str().to_string(), index).is_some() {
                return Err(DuelError::InvalidCardFormat(format!(
                    "duplicate card name: {}",
                    def.name
                )));
            }
            cards.push(Arc::new(def));
        }

        Ok(CardCatalog {
            cards,
            by_name,
            load_warnings,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<CardRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<CardDefinition>> {
        self.by_name.get(name).map(|&index| &self.cards[index])
    }

    /// Create a fresh playable copy of a card
    pub fn instantiate(&self, name: &str) -> Result<CardInstance> {
        self.get(name)
            .map(|def| CardInstance::new(def.clone()))
            .ok_or_else(|| DuelError::UnknownCard(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<CardDefinition>> {
        self.cards.iter()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// The self-contained default card set used by the CLI, benches, and
    /// tests. Covers every effect kind and trap trigger.
    pub fn builtin() -> Self {
        let defs = builtin_definitions();
        let mut cards = Vec::with_capacity(defs.len());
        let mut by_name = FxHashMap::default();
        for def in defs {
            by_name.insert(def.name.as_str().to_string(), cards.len());
            cards.push(Arc::new(def));
        }
        CardCatalog {
            cards,
            by_name,
            load_warnings: Vec::new(),
        }
    }
}

fn parse_record(record: &CardRecord, warnings: &mut Vec<String>) -> Result<CardDefinition> {
    let kind = match record.kind.as_str() {
        "monster" => CardKind::Monster,
        "spell" => CardKind::Spell,
        "trap" => CardKind::Trap,
        other => {
            return Err(DuelError::InvalidCardFormat(format!(
                "{}: unknown card type '{other}'",
                record.name
            )))
        }
    };
    if record.name.trim().is_empty() {
        return Err(DuelError::InvalidCardFormat("missing card name".to_string()));
    }

    let (effect, trap_trigger) = parse_effect_descriptor(&record.name, &record.effect, warnings);

    Ok(CardDefinition {
        name: CardName::new(record.name.clone()),
        kind,
        attack: record.atk,
        defense: record.def,
        level: record.level,
        effect,
        trap_trigger,
        tags: record.tags.iter().map(|tag| Tag::new(tag.as_str())).collect(),
        text: record.effect.clone(),
    })
}

/// Extract handler key, trigger annotation, and literal parameter from a
/// descriptor string, then map them onto the typed effect set.
pub fn parse_effect_descriptor(
    card_name: &str,
    text: &str,
    warnings: &mut Vec<String>,
) -> (Option<CardEffect>, Option<TrapTrigger>) {
    let Some(handler) = scan_handler_key(text) else {
        return (None, None);
    };
    let (trigger, param) = scan_annotations(text);

    let (effect_trigger, trap_trigger) = match trigger.as_deref() {
        None => (EffectTrigger::OnActivate, None),
        Some("onSummon") => (EffectTrigger::OnSummon, None),
        Some("onThisCardDestroyed") => (EffectTrigger::OnThisCardDestroyed, None),
        Some("onSentToGY") => (EffectTrigger::OnSentToGraveyard, None),
        Some("direct_attack_declaration") => (
            EffectTrigger::OnActivate,
            Some(TrapTrigger::DirectAttackDeclaration),
        ),
        Some("attack_declaration") => {
            (EffectTrigger::OnActivate, Some(TrapTrigger::AttackDeclaration))
        }
        Some("special_summon") => (EffectTrigger::OnActivate, Some(TrapTrigger::SpecialSummon)),
        Some("summon") => (EffectTrigger::OnActivate, Some(TrapTrigger::Summon)),
        Some("spell_target") => (EffectTrigger::OnActivate, Some(TrapTrigger::SpellTarget)),
        Some(other) => {
            warnings.push(format!("{card_name}: unknown trigger '{other}'"));
            (EffectTrigger::OnActivate, None)
        }
    };

    let amount = param.as_deref().and_then(|p| p.parse::<i32>().ok());
    let tag = || Tag::new(param.clone().unwrap_or_default());

    let kind = match handler.as_str() {
        "applyPiercing" => Some(EffectKind::Piercing),
        "search" => Some(EffectKind::SearchByTag { tag: tag() }),
        "searchOrDraw" => Some(EffectKind::SearchByTagOrDraw { tag: tag() }),
        "weakenStrongest" => Some(EffectKind::WeakenStrongest {
            amount: amount.unwrap_or(500),
        }),
        "negateAndEndPhase" => Some(EffectKind::NegateAttackEndBattle),
        "drawTwo" => Some(EffectKind::DrawCards { count: 2 }),
        "revive" => Some(EffectKind::ReviveWeakest),
        "boost" => Some(EffectKind::BoostTarget {
            amount: amount.unwrap_or(1000),
        }),
        "halveAtk" => Some(EffectKind::HalveStrongestAtk),
        "stealControl" => Some(EffectKind::StealStrongest),
        "resetHands" => Some(EffectKind::ResetHands {
            redraw: amount.map(|a| a as u8).unwrap_or(4),
        }),
        "recoverFromGrave" => Some(EffectKind::RecoverStrongestFromGraveyard),
        "preventAttack" => Some(EffectKind::DisableNewestAttacker),
        "tributeBonus" => Some(EffectKind::TributeSummonBonus {
            amount: amount.unwrap_or(300),
        }),
        "negate" => Some(EffectKind::Negate),
        "massDestroySpellsTraps" => Some(EffectKind::DestroyAllSpellTraps),
        "weakenAttacker" => Some(EffectKind::WeakenAttacker {
            amount: amount.unwrap_or(800),
        }),
        other => {
            warnings.push(format!("{card_name}: unknown effect handler '{other}'"));
            None
        }
    };

    (
        kind.map(|kind| CardEffect {
            trigger: effect_trigger,
            kind,
        }),
        trap_trigger,
    )
}

/// The word following `->`
fn scan_handler_key(text: &str) -> Option<String> {
    let rest = text.split("->").nth(1)?;
    let key: String = rest
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    if key.is_empty() {
        None
    } else {
        Some(key)
    }
}

/// Parenthesized annotations: `(Handler: name)` names the trigger, any
/// other group is the literal parameter (quotes stripped)
fn scan_annotations(text: &str) -> (Option<String>, Option<String>) {
    let mut trigger = None;
    let mut param = None;
    let mut rest = text;
    while let Some(start) = rest.find('(') {
        let Some(len) = rest[start..].find(')') else {
            break;
        };
        let inner = &rest[start + 1..start + len];
        if let Some(name) = inner.strip_prefix("Handler:") {
            trigger = Some(name.trim().to_string());
        } else if param.is_none() {
            param = Some(inner.trim().trim_matches('\'').to_string());
        }
        rest = &rest[start + len + 1..];
    }
    (trigger, param)
}

#[allow(clippy::too_many_arguments)]
fn def(
    name: &str,
    kind: CardKind,
    atk: i32,
    defense: i32,
    level: u8,
    effect: Option<CardEffect>,
    trap_trigger: Option<TrapTrigger>,
    tags: &[&str],
    text: &str,
) -> CardDefinition {
    CardDefinition {
        name: CardName::new(name),
        kind,
        attack: atk,
        defense,
        level,
        effect,
        trap_trigger,
        tags: tags.iter().map(|t| Tag::new(*t)).collect::<SmallVec<_>>(),
        text: text.to_string(),
    }
}

fn monster(
    name: &str,
    atk: i32,
    defense: i32,
    level: u8,
    effect: Option<CardEffect>,
    tags: &[&str],
    text: &str,
) -> CardDefinition {
    def(name, CardKind::Monster, atk, defense, level, effect, None, tags, text)
}

fn spell(name: &str, kind: EffectKind, text: &str) -> CardDefinition {
    def(
        name,
        CardKind::Spell,
        0,
        0,
        0,
        Some(CardEffect::activated(kind)),
        None,
        &[],
        text,
    )
}

fn trap(
    name: &str,
    kind: EffectKind,
    trap_trigger: Option<TrapTrigger>,
    text: &str,
) -> CardDefinition {
    def(
        name,
        CardKind::Trap,
        0,
        0,
        0,
        Some(CardEffect::activated(kind)),
        trap_trigger,
        &[],
        text,
    )
}

/// The builtin card set. The `text` fields carry the same descriptor
/// grammar external catalogs use; a test pins text and typed form against
/// each other.
fn builtin_definitions() -> Vec<CardDefinition> {
    vec![
        // --- monsters ---
        monster(
            "Core Warden",
            1400,
            1200,
            3,
            Some(CardEffect {
                trigger: EffectTrigger::OnSummon,
                kind: EffectKind::SearchByTag {
                    tag: Tag::new("core"),
                },
            }),
            &["core"],
            "(Handler: onSummon) -> search ('core')",
        ),
        monster("Cipher Runner", 1600, 800, 4, None, &["grid"], ""),
        monster("Glitch Basilisk", 900, 600, 2, None, &["glitch"], ""),
        monster(
            "Static Banshee",
            1100,
            700,
            3,
            Some(CardEffect {
                trigger: EffectTrigger::OnThisCardDestroyed,
                kind: EffectKind::WeakenAttacker { amount: 800 },
            }),
            &["grid"],
            "(Handler: onThisCardDestroyed) -> weakenAttacker (800)",
        ),
        monster("Phantom Sentinel", 800, 1800, 3, None, &["core"], ""),
        monster(
            "Data Golem",
            1800,
            1600,
            5,
            Some(CardEffect::activated(EffectKind::Piercing)),
            &["core"],
            "-> applyPiercing",
        ),
        monster("Vortex Invader", 1900, 1100, 5, None, &["glitch"], ""),
        monster(
            "Battle Colossus",
            2600,
            2100,
            7,
            Some(CardEffect {
                trigger: EffectTrigger::OnSummon,
                kind: EffectKind::TributeSummonBonus { amount: 300 },
            }),
            &[],
            "(Handler: onSummon) -> tributeBonus (300)",
        ),
        // --- spells ---
        spell(
            "Overclock Protocol",
            EffectKind::BoostTarget { amount: 1000 },
            "-> boost (1000)",
        ),
        spell(
            "Plasma Surge",
            EffectKind::BoostTarget { amount: 700 },
            "-> boost (700)",
        ),
        spell(
            "Data Recovery",
            EffectKind::RecoverStrongestFromGraveyard,
            "-> recoverFromGrave",
        ),
        spell(
            "Archive Access",
            EffectKind::SearchByTagOrDraw {
                tag: Tag::new("core"),
            },
            "-> searchOrDraw ('core')",
        ),
        spell("Neural Override", EffectKind::StealStrongest, "-> stealControl"),
        spell("Reality Distortion", EffectKind::HalveStrongestAtk, "-> halveAtk"),
        spell("Nanobot Swarm", EffectKind::ReviveWeakest, "-> revive"),
        spell(
            "System Shock",
            EffectKind::WeakenStrongest { amount: 500 },
            "-> weakenStrongest (500)",
        ),
        spell("Twin Protocol", EffectKind::DrawCards { count: 2 }, "-> drawTwo"),
        spell(
            "Memory Purge",
            EffectKind::ResetHands { redraw: 4 },
            "-> resetHands (4)",
        ),
        // --- traps ---
        trap(
            "Global EMP",
            EffectKind::DestroyAllSpellTraps,
            None,
            "-> massDestroySpellsTraps",
        ),
        trap(
            "Panic Switch",
            EffectKind::NegateAttackEndBattle,
            Some(TrapTrigger::DirectAttackDeclaration),
            "(Handler: direct_attack_declaration) -> negateAndEndPhase",
        ),
        trap(
            "Emergency Firewall",
            EffectKind::Negate,
            Some(TrapTrigger::SpellTarget),
            "(Handler: spell_target) -> negate",
        ),
        trap(
            "Disintegration Vortex",
            EffectKind::Negate,
            Some(TrapTrigger::SpecialSummon),
            "(Handler: special_summon) -> negate",
        ),
        trap(
            "Containment Grid",
            EffectKind::DisableNewestAttacker,
            Some(TrapTrigger::Summon),
            "(Handler: summon) -> preventAttack",
        ),
        trap(
            "Ambush Grid",
            EffectKind::WeakenAttacker { amount: 800 },
            Some(TrapTrigger::AttackDeclaration),
            "(Handler: attack_declaration) -> weakenAttacker (800)",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_lookup() {
        let catalog = CardCatalog::builtin();
        assert!(catalog.len() >= 24);
        assert!(catalog.load_warnings.is_empty());

        let colossus = catalog.get("Battle Colossus").unwrap();
        assert_eq!(colossus.attack, 2600);
        assert_eq!(colossus.required_tributes(), 2);

        assert!(catalog.get("No Such Card").is_none());
        assert!(catalog.instantiate("No Such Card").is_err());
    }

    #[test]
    fn test_descriptor_parsing_matches_builtin_typed_effects() {
        // Every builtin card with descriptor text must parse back to its
        // typed effect; this pins the parser and the builtin set together.
        let catalog = CardCatalog::builtin();
        for card in catalog.iter() {
            if card.text.is_empty() {
                continue;
            }
            let mut warnings = Vec::new();
            let (effect, trap_trigger) =
                parse_effect_descriptor(card.name.as_str(), &card.text, &mut warnings);
            assert!(warnings.is_empty(), "{}: {warnings:?}", card.name);
            assert_eq!(effect, card.effect, "effect mismatch on {}", card.name);
            assert_eq!(
                trap_trigger, card.trap_trigger,
                "trigger mismatch on {}",
                card.name
            );
        }
    }

    #[test]
    fn test_json_catalog_roundtrip() {
        let json = r#"[
            {"name": "Test Dragon", "type": "monster", "atk": 2400, "def": 2000,
             "level": 7, "effect": "(Handler: onSummon) -> tributeBonus (300)", "tags": ["dragon"]},
            {"name": "Test Draw", "type": "spell", "effect": "-> drawTwo"}
        ]"#;
        let catalog = CardCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.len(), 2);

        let dragon = catalog.get("Test Dragon").unwrap();
        assert_eq!(
            dragon.effect,
            Some(CardEffect {
                trigger: EffectTrigger::OnSummon,
                kind: EffectKind::TributeSummonBonus { amount: 300 },
            })
        );
        assert!(dragon.has_tag(&Tag::new("dragon")));

        let draw = catalog.get("Test Draw").unwrap();
        assert_eq!(
            draw.effect,
            Some(CardEffect::activated(EffectKind::DrawCards { count: 2 }))
        );
    }

    #[test]
    fn test_unknown_handler_warns_and_loads_without_effect() {
        let json = r#"[
            {"name": "Mystery", "type": "spell", "effect": "-> doTheImpossible"}
        ]"#;
        let catalog = CardCatalog::from_json_str(json).unwrap();
        assert_eq!(catalog.load_warnings.len(), 1);
        assert!(catalog.load_warnings[0].contains("doTheImpossible"));
        assert!(catalog.get("Mystery").unwrap().effect.is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let json = r#"[
            {"name": "Twin", "type": "spell", "effect": "-> drawTwo"},
            {"name": "Twin", "type": "spell", "effect": "-> drawTwo"}
        ]"#;
        assert!(CardCatalog::from_json_str(json).is_err());
    }

    #[test]
    fn test_unknown_card_type_rejected() {
        let json = r#"[{"name": "Weird", "type": "ritual"}]"#;
        assert!(CardCatalog::from_json_str(json).is_err());
    }
}
