//! Per-combatant volatile tags.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::trace;

use super::{LapseTiming, TagAddResult};
use crate::battle::Battle;
use crate::events::{BattleEvent, CancelReason, DamageSource};
use crate::moves::{MoveCategory, MoveId};
use crate::pipeline::formula;
use crate::state::{BattleStat, BattlerIndex, CombatantId};
use crate::types::Type;

/// Power of the typeless self-hit when confused
const CONFUSION_POWER: u32 = 40;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlerTagKind {
    Flinched,
    Confused,
    Seeded,
    /// Semi-invulnerable: Dig
    Underground,
    /// Semi-invulnerable: Fly
    Flying,
    /// Holding a two-turn move between its charge and attack turns
    Charging,
    Protected,
    Substitute,
    FocusEnergy,
    Minimized,
    Charged,
    FlashFire,
    HelpingHand,
    Taunted,
    MagnetRisen,
    Stockpiling,
    CenterOfAttention,
}

impl BattlerTagKind {
    pub const ALL: [BattlerTagKind; 17] = [
        BattlerTagKind::Flinched,
        BattlerTagKind::Confused,
        BattlerTagKind::Seeded,
        BattlerTagKind::Underground,
        BattlerTagKind::Flying,
        BattlerTagKind::Charging,
        BattlerTagKind::Protected,
        BattlerTagKind::Substitute,
        BattlerTagKind::FocusEnergy,
        BattlerTagKind::Minimized,
        BattlerTagKind::Charged,
        BattlerTagKind::FlashFire,
        BattlerTagKind::HelpingHand,
        BattlerTagKind::Taunted,
        BattlerTagKind::MagnetRisen,
        BattlerTagKind::Stockpiling,
        BattlerTagKind::CenterOfAttention,
    ];

    /// Buckets in which this kind lapses.
    pub const fn lapse_timings(self) -> &'static [LapseTiming] {
        use BattlerTagKind::*;
        match self {
            Flinched => &[LapseTiming::PreMove, LapseTiming::TurnEnd],
            Confused => &[LapseTiming::PreMove],
            Charged => &[LapseTiming::AfterMove],
            Seeded | Protected | HelpingHand | Taunted | MagnetRisen | CenterOfAttention => {
                &[LapseTiming::TurnEnd]
            }
            Underground | Flying | Charging | Substitute | FocusEnergy | Minimized | FlashFire
            | Stockpiling => &[LapseTiming::Custom],
        }
    }

    /// Turns a fresh instance lasts (0 = until removed).
    pub const fn default_turns(self) -> u8 {
        use BattlerTagKind::*;
        match self {
            Flinched | Protected | HelpingHand | CenterOfAttention => 1,
            Taunted => 3,
            MagnetRisen => 5,
            Confused => 4,
            _ => 0,
        }
    }

    pub const fn is_stackable(self) -> bool {
        matches!(self, BattlerTagKind::Stockpiling)
    }

    pub const fn max_layers(self) -> u8 {
        match self {
            BattlerTagKind::Stockpiling => 3,
            _ => 0,
        }
    }

    pub const fn is_semi_invulnerable(self) -> bool {
        matches!(self, BattlerTagKind::Underground | BattlerTagKind::Flying)
    }
}

/// Extra data carried by some tag kinds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "payload", rename_all = "snake_case")]
pub enum TagPayload {
    #[default]
    None,
    Substitute { hp: u16 },
    TypeBoost { ty: Type, multiplier: f32 },
    Charging {
        move_id: MoveId,
        targets: SmallVec<[BattlerIndex; 4]>,
    },
}

/// One volatile tag instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattlerTag {
    pub kind: BattlerTagKind,
    /// 0 = until removed
    pub turns_left: u8,
    pub layers: u8,
    pub source: Option<CombatantId>,
    pub source_move: Option<MoveId>,
    #[serde(flatten)]
    pub payload: TagPayload,
}

impl BattlerTag {
    pub fn new(kind: BattlerTagKind) -> Self {
        Self {
            kind,
            turns_left: kind.default_turns(),
            layers: 1,
            source: None,
            source_move: None,
            payload: TagPayload::None,
        }
    }

    pub fn with_turns(mut self, turns: u8) -> Self {
        self.turns_left = turns;
        self
    }

    pub fn with_source(mut self, source: CombatantId, source_move: Option<MoveId>) -> Self {
        self.source = Some(source);
        self.source_move = source_move;
        self
    }

    pub fn with_payload(mut self, payload: TagPayload) -> Self {
        self.payload = payload;
        self
    }

    /// Type-boost carried by this tag, if any.
    pub fn type_boost(&self) -> Option<(Type, f64)> {
        match self.payload {
            TagPayload::TypeBoost { ty, multiplier } => Some((ty, f64::from(multiplier))),
            _ => None,
        }
    }

    /// Decrement the turn counter. Returns whether the tag is still active.
    fn tick(&mut self) -> bool {
        if self.turns_left == 0 {
            return true;
        }
        self.turns_left -= 1;
        self.turns_left > 0
    }
}

/// A combatant's tag set: at most one instance per kind.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BattlerTags {
    tags: SmallVec<[BattlerTag; 4]>,
}

impl BattlerTags {
    pub fn get(&self, kind: BattlerTagKind) -> Option<&BattlerTag> {
        self.tags.iter().find(|t| t.kind == kind)
    }

    pub fn get_mut(&mut self, kind: BattlerTagKind) -> Option<&mut BattlerTag> {
        self.tags.iter_mut().find(|t| t.kind == kind)
    }

    #[inline]
    pub fn has(&self, kind: BattlerTagKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BattlerTag> {
        self.tags.iter()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn count(&self, kind: BattlerTagKind) -> usize {
        self.tags.iter().filter(|t| t.kind == kind).count()
    }

    pub fn semi_invulnerable(&self) -> Option<BattlerTagKind> {
        self.tags
            .iter()
            .map(|t| t.kind)
            .find(|k| k.is_semi_invulnerable())
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    fn insert(&mut self, tag: BattlerTag) {
        debug_assert!(!self.has(tag.kind));
        self.tags.push(tag);
    }

    fn remove(&mut self, kind: BattlerTagKind) -> Option<BattlerTag> {
        let pos = self.tags.iter().position(|t| t.kind == kind)?;
        Some(self.tags.remove(pos))
    }

    fn kinds_lapsing_at(&self, timing: LapseTiming) -> SmallVec<[BattlerTagKind; 4]> {
        self.tags
            .iter()
            .map(|t| t.kind)
            .filter(|k| k.lapse_timings().contains(&timing))
            .collect()
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

/// Add a tag to `owner`, running `on_add` or `on_overlap`.
pub fn add_tag(
    battle: &mut Battle,
    owner: CombatantId,
    tag: BattlerTag,
    simulated: bool,
) -> TagAddResult {
    let kind = tag.kind;
    if let Some(existing) = battle.combatant(owner).tags.get(kind) {
        let layers = existing.layers;
        return on_overlap(battle, owner, kind, layers, simulated);
    }
    if simulated {
        return TagAddResult::Added;
    }
    trace!(?owner, ?kind, "battler tag added");
    battle.combatant_mut(owner).tags.insert(tag);
    battle.emit(BattleEvent::TagAdded { target: owner, tag: kind }, false);
    TagAddResult::Added
}

fn on_overlap(
    battle: &mut Battle,
    owner: CombatantId,
    kind: BattlerTagKind,
    layers: u8,
    simulated: bool,
) -> TagAddResult {
    if kind.is_stackable() && layers < kind.max_layers() {
        if !simulated {
            if let Some(tag) = battle.combatant_mut(owner).tags.get_mut(kind) {
                tag.layers += 1;
            }
            battle.emit(
                BattleEvent::TagStacked { target: owner, tag: kind, layers: layers + 1 },
                false,
            );
        }
        return TagAddResult::Stacked(layers + 1);
    }
    battle.emit(BattleEvent::TagRefused { target: owner, tag: kind }, simulated);
    TagAddResult::Refused
}

/// Remove a tag from `owner`, running `on_remove`. Returns whether it was present.
pub fn remove_tag(
    battle: &mut Battle,
    owner: CombatantId,
    kind: BattlerTagKind,
    simulated: bool,
) -> bool {
    if simulated {
        return battle.combatant(owner).tags.has(kind);
    }
    match battle.combatant_mut(owner).tags.remove(kind) {
        Some(_) => {
            trace!(?owner, ?kind, "battler tag removed");
            battle.emit(BattleEvent::TagRemoved { target: owner, tag: kind }, false);
            true
        }
        None => false,
    }
}

/// Lapse every tag of `owner` registered for `timing`.
pub fn lapse_tags(battle: &mut Battle, owner: CombatantId, timing: LapseTiming) {
    let kinds = battle.combatant(owner).tags.kinds_lapsing_at(timing);
    for kind in kinds {
        let Some(mut tag) = battle.combatant(owner).tags.get(kind).cloned() else {
            continue;
        };
        if lapse(battle, owner, &mut tag, timing) {
            if let Some(slot) = battle.combatant_mut(owner).tags.get_mut(kind) {
                *slot = tag;
            }
        } else {
            remove_tag(battle, owner, kind, false);
        }
        if battle.combatant(owner).is_fainted() {
            break;
        }
    }
}

/// Run one lapse. `false` means the tag expired.
fn lapse(battle: &mut Battle, owner: CombatantId, tag: &mut BattlerTag, timing: LapseTiming) -> bool {
    match (tag.kind, timing) {
        (BattlerTagKind::Flinched, LapseTiming::PreMove) => {
            battle.combatant_mut(owner).turn_data.cancel_reason = Some(CancelReason::Flinched);
            false
        }
        (BattlerTagKind::Confused, LapseTiming::PreMove) => {
            if !tag.tick() {
                battle.emit(
                    BattleEvent::Message { key: "battle:confusion_ended", subject: Some(owner) },
                    false,
                );
                return false;
            }
            if battle.rng.random_int(3) == 0 {
                confusion_self_hit(battle, owner);
            }
            true
        }
        (BattlerTagKind::Seeded, LapseTiming::TurnEnd) => {
            seed_drain(battle, owner, tag.source);
            true
        }
        (BattlerTagKind::Charged, LapseTiming::AfterMove) => {
            let used_electric = battle
                .combatant(owner)
                .last_move()
                .map(|r| {
                    let data = r.move_id.data();
                    data.move_type == Type::Electric && data.category != MoveCategory::Status
                })
                .unwrap_or(false);
            !used_electric
        }
        _ => tag.tick(),
    }
}

fn confusion_self_hit(battle: &mut Battle, owner: CombatantId) {
    let user = battle.combatant(owner);
    let attack = u32::from(user.boosted_stat(BattleStat::Atk));
    let defense = u32::from(user.boosted_stat(BattleStat::Def));
    let base = formula::get_base_damage(u32::from(user.level), CONFUSION_POWER, attack, defense);
    let roll = battle.rng.random_int(16) as u8;
    let damage = formula::apply_random_roll(base, roll).max(1);

    let target = battle.combatant_mut(owner);
    target.turn_data.cancel_reason = Some(CancelReason::Confused);
    let dealt = target.take_damage(damage);
    let hp_left = target.hp;
    battle.emit(
        BattleEvent::Damage {
            target: owner,
            amount: dealt,
            hp_left,
            source: DamageSource::Confusion,
        },
        false,
    );
    battle.check_faint(owner, false);
}

fn seed_drain(battle: &mut Battle, owner: CombatantId, source: Option<CombatantId>) {
    let Some(source) = source else { return };
    let seeded = battle.combatant(owner);
    if seeded.is_fainted() {
        return;
    }
    let amount = (u32::from(seeded.max_hp()) / 8).max(1);
    let target = battle.combatant_mut(owner);
    let dealt = target.take_damage(amount);
    let hp_left = target.hp;
    battle.emit(
        BattleEvent::Damage {
            target: owner,
            amount: dealt,
            hp_left,
            source: DamageSource::LeechSeed,
        },
        false,
    );
    if battle.combatant(source).is_active() {
        let healer = battle.combatant_mut(source);
        let healed = healer.heal(u32::from(dealt));
        let hp_left = healer.hp;
        if healed > 0 {
            battle.emit(BattleEvent::Heal { target: source, amount: healed, hp_left }, false);
        }
    }
    battle.check_faint(owner, false);
}
