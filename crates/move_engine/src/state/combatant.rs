//! A single combatant's battle state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::{
    apply_stat_boost, BattleStat, CombatantId, PermanentStat, Side, StatusCondition, BOOST_STATS,
    MAX_MOVES, MAX_STAGE, MIN_STAGE,
};
use crate::abilities::AbilityId;
use crate::events::CancelReason;
use crate::items::ItemId;
use crate::moves::{MoveCategory, MoveId};
use crate::state::BattlerIndex;
use crate::tags::BattlerTags;
use crate::types::Type;

/// Remembered entries in a move history
const HISTORY_LEN: usize = 8;

/// A move slot with its remaining PP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveSlot {
    pub id: MoveId,
    pub pp: u8,
}

impl MoveSlot {
    pub fn new(id: MoveId) -> Self {
        Self { id, pp: id.data().pp }
    }
}

/// How a move use ended, as remembered in history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveResult {
    Success,
    Fail,
    Miss,
    NoEffect,
    /// Charge turn of a two-turn move
    Pending,
}

/// One entry of a combatant's move history.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub move_id: MoveId,
    pub targets: SmallVec<[BattlerIndex; 4]>,
    pub result: MoveResult,
    pub turn: u16,
}

/// A hit received this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackRecord {
    pub source: CombatantId,
    pub move_id: MoveId,
    pub category: MoveCategory,
    pub damage: u32,
}

/// Scratch data reset at the start of every turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnData {
    pub acted: bool,
    pub physical_damage_taken: u32,
    pub special_damage_taken: u32,
    /// Most recent first
    pub attackers: SmallVec<[AttackRecord; 2]>,
    pub stat_lowered: bool,
    pub stat_raised: bool,
    /// Set by pre-move checks (flinch, confusion, paralysis) to stop the move
    pub cancel_reason: Option<CancelReason>,
    /// Who inflicted the current status, when it landed this turn
    pub status_source: Option<CombatantId>,
}

impl TurnData {
    pub fn record_hit(&mut self, record: AttackRecord) {
        match record.category {
            MoveCategory::Physical => self.physical_damage_taken += record.damage,
            MoveCategory::Special => self.special_damage_taken += record.damage,
            MoveCategory::Status => {}
        }
        self.attackers.insert(0, record);
    }

    pub fn last_attacker(&self) -> Option<&AttackRecord> {
        self.attackers.first()
    }
}

/// Runtime state of one combatant.
#[derive(Clone, Debug)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    /// Field slot while active, `None` while benched
    pub field_slot: Option<u8>,
    pub level: u8,
    pub types: (Type, Option<Type>),
    /// [HP, Atk, Def, SpA, SpD, Spe]
    pub stats: [u16; 6],
    pub hp: u16,
    /// Weight in kilograms
    pub weight: f32,
    pub ability: AbilityId,
    pub item: ItemId,
    pub moveset: SmallVec<[MoveSlot; MAX_MOVES]>,
    pub status: Option<StatusCondition>,
    pub stat_stages: [i8; BOOST_STATS],
    pub tags: BattlerTags,
    /// Most recent first
    pub move_history: SmallVec<[MoveRecord; HISTORY_LEN]>,
    pub turn_data: TurnData,

    // Per-battle overrides
    pub ability_override: Option<AbilityId>,
    pub ability_suppressed: bool,
    pub types_override: Option<(Type, Option<Type>)>,
    pub tera_type: Option<Type>,
    pub terastallized: bool,
    pub active_turns: u16,
}

impl Combatant {
    #[inline]
    pub fn max_hp(&self) -> u16 {
        self.stats[PermanentStat::Hp as usize]
    }

    #[inline]
    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    /// On the field and able to act.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.field_slot.is_some() && !self.is_fainted()
    }

    pub fn battler_index(&self) -> Option<BattlerIndex> {
        self.field_slot.map(|slot| BattlerIndex::from_side_slot(self.side, slot))
    }

    /// Ability currently in effect, honoring override and suppression.
    pub fn effective_ability(&self) -> AbilityId {
        if self.ability_suppressed {
            return AbilityId::Noability;
        }
        self.ability_override.unwrap_or(self.ability)
    }

    pub fn has_ability(&self, ability: AbilityId) -> bool {
        self.effective_ability() == ability
    }

    /// Current types: tera type replaces both when terastallized.
    pub fn current_types(&self) -> (Type, Option<Type>) {
        if self.terastallized {
            if let Some(tera) = self.tera_type {
                return (tera, None);
            }
        }
        self.types_override.unwrap_or(self.types)
    }

    pub fn has_type(&self, ty: Type) -> bool {
        let (t1, t2) = self.current_types();
        t1 == ty || t2 == Some(ty)
    }

    /// Types before terastallization, used for STAB.
    pub fn original_types(&self) -> (Type, Option<Type>) {
        self.types_override.unwrap_or(self.types)
    }

    #[inline]
    pub fn stat(&self, stat: PermanentStat) -> u16 {
        self.stats[stat as usize]
    }

    #[inline]
    pub fn stage(&self, stat: BattleStat) -> i8 {
        self.stat_stages[stat as usize]
    }

    /// Permanent stat with its stage applied.
    pub fn boosted_stat(&self, stat: BattleStat) -> u16 {
        match stat.permanent() {
            Some(permanent) => apply_stat_boost(self.stat(permanent), self.stage(stat)),
            None => 0,
        }
    }

    /// Change a stat stage, clamped to the legal range. Returns the applied delta.
    pub fn change_stage(&mut self, stat: BattleStat, delta: i8) -> i8 {
        let current = self.stat_stages[stat as usize];
        let next = current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE);
        self.stat_stages[stat as usize] = next;
        let applied = next - current;
        if applied < 0 {
            self.turn_data.stat_lowered = true;
        } else if applied > 0 {
            self.turn_data.stat_raised = true;
        }
        applied
    }

    /// Delta that `change_stage` would apply, without mutating.
    pub fn stage_room(&self, stat: BattleStat, delta: i8) -> i8 {
        let current = self.stat_stages[stat as usize];
        current.saturating_add(delta).clamp(MIN_STAGE, MAX_STAGE) - current
    }

    pub fn hp_ratio(&self) -> f64 {
        let max = self.max_hp();
        if max == 0 {
            0.0
        } else {
            f64::from(self.hp) / f64::from(max)
        }
    }

    pub fn is_full_hp(&self) -> bool {
        self.hp == self.max_hp()
    }

    /// Subtract HP. Returns damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u16 {
        let dealt = amount.min(u32::from(self.hp)) as u16;
        self.hp -= dealt;
        dealt
    }

    /// Restore HP up to the maximum. Returns HP actually restored.
    pub fn heal(&mut self, amount: u32) -> u16 {
        let missing = self.max_hp() - self.hp;
        let healed = amount.min(u32::from(missing)) as u16;
        self.hp += healed;
        healed
    }

    pub fn last_move(&self) -> Option<&MoveRecord> {
        self.move_history.first()
    }

    pub fn push_move_record(&mut self, record: MoveRecord) {
        if self.move_history.len() == HISTORY_LEN {
            self.move_history.pop();
        }
        self.move_history.insert(0, record);
    }

    /// Consecutive successful uses of `move_id` at the head of history.
    pub fn consecutive_uses(&self, move_id: MoveId) -> usize {
        self.move_history
            .iter()
            .take_while(|r| r.move_id == move_id && r.result == MoveResult::Success)
            .count()
    }

    pub fn grounded_by_type(&self) -> bool {
        !self.has_type(Type::Flying)
    }

    /// Clear volatile state on entering the field.
    pub fn reset_for_summon(&mut self) {
        self.stat_stages = [0; BOOST_STATS];
        self.tags.clear();
        self.turn_data = TurnData::default();
        self.types_override = None;
        self.ability_override = None;
        self.ability_suppressed = false;
        self.active_turns = 0;
        self.move_history.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::CombatantConfig;

    fn sample() -> Combatant {
        CombatantConfig::new("Sample")
            .types(Type::Water, None)
            .stats([100, 80, 80, 80, 80, 80])
            .moves(&[MoveId::Tackle])
            .build(CombatantId(0), Side::Player)
            .unwrap()
    }

    #[test]
    fn test_change_stage_clamps_and_reports_delta() {
        let mut c = sample();
        assert_eq!(c.change_stage(BattleStat::Atk, 4), 4);
        assert_eq!(c.change_stage(BattleStat::Atk, 4), 2);
        assert_eq!(c.stage(BattleStat::Atk), 6);
        assert_eq!(c.change_stage(BattleStat::Atk, 1), 0);
        assert_eq!(c.change_stage(BattleStat::Eva, -8), -6);
        assert!(c.turn_data.stat_lowered);
    }

    #[test]
    fn test_damage_and_heal_saturate() {
        let mut c = sample();
        assert_eq!(c.take_damage(30), 30);
        assert_eq!(c.heal(100), 30);
        assert_eq!(c.take_damage(500), 100);
        assert!(c.is_fainted());
    }

    #[test]
    fn test_tera_replaces_types() {
        let mut c = sample();
        c.tera_type = Some(Type::Fire);
        assert!(c.has_type(Type::Water));
        c.terastallized = true;
        assert!(c.has_type(Type::Fire));
        assert!(!c.has_type(Type::Water));
        assert_eq!(c.original_types(), (Type::Water, None));
    }

    #[test]
    fn test_suppressed_ability() {
        let mut c = sample();
        c.ability = AbilityId::Levitate;
        assert!(c.has_ability(AbilityId::Levitate));
        c.ability_suppressed = true;
        assert_eq!(c.effective_ability(), AbilityId::Noability);
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let mut c = sample();
        for turn in 0..10 {
            c.push_move_record(MoveRecord {
                move_id: if turn < 9 { MoveId::Pound } else { MoveId::Tackle },
                targets: SmallVec::new(),
                result: MoveResult::Success,
                turn,
            });
        }
        assert_eq!(c.move_history.len(), HISTORY_LEN);
        assert_eq!(c.last_move().map(|r| r.move_id), Some(MoveId::Tackle));
        assert_eq!(c.consecutive_uses(MoveId::Pound), 0);
        assert_eq!(c.consecutive_uses(MoveId::Tackle), 1);
    }
}
