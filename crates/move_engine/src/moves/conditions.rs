//! Move conditions: predicates that decide whether a move can be used at all.
//!
//! A failed condition aborts the move before any per-target processing with
//! a single "but it failed" message. This is distinct from a miss.

use super::{Move, MoveCategory};
use crate::battle::Battle;
use crate::state::CombatantId;
use crate::tags::BattlerTagKind;

/// Custom predicate for moves built outside the catalog.
pub type ConditionFn = fn(&Battle, CombatantId, Option<CombatantId>, &Move) -> bool;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveCondition {
    /// Only on the user's first turn on the field
    FirstTurnOnly,
    /// The user took physical damage this turn
    TookPhysicalDamage,
    /// Target level does not exceed the user's
    TargetLevelNotHigher,
    NotAtFullHp,
    /// No substitute yet and enough HP to pay for one
    SubstituteAffordable,
    /// The user has a stockpile to release
    HasStockpile,
    Custom(ConditionFn),
}

impl MoveCondition {
    /// Evaluate against the user and the first requested target.
    pub fn check(
        &self,
        battle: &Battle,
        user: CombatantId,
        target: Option<CombatantId>,
        mv: &Move,
    ) -> bool {
        let u = battle.combatant(user);
        match self {
            MoveCondition::FirstTurnOnly => u.active_turns == 0,
            MoveCondition::TookPhysicalDamage => u
                .turn_data
                .attackers
                .iter()
                .any(|r| r.category == MoveCategory::Physical && r.damage > 0),
            MoveCondition::TargetLevelNotHigher => match target {
                Some(t) => battle.combatant(t).level <= u.level,
                None => false,
            },
            MoveCondition::NotAtFullHp => !u.is_full_hp(),
            MoveCondition::SubstituteAffordable => {
                !u.tags.has(BattlerTagKind::Substitute) && u.hp > u.max_hp() / 4
            }
            MoveCondition::HasStockpile => u.tags.has(BattlerTagKind::Stockpiling),
            MoveCondition::Custom(predicate) => predicate(battle, user, target, mv),
        }
    }
}

/// Check every condition in order, stopping at the first failure.
pub fn conditions_pass(
    battle: &Battle,
    user: CombatantId,
    target: Option<CombatantId>,
    mv: &Move,
) -> bool {
    mv.conditions()
        .iter()
        .all(|c| c.check(battle, user, target, mv))
}
