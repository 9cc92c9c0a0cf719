//! Stage dispatch: visiting the right combatants' ability attributes at each
//! pipeline point.
//!
//! Calculation stages take `&Battle` and mutate only the cells they are
//! handed. Reaction stages take `&mut Battle` plus the `simulated` flag.

use smallvec::SmallVec;
use tracing::trace;

use super::attrs::{AbAttr, AbilityStage, ImmunityReaction, PowerCondition, PriorityCondition};
use super::registry::ability_attrs;
use super::AbilityId;
use crate::battle::Battle;
use crate::cells::{BoolCell, NumberCell, TypeCell};
use crate::events::{BattleEvent, DamageSource};
use crate::moves::{Move, MoveCategory};
use crate::pipeline::{effects, MoveContext};
use crate::state::{BattleStat, CombatantId, StatusKind, DEFAULT_FIELD_TURNS};
use crate::tags::{battler, BattlerTag, BattlerTagKind, TagPayload};
use crate::types::Type;

/// Attributes of `ability` bound to `stage`, with their index in the ability.
pub fn attrs_at(
    ability: AbilityId,
    stage: AbilityStage,
) -> impl Iterator<Item = (usize, &'static AbAttr)> {
    ability_attrs(ability)
        .iter()
        .enumerate()
        .filter(move |(_, attr)| attr.stage() == stage)
}

fn combatant_attrs(
    battle: &Battle,
    id: CombatantId,
    stage: AbilityStage,
) -> impl Iterator<Item = &'static AbAttr> {
    attrs_at(battle.combatant(id).effective_ability(), stage).map(|(_, attr)| attr)
}

/// Announce the combatant's ability.
pub fn show_ability(battle: &mut Battle, id: CombatantId, simulated: bool) {
    let ability = battle.combatant(id).effective_ability();
    battle.emit(BattleEvent::AbilityShown { combatant: id, ability }, simulated);
}

// ============================================================================
// Pre-move
// ============================================================================

/// Pre-move hooks. A hook stops the move by setting `cancelled`.
pub fn apply_pre_move(
    battle: &mut Battle,
    user: CombatantId,
    mv: &Move,
    cancelled: &mut BoolCell,
    simulated: bool,
) {
    for attr in combatant_attrs(battle, user, AbilityStage::PreMove) {
        if let AbAttr::LoafAfterActing = *attr {
            let last = battle.combatant(user).move_history.first().map(|r| r.turn);
            if last.is_some() && last == battle.turn.checked_sub(1) {
                show_ability(battle, user, simulated);
                cancelled.set();
            }
        }
        if cancelled.value {
            trace!(?user, move_id = ?mv.id, "pre-move hook cancelled the move");
            return;
        }
    }
}

// ============================================================================
// Power stages
// ============================================================================

/// Type-changing hooks. Records the held multiplier in `multiplier`.
pub fn apply_move_type_change(
    battle: &Battle,
    user: CombatantId,
    mv: &Move,
    move_type: &mut TypeCell,
    multiplier: &mut NumberCell,
) -> bool {
    if mv.is_status() {
        return false;
    }
    for attr in combatant_attrs(battle, user, AbilityStage::MoveTypeChange) {
        if let AbAttr::MoveTypeChange { from, to, multiplier: m } = *attr {
            if move_type.value == from {
                move_type.value = to;
                multiplier.scale(m);
                return true;
            }
        }
    }
    false
}

/// User pre-attack power hooks.
pub fn apply_user_power(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell) {
    for attr in combatant_attrs(battle, ctx.user, AbilityStage::VariableMovePower) {
        if let AbAttr::PowerBoost { condition, multiplier } = *attr {
            let applies = match condition {
                PowerCondition::PowerAtMost(bound) => power.value <= f64::from(bound),
                PowerCondition::Flag(flag) => ctx.mv.has_flag(flag),
                PowerCondition::HasSecondaryEffect => {
                    !ctx.mv.is_status() && ctx.mv.effects().any(|e| e.effective_chance(ctx.mv) > 0)
                }
            };
            if applies {
                power.scale(multiplier);
            }
        }
    }
}

/// Ally pre-attack power hooks.
pub fn apply_ally_power(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell) {
    for ally in battle.allies_of(ctx.user) {
        for attr in combatant_attrs(battle, ally, AbilityStage::AllyMovePower) {
            if let AbAttr::AllyCategoryPowerBoost { category, multiplier } = *attr {
                if ctx.mv.category() == category {
                    power.scale(multiplier);
                }
            }
        }
    }
}

/// Field auras from every active combatant, each distinct aura applied once.
pub fn apply_field_auras(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell) {
    let mut seen: SmallVec<[(AbilityId, usize); 4]> = SmallVec::new();
    for id in battle.active_ids() {
        let ability = battle.combatant(id).effective_ability();
        for (idx, attr) in attrs_at(ability, AbilityStage::FieldMovePower) {
            if seen.contains(&(ability, idx)) {
                continue;
            }
            seen.push((ability, idx));
            if let AbAttr::FieldTypePowerBoost { ty, multiplier } = *attr {
                if ctx.move_type == ty {
                    power.scale(multiplier);
                }
            }
        }
    }
}

/// Type boosts from every combatant on the user's side, the user included.
pub fn apply_user_field_power(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell) {
    let mut side: SmallVec<[CombatantId; 2]> = SmallVec::new();
    side.push(ctx.user);
    side.extend(battle.allies_of(ctx.user));
    for id in side {
        for attr in combatant_attrs(battle, id, AbilityStage::UserFieldMovePower) {
            if let AbAttr::UserFieldTypePowerBoost { ty, multiplier } = *attr {
                if ctx.move_type == ty {
                    power.scale(multiplier);
                }
            }
        }
    }
}

// ============================================================================
// Damage stages
// ============================================================================

/// Replacement STAB multiplier, if the user's ability sets one.
pub fn stab_override(battle: &Battle, user: CombatantId) -> Option<f64> {
    combatant_attrs(battle, user, AbilityStage::StabBoost).find_map(|attr| match *attr {
        AbAttr::StabMultiplier(m) => Some(m),
        _ => None,
    })
}

/// Product of the combatant's ability multipliers for `stat`.
pub fn stat_multiplier(
    battle: &Battle,
    id: CombatantId,
    stat: BattleStat,
    category: MoveCategory,
) -> f64 {
    combatant_attrs(battle, id, AbilityStage::StatMultiplier)
        .filter_map(|attr| match *attr {
            AbAttr::StatMultiplier { stat: s, multiplier, physical_only }
                if s == stat && (!physical_only || category == MoveCategory::Physical) =>
            {
                Some(multiplier)
            }
            _ => None,
        })
        .product()
}

/// Receiver multipliers (Thick Fat, Multiscale).
pub fn received_damage_multiplier(battle: &Battle, target: CombatantId, move_type: Type) -> f64 {
    let defender = battle.combatant(target);
    combatant_attrs(battle, target, AbilityStage::ReceivedDamage)
        .map(|attr| match *attr {
            AbAttr::ReceivedTypeDamage { types, multiplier } if types.contains(&move_type) => {
                multiplier
            }
            AbAttr::FullHpDamageReduction(multiplier) if defender.is_full_hp() => multiplier,
            _ => 1.0,
        })
        .product()
}

pub fn blocks_crit(battle: &Battle, target: CombatantId) -> bool {
    combatant_attrs(battle, target, AbilityStage::BlockCrit).next().is_some()
}

// ============================================================================
// Pre-defend
// ============================================================================

/// Accuracy cap the target's ability imposes on status moves.
pub fn status_accuracy_cap(battle: &Battle, target: CombatantId, mv: &Move) -> Option<i16> {
    if !mv.is_status() {
        return None;
    }
    combatant_attrs(battle, target, AbilityStage::PreDefend).find_map(|attr| match *attr {
        AbAttr::StatusAccuracyCap(cap) => Some(cap),
        _ => None,
    })
}

/// Type immunity granted by the target's ability against `move_type`.
pub fn type_immunity(battle: &Battle, target: CombatantId, move_type: Type) -> Option<ImmunityReaction> {
    combatant_attrs(battle, target, AbilityStage::PreDefend).find_map(|attr| match *attr {
        AbAttr::TypeImmunity { ty, reaction } if ty == move_type => {
            // Grounding (Gravity) overrides a Ground immunity
            if ty == Type::Ground && battle.is_grounded(target) {
                None
            } else {
                Some(reaction)
            }
        }
        _ => None,
    })
}

/// Run the side effect of an absorbed move.
pub fn apply_immunity_reaction(
    battle: &mut Battle,
    target: CombatantId,
    reaction: ImmunityReaction,
    simulated: bool,
) {
    show_ability(battle, target, simulated);
    if simulated {
        return;
    }
    match reaction {
        ImmunityReaction::None => {}
        ImmunityReaction::Heal { num, den } => {
            let amount = u32::from(battle.combatant(target).max_hp()) * u32::from(num) / u32::from(den);
            effects::heal(battle, target, amount.max(1), false);
        }
        ImmunityReaction::StatBoost(stat, delta) => {
            effects::change_stages(battle, target, target, &[(stat, delta)], false);
        }
        ImmunityReaction::FlashFire => {
            let tag = BattlerTag::new(BattlerTagKind::FlashFire).with_payload(TagPayload::TypeBoost {
                ty: Type::Fire,
                multiplier: 1.5,
            });
            battler::add_tag(battle, target, tag, false);
        }
    }
}

// ============================================================================
// Effect suppression
// ============================================================================

/// Target ignores secondary effects aimed at it.
pub fn ignores_secondary_effects(battle: &Battle, target: CombatantId) -> bool {
    combatant_attrs(battle, target, AbilityStage::IgnoreMoveEffects)
        .any(|attr| matches!(attr, AbAttr::IgnoreSecondaryEffects))
}

/// User's own chance-based effects are dropped.
pub fn suppresses_own_effects(battle: &Battle, user: CombatantId) -> bool {
    combatant_attrs(battle, user, AbilityStage::IgnoreMoveEffects)
        .any(|attr| matches!(attr, AbAttr::SuppressOwnSecondaryEffects))
}

// ============================================================================
// Post-defend / post-attack
// ============================================================================

/// Defender reactions to being hit. `damaging` is the coarse "is damaging attack" predicate.
pub fn apply_post_defend(
    battle: &mut Battle,
    ctx: &MoveContext<'_>,
    damaging: bool,
    simulated: bool,
) {
    let contact = ctx.mv.has_flag(crate::moves::MoveFlags::CONTACT);
    for attr in combatant_attrs(battle, ctx.target, AbilityStage::PostDefend) {
        if attr.requires_damaging_hit() && !damaging {
            continue;
        }
        if battle.combatant(ctx.user).is_fainted() && !matches!(attr, AbAttr::PhysicalHitStatChange(_)) {
            continue;
        }
        match *attr {
            AbAttr::ContactStatus { status, chance } if contact => {
                if battle.combatant(ctx.user).status.is_none()
                    && battle.rng.random_int(100) < u32::from(chance)
                    && effects::can_inflict_status(battle, ctx.user, status)
                {
                    show_ability(battle, ctx.target, simulated);
                    effects::try_inflict_status(battle, ctx.user, status, Some(ctx.target), simulated);
                }
            }
            AbAttr::ContactDamage { divisor } if contact => {
                show_ability(battle, ctx.target, simulated);
                if !simulated {
                    let amount = (u32::from(battle.combatant(ctx.user).max_hp()) / u32::from(divisor)).max(1);
                    effects::indirect_damage(battle, ctx.user, amount, DamageSource::Recoil);
                }
            }
            AbAttr::SyncStatus => {
                let target = battle.combatant(ctx.target);
                let Some(status) = target.status else {
                    continue;
                };
                let mirrored = matches!(
                    status.kind,
                    StatusKind::Burn | StatusKind::Poison | StatusKind::Toxic | StatusKind::Paralysis
                );
                if mirrored
                    && target.turn_data.status_source == Some(ctx.user)
                    && effects::can_inflict_status(battle, ctx.user, status.kind)
                {
                    show_ability(battle, ctx.target, simulated);
                    effects::try_inflict_status(battle, ctx.user, status.kind, Some(ctx.target), simulated);
                }
            }
            AbAttr::PhysicalHitStatChange(changes) if ctx.mv.category() == MoveCategory::Physical => {
                show_ability(battle, ctx.target, simulated);
                effects::change_stages(battle, ctx.target, ctx.target, changes, simulated);
            }
            _ => {}
        }
    }
}

/// Attacker reactions after landing a hit.
pub fn apply_post_attack(battle: &mut Battle, ctx: &MoveContext<'_>, damaging: bool, simulated: bool) {
    if battle.combatant(ctx.user).is_fainted() {
        return;
    }
    let contact = ctx.mv.has_flag(crate::moves::MoveFlags::CONTACT);
    for attr in combatant_attrs(battle, ctx.user, AbilityStage::PostAttack) {
        if attr.requires_damaging_hit() && !damaging {
            continue;
        }
        if let AbAttr::ContactInflict { status, chance } = *attr {
            if contact
                && !battle.combatant(ctx.target).is_fainted()
                && battle.combatant(ctx.target).status.is_none()
                && battle.rng.random_int(100) < u32::from(chance)
                && effects::can_inflict_status(battle, ctx.target, status)
            {
                show_ability(battle, ctx.user, simulated);
                effects::try_inflict_status(battle, ctx.target, status, Some(ctx.user), simulated);
            }
        }
    }
}

// ============================================================================
// Stat protection and reactions
// ============================================================================

pub fn protects_stats(battle: &Battle, target: CombatantId) -> bool {
    combatant_attrs(battle, target, AbilityStage::ProtectStat).next().is_some()
}

/// Reaction to a stat drop inflicted by an opponent.
pub fn apply_post_stat_lowered(battle: &mut Battle, target: CombatantId, simulated: bool) {
    for attr in combatant_attrs(battle, target, AbilityStage::PostStatLowered) {
        if let AbAttr::StatLoweredBoost { stat, delta } = *attr {
            show_ability(battle, target, simulated);
            effects::change_stages(battle, target, target, &[(stat, delta)], simulated);
        }
    }
}

pub fn blocks_status(battle: &Battle, target: CombatantId, status: StatusKind) -> bool {
    combatant_attrs(battle, target, AbilityStage::StatusImmunity)
        .any(|attr| matches!(*attr, AbAttr::StatusImmunity(s) if s == status))
}

// ============================================================================
// Field-level stages
// ============================================================================

/// Whether any active combatant suppresses weather effects.
pub fn weather_suppressed(battle: &Battle) -> bool {
    battle
        .active_ids()
        .into_iter()
        .any(|id| combatant_attrs(battle, id, AbilityStage::SuppressWeather).next().is_some())
}

/// Post-summon hooks for a combatant entering the field.
pub fn apply_post_summon(battle: &mut Battle, id: CombatantId) {
    for attr in combatant_attrs(battle, id, AbilityStage::PostSummon) {
        match *attr {
            AbAttr::SummonWeather(kind) => {
                if battle.field.weather_kind() != Some(kind) {
                    show_ability(battle, id, false);
                    battle.set_weather(kind, DEFAULT_FIELD_TURNS, false);
                }
            }
            AbAttr::SummonTerrain(kind) => {
                if battle.field.terrain_kind() != Some(kind) {
                    show_ability(battle, id, false);
                    battle.set_terrain(kind, DEFAULT_FIELD_TURNS, false);
                }
            }
            AbAttr::SummonOpponentStages(changes) => {
                let opponents = battle.opponents_of(id);
                if opponents.is_empty() {
                    continue;
                }
                show_ability(battle, id, false);
                for opponent in opponents {
                    effects::change_stages(battle, id, opponent, changes, false);
                }
            }
            _ => {}
        }
    }
    trace!(?id, "post-summon hooks applied");
}

/// Priority after ability adjustments.
pub fn modified_priority(battle: &Battle, user: CombatantId, mv: &Move) -> i8 {
    let combatant = battle.combatant(user);
    let mut priority = mv.data.priority;
    for attr in combatant_attrs(battle, user, AbilityStage::ModifyPriority) {
        if let AbAttr::PriorityBoost { condition, delta } = *attr {
            let applies = match condition {
                PriorityCondition::StatusMove => mv.is_status(),
                PriorityCondition::TypeAtFullHp(ty) => {
                    mv.data.move_type == ty && combatant.is_full_hp()
                }
            };
            if applies {
                priority = priority.saturating_add(delta);
            }
        }
    }
    priority
}

/// Percent chance to move first in the bracket.
pub fn bypass_speed_chance(battle: &Battle, id: CombatantId) -> Option<u8> {
    combatant_attrs(battle, id, AbilityStage::BypassSpeed).find_map(|attr| match *attr {
        AbAttr::BypassSpeedChance(chance) => Some(chance),
        _ => None,
    })
}

pub fn acts_last(battle: &Battle, id: CombatantId) -> bool {
    combatant_attrs(battle, id, AbilityStage::BypassSpeed).any(|attr| matches!(attr, AbAttr::ActLast))
}

/// Whether `ability` pulls single-target moves of `ty`.
pub fn redirects_type(ability: AbilityId, ty: Type) -> bool {
    attrs_at(ability, AbilityStage::Redirect)
        .any(|(_, attr)| matches!(*attr, AbAttr::RedirectType(t) if t == ty))
}
