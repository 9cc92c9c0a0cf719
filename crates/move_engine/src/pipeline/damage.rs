//! Damage: effectiveness, critical hits and the modifier chain.
//!
//! The chain runs on integers with 4096-scale modifiers:
//! base -> spread -> weather/terrain -> crit -> random roll -> STAB ->
//! effectiveness -> burn -> screens -> receiver ability -> minimum 1.

use tracing::trace;

use super::{formula, power, MoveContext, Modifier};
use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::cells::NumberCell;
use crate::config::BattleFormat;
use crate::items;
use crate::moves::attrs::{apply_attrs_of_kind, AttrArgs, AttrKind};
use crate::moves::{Move, MoveAttr, MoveCategory};
use crate::state::{apply_stat_boost, BattleStat, CombatantId, StatusKind};
use crate::tags::{ArenaTagKind, BattlerTagKind};
use crate::types::{type_effectiveness, Type};

/// Neutral effectiveness on the 4 = 1x scale.
pub const NEUTRAL: u8 = 4;

/// Crit stages granted by Focus Energy.
const FOCUS_ENERGY_STAGES: f64 = 2.0;

/// Roll used for estimates (92%).
const MEDIAN_ROLL: u8 = 7;

/// Type effectiveness of the move against `ctx.target`.
pub fn effectiveness(battle: &Battle, ctx: &MoveContext<'_>) -> u8 {
    if ctx.mv.is_typeless() {
        return NEUTRAL;
    }
    let defender = battle.combatant(ctx.target);
    let (t1, t2) = defender.current_types();
    if ctx.move_type != Type::Ground {
        return type_effectiveness(ctx.move_type, t1, t2);
    }
    if battle.is_grounded(ctx.target) {
        // Grounded Flying types lose their Ground immunity
        return match (t1, t2) {
            (Type::Flying, None) => NEUTRAL,
            (Type::Flying, Some(other)) | (other, Some(Type::Flying)) => {
                type_effectiveness(Type::Ground, other, None)
            }
            _ => type_effectiveness(Type::Ground, t1, t2),
        };
    }
    if defender.tags.has(BattlerTagKind::MagnetRisen) {
        return 0;
    }
    type_effectiveness(Type::Ground, t1, t2)
}

/// Critical-hit stage for this use, capped at the top of the table.
pub fn crit_stage(battle: &Battle, ctx: &MoveContext<'_>) -> usize {
    let mut stage = NumberCell::new(0.0);
    apply_attrs_of_kind(AttrKind::CritStage, battle, ctx, &mut AttrArgs::CritStage(&mut stage));
    if battle.combatant(ctx.user).tags.has(BattlerTagKind::FocusEnergy) {
        stage.value += FOCUS_ENERGY_STAGES;
    }
    items::apply_crit_stage(battle, ctx.user, &mut stage);
    (stage.value.max(0.0) as usize).min(formula::CRIT_CHANCES.len() - 1)
}

/// Roll for a critical hit.
pub fn roll_critical(battle: &mut Battle, ctx: &MoveContext<'_>) -> bool {
    if dispatch::blocks_crit(battle, ctx.target) {
        return false;
    }
    let stage = crit_stage(battle, ctx);
    let critical = battle.rng.random_int(formula::CRIT_CHANCES[stage]) == 0;
    trace!(user = ?ctx.user, target = ?ctx.target, stage, critical, "crit roll");
    critical
}

/// Damage that bypasses the formula, if any attribute fixes it.
pub fn fixed_damage(battle: &Battle, ctx: &MoveContext<'_>) -> Option<u32> {
    ctx.mv.attrs().iter().find_map(|attr| attr.fixed_damage(battle, ctx))
}

fn has_stab(battle: &Battle, ctx: &MoveContext<'_>) -> bool {
    if ctx.mv.is_typeless() {
        return false;
    }
    let attacker = battle.combatant(ctx.user);
    let (t1, t2) = attacker.original_types();
    t1 == ctx.move_type
        || t2 == Some(ctx.move_type)
        || (attacker.terastallized && attacker.tera_type == Some(ctx.move_type))
}

fn offense_defense(
    battle: &Battle,
    ctx: &MoveContext<'_>,
    critical: bool,
) -> (u32, u32) {
    let category = ctx.mv.category();
    let (atk_stat, def_stat) = match category {
        MoveCategory::Physical => (BattleStat::Atk, BattleStat::Def),
        _ => (BattleStat::SpAtk, BattleStat::SpDef),
    };
    let attacker = battle.combatant(ctx.user);
    let defender = battle.combatant(ctx.target);

    let mut atk_stage = attacker.stage(atk_stat);
    let mut def_stage = defender.stage(def_stat);
    if critical {
        // Crits ignore stages that work against the attacker
        atk_stage = atk_stage.max(0);
        def_stage = def_stage.min(0);
    }

    let (Some(atk_perm), Some(def_perm)) = (atk_stat.permanent(), def_stat.permanent()) else {
        return (1, 1);
    };
    let attack = f64::from(apply_stat_boost(attacker.stat(atk_perm), atk_stage))
        * dispatch::stat_multiplier(battle, ctx.user, atk_stat, category);
    let defense = f64::from(apply_stat_boost(defender.stat(def_perm), def_stage))
        * dispatch::stat_multiplier(battle, ctx.target, def_stat, category);
    ((attack as u32).max(1), (defense as u32).max(1))
}

fn apply_multiplier(damage: u32, multiplier: f64) -> u32 {
    if multiplier == 1.0 {
        return damage;
    }
    formula::apply_modifier(damage, Modifier::from_f64(multiplier))
}

/// Formula damage for one hit with a fixed roll. Pure.
pub fn compute(
    battle: &Battle,
    ctx: &MoveContext<'_>,
    power: u32,
    multiple: bool,
    critical: bool,
    roll_index: u8,
    eff: u8,
) -> u32 {
    if eff == 0 || power == 0 {
        return 0;
    }
    let attacker = battle.combatant(ctx.user);
    let category = ctx.mv.category();
    let (attack, defense) = offense_defense(battle, ctx, critical);

    let mut damage = formula::get_base_damage(u32::from(attacker.level), power, attack, defense);

    if multiple {
        damage = formula::apply_modifier(damage, Modifier::SPREAD);
    }
    if let Some(weather) = battle.active_weather() {
        damage = apply_multiplier(damage, weather.type_multiplier(ctx.move_type));
    }
    if let Some(terrain) = battle.active_terrain() {
        if terrain.boosted_type() == Some(ctx.move_type) && battle.is_grounded(ctx.user) {
            damage = formula::apply_modifier(damage, Modifier::ONE_POINT_THREE);
        }
    }
    if critical {
        damage = formula::apply_modifier(damage, Modifier::ONE_POINT_FIVE);
    }

    damage = formula::apply_random_roll(damage, roll_index);

    if has_stab(battle, ctx) {
        let stab = dispatch::stab_override(battle, ctx.user).unwrap_or(1.5);
        damage = apply_multiplier(damage, stab);
    }

    damage = formula::apply_effectiveness(damage, eff);

    let burned = matches!(attacker.status, Some(s) if s.kind == StatusKind::Burn);
    let ignores_burn = ctx.mv.attrs().iter().any(|a| matches!(a, MoveAttr::UserStatusPower));
    if burned && category == MoveCategory::Physical && !ignores_burn {
        damage /= 2;
    }

    if !critical {
        let screen = match category {
            MoveCategory::Physical => Some(ArenaTagKind::Reflect),
            MoveCategory::Special => Some(ArenaTagKind::LightScreen),
            MoveCategory::Status => None,
        };
        let target_side = battle.combatant(ctx.target).side;
        if screen.is_some_and(|kind| battle.field.has_arena_tag(kind, target_side)) {
            let modifier = match battle.config.format {
                BattleFormat::Single => Modifier::HALF,
                BattleFormat::Double => Modifier::SCREENS_DOUBLES,
            };
            damage = formula::apply_modifier(damage, modifier);
        }
    }

    damage = apply_multiplier(
        damage,
        dispatch::received_damage_multiplier(battle, ctx.target, ctx.move_type),
    );

    damage.max(1)
}

/// Formula damage for one hit, drawing the random roll.
pub fn calculate_damage(
    battle: &mut Battle,
    ctx: &MoveContext<'_>,
    power: u32,
    multiple: bool,
    critical: bool,
    eff: u8,
) -> u32 {
    let roll = battle.rng.random_int(16) as u8;
    let damage = compute(battle, ctx, power, multiple, critical, roll, eff);
    trace!(user = ?ctx.user, target = ?ctx.target, power, roll, critical, eff, damage, "damage");
    damage
}

/// Expected damage of `mv` against `target` without drawing from the RNG.
pub fn estimate_damage(
    battle: &Battle,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
    multiple: bool,
) -> u32 {
    if mv.is_status() {
        return 0;
    }
    let (move_type, _) = power::effective_move_type(battle, user, mv);
    let ctx = MoveContext::new(user, target, mv, move_type);
    let eff = effectiveness(battle, &ctx);
    if eff == 0 || dispatch::type_immunity(battle, target, move_type).is_some() {
        return 0;
    }
    if let Some(fixed) = fixed_damage(battle, &ctx) {
        return fixed;
    }
    let power = power::calculate_battle_power(battle, user, target, mv);
    let per_hit = compute(battle, &ctx, power, multiple, false, MEDIAN_ROLL, eff);
    let hits = mv
        .attrs()
        .iter()
        .find_map(|a| match a {
            MoveAttr::MultiHit(kind) => Some(kind.expected_hits()),
            _ => None,
        })
        .unwrap_or(1.0);
    (f64::from(per_hit) * hits) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityId;
    use crate::config::BattleConfig;
    use crate::items::ItemId;
    use crate::moves::MoveId;
    use crate::roster::CombatantConfig;
    use crate::state::{Side, StatusCondition};
    use crate::tags::{arena, battler, ArenaTag, ArenaTagSide, BattlerTag};

    fn duel(user: CombatantConfig, target: CombatantConfig) -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(BattleConfig::single(5));
        let a = battle.add_combatant(&user, Side::Player).unwrap();
        let b = battle.add_combatant(&target, Side::Enemy).unwrap();
        battle.summon(a, 0).unwrap();
        battle.summon(b, 0).unwrap();
        (battle, a, b)
    }

    fn mon(name: &str, ty: Type) -> CombatantConfig {
        CombatantConfig::new(name)
            .level(50)
            .types(ty, None)
            .stats([100, 100, 100, 100, 100, 100])
            .moves(&[MoveId::Tackle])
    }

    fn ctx(a: CombatantId, b: CombatantId, id: MoveId) -> MoveContext<'static> {
        let mv = id.get();
        MoveContext::new(a, b, mv, mv.data.move_type)
    }

    #[test]
    fn test_base_damage_and_roll_bounds() {
        let (battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Water));
        let c = ctx(a, b, MoveId::Tackle);
        assert_eq!(compute(&battle, &c, 40, false, false, 15, NEUTRAL), 19);
        assert_eq!(compute(&battle, &c, 40, false, false, 0, NEUTRAL), 16);
    }

    #[test]
    fn test_stab_rounds_half_down() {
        let (battle, a, b) = duel(mon("A", Type::Normal), mon("B", Type::Water));
        // 19 * 1.5 = 28.5
        assert_eq!(compute(&battle, &ctx(a, b, MoveId::Tackle), 40, false, false, 15, NEUTRAL), 28);
    }

    #[test]
    fn test_adaptability_doubles_stab() {
        let (battle, a, b) =
            duel(mon("A", Type::Normal).ability(AbilityId::Adaptability), mon("B", Type::Water));
        assert_eq!(compute(&battle, &ctx(a, b, MoveId::Tackle), 40, false, false, 15, NEUTRAL), 38);
    }

    #[test]
    fn test_spread_crit_and_effectiveness() {
        let (battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Rock));
        let c = ctx(a, b, MoveId::Tackle);
        assert_eq!(compute(&battle, &c, 40, true, false, 15, NEUTRAL), 14);
        assert_eq!(compute(&battle, &c, 40, false, true, 15, NEUTRAL), 28);
        assert_eq!(effectiveness(&battle, &c), 2);
        assert_eq!(compute(&battle, &c, 40, false, false, 15, 2), 9);
    }

    #[test]
    fn test_burn_halves_physical_except_facade() {
        let (mut battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Water));
        battle.combatant_mut(a).status = Some(StatusCondition::new(StatusKind::Burn));
        assert_eq!(compute(&battle, &ctx(a, b, MoveId::Tackle), 40, false, false, 15, NEUTRAL), 9);
        assert_eq!(compute(&battle, &ctx(a, b, MoveId::Facade), 40, false, false, 15, NEUTRAL), 19);
    }

    #[test]
    fn test_screens_skip_crits() {
        let (mut battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Water));
        arena::add_arena_tag(
            &mut battle,
            ArenaTag::new(ArenaTagKind::Reflect, ArenaTagSide::Enemy, 5),
            false,
        );
        let c = ctx(a, b, MoveId::Tackle);
        assert_eq!(compute(&battle, &c, 40, false, false, 15, NEUTRAL), 9);
        assert_eq!(compute(&battle, &c, 40, false, true, 15, NEUTRAL), 28);
    }

    #[test]
    fn test_crit_ignores_unfavourable_stages() {
        let (mut battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Water));
        battle.combatant_mut(a).change_stage(BattleStat::Atk, -2);
        battle.combatant_mut(b).change_stage(BattleStat::Def, 2);
        let c = ctx(a, b, MoveId::Tackle);
        assert!(compute(&battle, &c, 40, false, false, 15, NEUTRAL) < 19);
        assert_eq!(compute(&battle, &c, 40, false, true, 15, NEUTRAL), 28);
    }

    #[test]
    fn test_ground_against_airborne() {
        let (mut battle, a, b) = duel(mon("A", Type::Ground), mon("B", Type::Flying));
        let c = ctx(a, b, MoveId::Earthquake);
        assert_eq!(effectiveness(&battle, &c), 0);
        arena::add_arena_tag(
            &mut battle,
            ArenaTag::new(ArenaTagKind::Gravity, ArenaTagSide::Both, 5),
            false,
        );
        assert_eq!(effectiveness(&battle, &c), NEUTRAL);

        let (mut battle, a, b) = duel(mon("A", Type::Ground), mon("B", Type::Water));
        battler::add_tag(&mut battle, b, BattlerTag::new(BattlerTagKind::MagnetRisen), false);
        assert_eq!(effectiveness(&battle, &ctx(a, b, MoveId::Earthquake)), 0);
    }

    #[test]
    fn test_crit_blocked_without_draw() {
        let (mut battle, a, b) =
            duel(mon("A", Type::Water), mon("B", Type::Water).ability(AbilityId::Battlearmor));
        let before = battle.rng.state();
        assert!(!roll_critical(&mut battle, &ctx(a, b, MoveId::Slash)));
        assert_eq!(battle.rng.state(), before);
    }

    #[test]
    fn test_crit_stage_caps_to_guaranteed() {
        let (mut battle, a, b) =
            duel(mon("A", Type::Water).item(ItemId::Scopelens), mon("B", Type::Water));
        battler::add_tag(&mut battle, a, BattlerTag::new(BattlerTagKind::FocusEnergy), false);
        let c = ctx(a, b, MoveId::Slash);
        assert_eq!(crit_stage(&battle, &c), 3);
        assert!(roll_critical(&mut battle, &c));
    }

    #[test]
    fn test_fixed_damage_moves() {
        let (battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Water));
        assert_eq!(fixed_damage(&battle, &ctx(a, b, MoveId::Seismictoss)), Some(50));
        assert_eq!(fixed_damage(&battle, &ctx(a, b, MoveId::Dragonrage)), Some(40));
        assert_eq!(fixed_damage(&battle, &ctx(a, b, MoveId::Tackle)), None);
    }

    #[test]
    fn test_estimate_is_pure_and_scales_multi_hit() {
        let (battle, a, b) = duel(mon("A", Type::Water), mon("B", Type::Water));
        let before = battle.rng.state();
        let single = estimate_damage(&battle, a, b, MoveId::Doublekick.get(), false);
        assert!(single > 0);
        assert_eq!(battle.rng.state(), before);
        assert_eq!(estimate_damage(&battle, a, b, MoveId::Growl.get(), false), 0);
    }
}
