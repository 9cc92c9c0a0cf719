//! Effect application: status, stat stages, tags, field changes and HP moves.
//!
//! Every mutator takes `simulated`; a simulated call answers "would this
//! succeed" without touching HP, status, stages, tags or the event log.

use tracing::{debug, trace};

use super::MoveContext;
use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::events::{BattleEvent, DamageSource};
use crate::moves::attrs::{EffectKind, MoveEffect};
use crate::state::{
    BattleStat, CombatantId, StatusCondition, StatusKind, TerrainKind, DEFAULT_FIELD_TURNS,
};
use crate::tags::{
    arena, battler, ArenaTag, ArenaTagKind, ArenaTagSide, BattlerTag, BattlerTagKind, TagPayload,
};
use crate::types::{Type, TYPE_IMMUNITIES};

/// Chance of a repeated Protect is 1 / 3^n, with n capped here.
const MAX_PROTECT_STREAK: u32 = 6;

// ============================================================================
// Status
// ============================================================================

/// Whether `status` could be inflicted on `target` right now.
pub fn can_inflict_status(battle: &Battle, target: CombatantId, status: StatusKind) -> bool {
    let combatant = battle.combatant(target);
    if combatant.is_fainted() || combatant.status.is_some() {
        return false;
    }
    let (t1, t2) = combatant.current_types();
    let immunity = status.immunity();
    if !immunity.is_empty()
        && std::iter::once(t1)
            .chain(t2)
            .any(|ty| TYPE_IMMUNITIES[ty as usize].contains(immunity))
    {
        return false;
    }
    if dispatch::blocks_status(battle, target, status) {
        return false;
    }
    match battle.active_terrain() {
        Some(TerrainKind::Misty) if battle.is_grounded(target) => false,
        Some(TerrainKind::Electric) if status == StatusKind::Sleep && battle.is_grounded(target) => {
            false
        }
        _ => true,
    }
}

/// Inflict a non-volatile status. Returns whether it took hold.
pub fn try_inflict_status(
    battle: &mut Battle,
    target: CombatantId,
    status: StatusKind,
    source: Option<CombatantId>,
    simulated: bool,
) -> bool {
    if !can_inflict_status(battle, target, status) {
        trace!(?target, ?status, "status refused");
        return false;
    }
    if simulated {
        return true;
    }
    let turns = match status {
        StatusKind::Sleep => battle.rng.random_range(1, 3) as u8,
        _ => 0,
    };
    let combatant = battle.combatant_mut(target);
    combatant.status = Some(StatusCondition { kind: status, turns });
    combatant.turn_data.status_source = source;
    debug!(?target, ?status, ?source, "status inflicted");
    battle.emit(BattleEvent::StatusApplied { target, status }, false);
    true
}

/// Remove any status from `target`. Returns whether one was removed.
pub fn cure_status(battle: &mut Battle, target: CombatantId, simulated: bool) -> bool {
    let Some(current) = battle.combatant(target).status else {
        return false;
    };
    if !simulated {
        battle.combatant_mut(target).status = None;
        battle.emit(BattleEvent::StatusCured { target, status: current.kind }, false);
    }
    true
}

// ============================================================================
// Stat stages
// ============================================================================

/// Apply stage changes from `source` to `target`. Returns whether any stage moved.
///
/// Drops inflicted by the other side can be blocked by the target's ability,
/// and trigger its stat-lowered reaction when they land.
pub fn change_stages(
    battle: &mut Battle,
    source: CombatantId,
    target: CombatantId,
    changes: &[(BattleStat, i8)],
    simulated: bool,
) -> bool {
    if battle.combatant(target).is_fainted() {
        return false;
    }
    let from_opponent = battle.combatant(source).side != battle.combatant(target).side;
    let mut any_applied = false;
    let mut lowered = false;

    for &(stat, delta) in changes {
        if delta < 0 && from_opponent && dispatch::protects_stats(battle, target) {
            dispatch::show_ability(battle, target, simulated);
            continue;
        }
        let applied = if simulated {
            battle.combatant(target).stage_room(stat, delta)
        } else {
            battle.combatant_mut(target).change_stage(stat, delta)
        };
        if applied == 0 {
            battle.emit(BattleEvent::StatUnchanged { target, stat, rising: delta > 0 }, simulated);
            continue;
        }
        any_applied = true;
        if !simulated {
            let turn_data = &mut battle.combatant_mut(target).turn_data;
            if applied < 0 {
                turn_data.stat_lowered = true;
            } else {
                turn_data.stat_raised = true;
            }
            battle.emit(BattleEvent::StatChanged { target, stat, delta: applied }, false);
        }
        lowered |= applied < 0;
    }

    if lowered && from_opponent {
        dispatch::apply_post_stat_lowered(battle, target, simulated);
    }
    any_applied
}

// ============================================================================
// HP
// ============================================================================

/// Restore HP. Returns the amount restored.
pub fn heal(battle: &mut Battle, id: CombatantId, amount: u32, simulated: bool) -> u16 {
    let combatant = battle.combatant(id);
    if combatant.is_fainted() || amount == 0 {
        return 0;
    }
    if simulated {
        let missing = u32::from(combatant.max_hp() - combatant.hp);
        return amount.min(missing) as u16;
    }
    let combatant = battle.combatant_mut(id);
    let healed = combatant.heal(amount);
    let hp_left = combatant.hp;
    if healed > 0 {
        battle.emit(BattleEvent::Heal { target: id, amount: healed, hp_left }, false);
    }
    healed
}

/// Damage from anything other than a move's direct hit. Returns HP lost.
pub fn indirect_damage(
    battle: &mut Battle,
    id: CombatantId,
    amount: u32,
    source: DamageSource,
) -> u16 {
    if battle.combatant(id).is_fainted() || amount == 0 {
        return 0;
    }
    let combatant = battle.combatant_mut(id);
    let dealt = combatant.take_damage(amount);
    let hp_left = combatant.hp;
    battle.emit(BattleEvent::Damage { target: id, amount: dealt, hp_left, source }, false);
    battle.check_faint(id, false);
    dealt
}

// ============================================================================
// Move effects
// ============================================================================

/// Apply one move effect. Returns whether it took effect.
///
/// The recipient is the user for self-targeted effects and `ctx.target`
/// otherwise. `damage_dealt` is the total HP removed from the target by this
/// use, for recoil and drain.
pub fn apply_effect(
    battle: &mut Battle,
    ctx: &MoveContext<'_>,
    effect: &MoveEffect,
    damage_dealt: u32,
    simulated: bool,
) -> bool {
    let recipient = if effect.self_target { ctx.user } else { ctx.target };
    if battle.combatant(recipient).is_fainted() {
        return false;
    }
    let applied = match effect.kind {
        EffectKind::Status(status) => {
            try_inflict_status(battle, recipient, status, Some(ctx.user), simulated)
        }
        EffectKind::StatStages(changes) => {
            change_stages(battle, ctx.user, recipient, changes, simulated)
        }
        EffectKind::AddTag(kind) => add_move_tag(battle, ctx, recipient, kind, simulated),
        EffectKind::AddArenaTag(kind) => {
            let side = match kind {
                ArenaTagKind::Gravity | ArenaTagKind::MudSport | ArenaTagKind::WaterSport => {
                    ArenaTagSide::Both
                }
                _ => ArenaTagSide::of(battle.combatant(recipient).side),
            };
            let tag = ArenaTag::new(kind, side, kind.default_turns())
                .with_source(ctx.user, Some(ctx.mv.id));
            arena::add_arena_tag(battle, tag, simulated).succeeded()
        }
        EffectKind::Weather(kind) => battle.set_weather(kind, DEFAULT_FIELD_TURNS, simulated),
        EffectKind::Terrain(kind) => battle.set_terrain(kind, DEFAULT_FIELD_TURNS, simulated),
        EffectKind::Heal { num, den } => {
            let max_hp = u32::from(battle.combatant(recipient).max_hp());
            let amount = (max_hp * u32::from(num) / u32::from(den)).max(1);
            heal(battle, recipient, amount, simulated) > 0
        }
        EffectKind::Recoil { num, den } => {
            if damage_dealt == 0 {
                return false;
            }
            let amount = (damage_dealt * u32::from(num) / u32::from(den)).max(1);
            if !simulated {
                indirect_damage(battle, recipient, amount, DamageSource::Recoil);
            }
            true
        }
        EffectKind::Drain { num, den } => {
            if damage_dealt == 0 {
                return false;
            }
            let amount = (damage_dealt * u32::from(num) / u32::from(den)).max(1);
            heal(battle, recipient, amount, simulated) > 0
        }
        EffectKind::Protect => try_protect(battle, ctx, recipient, simulated),
        EffectKind::Substitute => make_substitute(battle, ctx, recipient, simulated),
    };
    trace!(user = ?ctx.user, ?recipient, kind = ?effect.kind, applied, "effect");
    applied
}

fn add_move_tag(
    battle: &mut Battle,
    ctx: &MoveContext<'_>,
    recipient: CombatantId,
    kind: BattlerTagKind,
    simulated: bool,
) -> bool {
    if kind == BattlerTagKind::Seeded && battle.combatant(recipient).has_type(Type::Grass) {
        return false;
    }
    let mut tag = BattlerTag::new(kind).with_source(ctx.user, Some(ctx.mv.id));
    match kind {
        BattlerTagKind::Confused => tag = tag.with_turns(battle.rng.random_range(2, 5) as u8),
        BattlerTagKind::Charged => {
            tag = tag.with_payload(TagPayload::TypeBoost { ty: Type::Electric, multiplier: 2.0 })
        }
        _ => {}
    }
    battler::add_tag(battle, recipient, tag, simulated).succeeded()
}

fn try_protect(
    battle: &mut Battle,
    ctx: &MoveContext<'_>,
    recipient: CombatantId,
    simulated: bool,
) -> bool {
    let streak = (battle.combatant(recipient).consecutive_uses(ctx.mv.id) as u32)
        .min(MAX_PROTECT_STREAK);
    if streak > 0 && battle.rng.random_int(3u32.pow(streak)) != 0 {
        trace!(?recipient, streak, "protect streak failed");
        return false;
    }
    battler::add_tag(battle, recipient, BattlerTag::new(BattlerTagKind::Protected), simulated)
        .succeeded()
}

fn make_substitute(
    battle: &mut Battle,
    ctx: &MoveContext<'_>,
    recipient: CombatantId,
    simulated: bool,
) -> bool {
    let combatant = battle.combatant(recipient);
    let cost = combatant.max_hp() / 4;
    if combatant.tags.has(BattlerTagKind::Substitute) || combatant.hp <= cost {
        return false;
    }
    if simulated {
        return true;
    }
    indirect_damage(battle, recipient, u32::from(cost), DamageSource::Substitute);
    let tag = BattlerTag::new(BattlerTagKind::Substitute)
        .with_source(ctx.user, Some(ctx.mv.id))
        .with_payload(TagPayload::Substitute { hp: cost });
    battler::add_tag(battle, recipient, tag, false).succeeded()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityId;
    use crate::config::BattleConfig;
    use crate::moves::MoveId;
    use crate::state::{MoveRecord, MoveResult};
    use crate::roster::CombatantConfig;
    use crate::state::Side;
    use smallvec::SmallVec;

    fn duel(user: CombatantConfig, target: CombatantConfig) -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(BattleConfig::single(21));
        let a = battle.add_combatant(&user, Side::Player).unwrap();
        let b = battle.add_combatant(&target, Side::Enemy).unwrap();
        battle.summon(a, 0).unwrap();
        battle.summon(b, 0).unwrap();
        battle.take_events();
        (battle, a, b)
    }

    fn plain(name: &str) -> CombatantConfig {
        CombatantConfig::new(name).moves(&[MoveId::Tackle])
    }

    fn ctx(a: CombatantId, b: CombatantId, id: MoveId) -> MoveContext<'static> {
        let mv = id.get();
        MoveContext::new(a, b, mv, mv.data.move_type)
    }

    #[test]
    fn test_charge_doubles_next_electric_move() {
        use crate::pipeline::power::calculate_battle_power;
        use crate::pipeline::use_move;

        let (mut battle, a, b) = duel(
            CombatantConfig::new("A").moves(&[MoveId::Charge, MoveId::Thunderbolt]),
            plain("B"),
        );
        let before = calculate_battle_power(&battle, a, b, MoveId::Thunderbolt.get());
        assert_eq!(use_move(&mut battle, a, 0, None).unwrap().result, MoveResult::Success);
        assert!(battle.combatant(a).tags.has(BattlerTagKind::Charged));
        assert_eq!(calculate_battle_power(&battle, a, b, MoveId::Thunderbolt.get()), before * 2);
        // Non-electric moves are untouched
        assert_eq!(
            calculate_battle_power(&battle, a, b, MoveId::Tackle.get()),
            u32::from(MoveId::Tackle.get().data.power)
        );

        use_move(&mut battle, a, 1, None).unwrap();
        assert!(!battle.combatant(a).tags.has(BattlerTagKind::Charged));
    }

    #[test]
    fn test_type_and_ability_status_immunity() {
        let (mut battle, a, b) = duel(plain("A"), plain("B").types(Type::Fire, None));
        assert!(!try_inflict_status(&mut battle, b, StatusKind::Burn, Some(a), false));
        assert!(can_inflict_status(&battle, b, StatusKind::Paralysis));

        let (battle, _, b) = duel(plain("A"), plain("B").ability(AbilityId::Limber));
        assert!(!can_inflict_status(&battle, b, StatusKind::Paralysis));
    }

    #[test]
    fn test_status_does_not_overwrite() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        assert!(try_inflict_status(&mut battle, b, StatusKind::Poison, Some(a), false));
        assert!(!try_inflict_status(&mut battle, b, StatusKind::Burn, Some(a), false));
        assert_eq!(battle.combatant(b).status.map(|s| s.kind), Some(StatusKind::Poison));
        assert_eq!(
            battle.take_events(),
            vec![BattleEvent::StatusApplied { target: b, status: StatusKind::Poison }]
        );
    }

    #[test]
    fn test_sleep_counter_in_range() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        assert!(try_inflict_status(&mut battle, b, StatusKind::Sleep, Some(a), false));
        let turns = battle.combatant(b).status.map(|s| s.turns).unwrap();
        assert!((1..=3).contains(&turns));
    }

    #[test]
    fn test_clear_body_blocks_opponent_drops_only() {
        let (mut battle, a, b) = duel(plain("A"), plain("B").ability(AbilityId::Clearbody));
        assert!(!change_stages(&mut battle, a, b, &[(BattleStat::Atk, -1)], false));
        assert_eq!(battle.combatant(b).stage(BattleStat::Atk), 0);
        assert!(change_stages(&mut battle, b, b, &[(BattleStat::Atk, -1)], false));
        assert_eq!(battle.combatant(b).stage(BattleStat::Atk), -1);
    }

    #[test]
    fn test_defiant_reacts_to_opponent_drop() {
        let (mut battle, a, b) = duel(plain("A"), plain("B").ability(AbilityId::Defiant));
        assert!(change_stages(&mut battle, a, b, &[(BattleStat::Def, -1)], false));
        assert_eq!(battle.combatant(b).stage(BattleStat::Def), -1);
        assert_eq!(battle.combatant(b).stage(BattleStat::Atk), 2);
    }

    #[test]
    fn test_stage_at_bound_reports_unchanged() {
        let (mut battle, a, _) = duel(plain("A"), plain("B"));
        battle.combatant_mut(a).change_stage(BattleStat::Atk, 6);
        assert!(!change_stages(&mut battle, a, a, &[(BattleStat::Atk, 2)], false));
        assert_eq!(
            battle.take_events(),
            vec![BattleEvent::StatUnchanged { target: a, stat: BattleStat::Atk, rising: true }]
        );
    }

    #[test]
    fn test_recoil_and_drain_scale_with_damage() {
        let (mut battle, a, b) = duel(plain("A").stats([200, 100, 100, 100, 100, 100]), plain("B"));
        let recoil = MoveId::Doubleedge.get().effects().next().copied().unwrap();
        assert!(apply_effect(&mut battle, &ctx(a, b, MoveId::Doubleedge), &recoil, 90, false));
        assert_eq!(battle.combatant(a).hp, 170);

        let drain = MoveId::Gigadrain.get().effects().next().copied().unwrap();
        assert!(apply_effect(&mut battle, &ctx(a, b, MoveId::Gigadrain), &drain, 40, false));
        assert_eq!(battle.combatant(a).hp, 190);
        assert!(!apply_effect(&mut battle, &ctx(a, b, MoveId::Gigadrain), &drain, 0, false));
    }

    #[test]
    fn test_substitute_costs_a_quarter() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        let effect = MoveEffect::on_self(EffectKind::Substitute);
        assert!(apply_effect(&mut battle, &ctx(a, b, MoveId::Substitute), &effect, 0, false));
        let user = battle.combatant(a);
        assert_eq!(user.hp, user.max_hp() - user.max_hp() / 4);
        assert_eq!(
            user.tags.get(BattlerTagKind::Substitute).map(|t| t.payload.clone()),
            Some(TagPayload::Substitute { hp: user.max_hp() / 4 })
        );
        assert!(!apply_effect(&mut battle, &ctx(a, b, MoveId::Substitute), &effect, 0, false));
    }

    #[test]
    fn test_protect_first_use_always_succeeds() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        let before = battle.rng.state();
        let effect = MoveEffect::on_self(EffectKind::Protect);
        assert!(apply_effect(&mut battle, &ctx(a, b, MoveId::Protect), &effect, 0, false));
        assert_eq!(battle.rng.state(), before);
    }

    #[test]
    fn test_protect_streak_draws() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        battle.combatant_mut(a).push_move_record(MoveRecord {
            move_id: MoveId::Protect,
            targets: SmallVec::new(),
            result: MoveResult::Success,
            turn: 1,
        });
        let before = battle.rng.state();
        let effect = MoveEffect::on_self(EffectKind::Protect);
        apply_effect(&mut battle, &ctx(a, b, MoveId::Protect), &effect, 0, false);
        assert_ne!(battle.rng.state(), before);
    }

    #[test]
    fn test_leech_seed_fails_on_grass() {
        let (mut battle, a, b) = duel(plain("A"), plain("B").types(Type::Grass, None));
        let effect = MoveId::Leechseed.get().effects().next().copied().unwrap();
        assert!(!apply_effect(&mut battle, &ctx(a, b, MoveId::Leechseed), &effect, 0, false));
    }

    #[test]
    fn test_side_tags_land_on_the_right_side() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        let reflect = MoveId::Reflect.get().effects().next().copied().unwrap();
        assert!(apply_effect(&mut battle, &ctx(a, a, MoveId::Reflect), &reflect, 0, false));
        assert!(battle.field.has_arena_tag(ArenaTagKind::Reflect, Side::Player));
        assert!(!battle.field.has_arena_tag(ArenaTagKind::Reflect, Side::Enemy));

        let spikes = MoveId::Spikes.get().effects().next().copied().unwrap();
        assert!(apply_effect(&mut battle, &ctx(a, b, MoveId::Spikes), &spikes, 0, false));
        assert!(battle.field.has_arena_tag(ArenaTagKind::Spikes, Side::Enemy));
    }

    #[test]
    fn test_simulated_effects_leave_no_trace() {
        let (mut battle, a, b) = duel(plain("A"), plain("B"));
        let growl = MoveId::Growl.get().effects().next().copied().unwrap();
        assert!(apply_effect(&mut battle, &ctx(a, b, MoveId::Growl), &growl, 0, true));
        let rain = MoveId::Raindance.get().effects().next().copied().unwrap();
        assert!(apply_effect(&mut battle, &ctx(a, a, MoveId::Raindance), &rain, 0, true));
        assert!(try_inflict_status(&mut battle, b, StatusKind::Burn, Some(a), true));

        assert_eq!(battle.combatant(b).stage(BattleStat::Atk), 0);
        assert_eq!(battle.field.weather_kind(), None);
        assert_eq!(battle.combatant(b).status, None);
        assert!(battle.take_events().is_empty());
    }
}
