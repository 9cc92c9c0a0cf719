//! Accuracy: a folded accuracy cell compared against a seeded roll.
//!
//! `-1` means "always hits" at every stage; once any stage writes it the
//! fold short-circuits.

use tracing::trace;

use super::{formula, MoveContext};
use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::cells::NumberCell;
use crate::items;
use crate::moves::attrs::{apply_attrs_of_kind, AttrArgs, AttrKind};
use crate::moves::MoveAttr;
use crate::state::{BattleStat, WeatherKind};
use crate::tags::ArenaTagKind;

/// Accuracy of the move against this target, before stages. `-1` always hits.
pub fn move_accuracy(battle: &Battle, ctx: &MoveContext<'_>) -> i16 {
    let mut accuracy = NumberCell::new(f64::from(ctx.mv.data.accuracy));
    if accuracy.value < 0.0 {
        return -1;
    }

    apply_attrs_of_kind(
        AttrKind::VariableAccuracy,
        battle,
        ctx,
        &mut AttrArgs::Accuracy(&mut accuracy),
    );
    if accuracy.value < 0.0 {
        return -1;
    }

    if let Some(cap) = dispatch::status_accuracy_cap(battle, ctx.target, ctx.mv) {
        accuracy.value = accuracy.value.min(f64::from(cap));
    }

    items::apply_accuracy(battle, ctx, &mut accuracy);

    if !ctx.mv.is_ohko() {
        if battle.field.has_field_tag(ArenaTagKind::Gravity) {
            accuracy.scale(5.0 / 3.0);
        }
        if battle.active_weather() == Some(WeatherKind::Fog) {
            accuracy.scale(0.9);
        }
    }

    accuracy.floor_u32().min(i16::MAX as u32) as i16
}

/// Whether `ctx.target` is out of reach behind a semi-invulnerable tag.
pub fn is_out_of_reach(battle: &Battle, ctx: &MoveContext<'_>) -> bool {
    if ctx.target == ctx.user {
        return false;
    }
    let Some(state) = battle.combatant(ctx.target).tags.semi_invulnerable() else {
        return false;
    };
    !ctx.mv
        .attrs_of_kind(AttrKind::HitsSemiInvulnerable)
        .any(|attr| matches!(attr, MoveAttr::HitsSemiInvulnerable(kind) if *kind == state))
}

/// Final hit chance after accuracy/evasion stages and ability stat multipliers.
/// `None` means the move cannot miss.
pub fn hit_chance(battle: &Battle, ctx: &MoveContext<'_>) -> Option<f64> {
    let base = move_accuracy(battle, ctx);
    if base < 0 {
        return None;
    }
    let mut chance = f64::from(base);
    if !ctx.mv.is_ohko() {
        let user = battle.combatant(ctx.user);
        let target = battle.combatant(ctx.target);
        let stage = user.stage(BattleStat::Acc).saturating_sub(target.stage(BattleStat::Eva));
        chance *= formula::acc_eva_multiplier(stage);
        chance *= dispatch::stat_multiplier(battle, ctx.user, BattleStat::Acc, ctx.mv.category());
    }
    Some(chance)
}

/// Roll whether the move connects with `ctx.target`.
pub fn check_hit(battle: &mut Battle, ctx: &MoveContext<'_>) -> bool {
    if is_out_of_reach(battle, ctx) {
        trace!(user = ?ctx.user, target = ?ctx.target, "target semi-invulnerable");
        return false;
    }
    if ctx.target == ctx.user {
        return true;
    }
    let Some(chance) = hit_chance(battle, ctx) else {
        return true;
    };
    let roll = battle.rng.random_int(100);
    trace!(user = ?ctx.user, target = ?ctx.target, chance, roll, "accuracy roll");
    f64::from(roll) < chance
}
