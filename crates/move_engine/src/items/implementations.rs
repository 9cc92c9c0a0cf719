//! Item hook implementations.

use crate::battle::Battle;
use crate::cells::NumberCell;
use crate::pipeline::{effects, MoveContext};
use crate::state::CombatantId;
use crate::tags::{battler, BattlerTag, BattlerTagKind};

/// Type boosters (Charcoal, Mystic Water, ...): 1.2x to moves of the item's type.
pub fn on_modify_power_type_boost(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell) {
    if battle.combatant(ctx.user).item.data().type_boost == Some(ctx.move_type) {
        power.scale(1.2);
    }
}

// Wide Lens: 1.1x accuracy.
pub fn on_modify_accuracy_wide_lens(_battle: &Battle, _ctx: &MoveContext<'_>, accuracy: &mut NumberCell) {
    accuracy.scale(1.1);
}

// Zoom Lens: 1.2x accuracy when the target has already moved this turn.
pub fn on_modify_accuracy_zoom_lens(battle: &Battle, ctx: &MoveContext<'_>, accuracy: &mut NumberCell) {
    if ctx.target != ctx.user && battle.combatant(ctx.target).turn_data.acted {
        accuracy.scale(1.2);
    }
}

// Bright Powder: 0.9x accuracy of moves aimed at the holder.
pub fn on_defender_accuracy_bright_powder(
    _battle: &Battle,
    _ctx: &MoveContext<'_>,
    accuracy: &mut NumberCell,
) {
    accuracy.scale(0.9);
}

// Scope Lens: +1 crit stage.
pub fn on_crit_stage_scope_lens(_battle: &Battle, _holder: CombatantId, stage: &mut NumberCell) {
    stage.value += 1.0;
}

// King's Rock: 10% flinch on damaging hits against a target that has not moved yet.
pub fn on_after_hit_kings_rock(battle: &mut Battle, ctx: &MoveContext<'_>, simulated: bool) {
    let target = battle.combatant(ctx.target);
    if target.is_fainted() || target.turn_data.acted || ctx.target == ctx.user {
        return;
    }
    if battle.rng.random_int(100) < 10 {
        let tag = BattlerTag::new(BattlerTagKind::Flinched).with_source(ctx.user, Some(ctx.mv.id));
        battler::add_tag(battle, ctx.target, tag, simulated);
    }
}

// Quick Claw: 10% to move first in the bracket.
pub fn on_bypass_speed_quick_claw(_battle: &Battle, _holder: CombatantId) -> u8 {
    10
}

// Leftovers: heal 1/16 max HP.
pub fn on_turn_end_leftovers(battle: &mut Battle, holder: CombatantId) {
    let combatant = battle.combatant(holder);
    if combatant.is_fainted() || combatant.is_full_hp() {
        return;
    }
    let amount = (u32::from(combatant.max_hp()) / 16).max(1);
    effects::heal(battle, holder, amount, false);
}
