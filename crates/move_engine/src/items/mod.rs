//! Held item hooks and registry.

// Include generated item identifiers
include!(concat!(env!("OUT_DIR"), "/items.rs"));

pub mod hooks;
pub mod implementations;
pub mod registry;

pub use hooks::ItemHooks;
pub use registry::ITEM_REGISTRY;

use crate::battle::Battle;
use crate::cells::NumberCell;
use crate::pipeline::MoveContext;
use crate::state::CombatantId;

/// Hooks for the item a combatant holds.
#[inline]
fn holder_hooks(battle: &Battle, id: CombatantId) -> Option<&'static ItemHooks> {
    ITEM_REGISTRY[battle.combatant(id).item as usize].as_ref()
}

pub fn apply_power(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell) {
    if let Some(hook) = holder_hooks(battle, ctx.user).and_then(|h| h.on_modify_power) {
        hook(battle, ctx, power);
    }
}

/// User-side then target-side accuracy hooks.
pub fn apply_accuracy(battle: &Battle, ctx: &MoveContext<'_>, accuracy: &mut NumberCell) {
    if let Some(hook) = holder_hooks(battle, ctx.user).and_then(|h| h.on_modify_accuracy) {
        hook(battle, ctx, accuracy);
    }
    if ctx.target != ctx.user {
        if let Some(hook) = holder_hooks(battle, ctx.target).and_then(|h| h.on_defender_accuracy) {
            hook(battle, ctx, accuracy);
        }
    }
}

pub fn apply_crit_stage(battle: &Battle, id: CombatantId, stage: &mut NumberCell) {
    if let Some(hook) = holder_hooks(battle, id).and_then(|h| h.on_crit_stage) {
        hook(battle, id, stage);
    }
}

pub fn apply_after_hit(battle: &mut Battle, ctx: &MoveContext<'_>, simulated: bool) {
    if let Some(hook) = holder_hooks(battle, ctx.user).and_then(|h| h.on_after_hit) {
        hook(battle, ctx, simulated);
    }
}

pub fn bypass_speed_chance(battle: &Battle, id: CombatantId) -> Option<u8> {
    holder_hooks(battle, id)
        .and_then(|h| h.on_bypass_speed)
        .map(|hook| hook(battle, id))
}

pub fn apply_turn_end(battle: &mut Battle, id: CombatantId) {
    if let Some(hook) = holder_hooks(battle, id).and_then(|h| h.on_turn_end) {
        hook(battle, id);
    }
}
