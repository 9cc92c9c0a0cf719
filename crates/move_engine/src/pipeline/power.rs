//! Move power: the fixed-order fold over a power cell.

use tracing::trace;

use super::MoveContext;
use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::cells::{NumberCell, TypeCell};
use crate::items;
use crate::moves::attrs::{apply_attrs_of_kind, AttrArgs, AttrKind};
use crate::moves::Move;
use crate::state::CombatantId;
use crate::tags::BattlerTagKind;
use crate::types::Type;

/// Minimum power of a same-type move after terastallizing.
pub const TERA_POWER_FLOOR: f64 = 60.0;

/// Helping Hand multiplier.
const HELPING_HAND: f64 = 1.5;

/// Effective type of `mv` for `user`, plus the multiplier a type-changing
/// ability attached to the change.
pub fn effective_move_type(battle: &Battle, user: CombatantId, mv: &Move) -> (Type, f64) {
    let ctx = MoveContext::new(user, user, mv, mv.data.move_type);
    let mut move_type = TypeCell::new(mv.data.move_type);
    apply_attrs_of_kind(AttrKind::VariableType, battle, &ctx, &mut AttrArgs::Type(&mut move_type));
    let mut multiplier = NumberCell::new(1.0);
    dispatch::apply_move_type_change(battle, user, mv, &mut move_type, &mut multiplier);
    (move_type.value, multiplier.value)
}

/// Power of `mv` used by `user` against `target`. Status moves have none.
///
/// Pure with respect to battle state. The fold runs in this order:
/// 1. type-changing ability (multiplier held until step 7)
/// 2. terastallized same-type floor
/// 3. user ability power hooks
/// 4. ally ability power hooks
/// 5. field auras, each distinct aura once
/// 6. user-side type boosts
/// 7. held type-change multiplier
/// 8. user type-boost tags
/// 9. move variable-power attributes
/// 10. weakening field tags and held-item boosters (not for typeless moves)
/// 11. Helping Hand
pub fn calculate_battle_power(
    battle: &Battle,
    user: CombatantId,
    target: CombatantId,
    mv: &Move,
) -> u32 {
    if mv.is_status() {
        return 0;
    }
    let (move_type, type_change_multiplier) = effective_move_type(battle, user, mv);
    let ctx = MoveContext::new(user, target, mv, move_type);
    let attacker = battle.combatant(user);
    let mut power = NumberCell::new(f64::from(mv.data.power));

    if attacker.terastallized
        && attacker.tera_type == Some(move_type)
        && power.value < TERA_POWER_FLOOR
        && mv.data.priority <= 0
        && !mv.is_multi_hit()
    {
        power.value = TERA_POWER_FLOOR;
    }

    dispatch::apply_user_power(battle, &ctx, &mut power);
    dispatch::apply_ally_power(battle, &ctx, &mut power);
    dispatch::apply_field_auras(battle, &ctx, &mut power);
    dispatch::apply_user_field_power(battle, &ctx, &mut power);

    power.scale(type_change_multiplier);

    for tag in attacker.tags.iter() {
        if let Some((ty, multiplier)) = tag.type_boost() {
            if ty == move_type {
                power.scale(multiplier);
            }
        }
    }

    apply_attrs_of_kind(AttrKind::VariablePower, battle, &ctx, &mut AttrArgs::Power(&mut power));

    if !mv.is_typeless() {
        for tag in &battle.field.arena_tags {
            if let Some(multiplier) = tag.kind.weakens(move_type) {
                power.scale(multiplier);
            }
        }
        items::apply_power(battle, &ctx, &mut power);
    }

    if attacker.tags.has(BattlerTagKind::HelpingHand) {
        power.scale(HELPING_HAND);
    }

    let result = power.floor_u32();
    trace!(?user, ?target, move_id = ?mv.id, power = result, "power computed");
    result
}
