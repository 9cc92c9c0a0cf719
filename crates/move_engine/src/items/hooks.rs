use crate::battle::Battle;
use crate::cells::NumberCell;
use crate::pipeline::MoveContext;
use crate::state::CombatantId;

/// Called while the holder's move power is folded
pub type OnModifyPower = fn(battle: &Battle, ctx: &MoveContext<'_>, power: &mut NumberCell);

/// Called while the holder's move accuracy is computed
pub type OnModifyAccuracy = fn(battle: &Battle, ctx: &MoveContext<'_>, accuracy: &mut NumberCell);

/// Called while a move aimed at the holder has its accuracy computed
pub type OnDefenderAccuracy = fn(battle: &Battle, ctx: &MoveContext<'_>, accuracy: &mut NumberCell);

/// Adds to the holder's critical-hit stage
pub type OnCritStage = fn(battle: &Battle, holder: CombatantId, stage: &mut NumberCell);

/// Called after the holder lands a damaging hit
pub type OnAfterHit = fn(battle: &mut Battle, ctx: &MoveContext<'_>, simulated: bool);

/// Percent chance the holder moves first within its priority bracket
pub type OnBypassSpeed = fn(battle: &Battle, holder: CombatantId) -> u8;

/// Called once per turn end while the holder is active
pub type OnTurnEnd = fn(battle: &mut Battle, holder: CombatantId);

#[derive(Clone, Copy, Default)]
pub struct ItemHooks {
    pub on_modify_power: Option<OnModifyPower>,
    pub on_modify_accuracy: Option<OnModifyAccuracy>,
    pub on_defender_accuracy: Option<OnDefenderAccuracy>,
    pub on_crit_stage: Option<OnCritStage>,
    pub on_after_hit: Option<OnAfterHit>,
    pub on_bypass_speed: Option<OnBypassSpeed>,
    pub on_turn_end: Option<OnTurnEnd>,
}

impl ItemHooks {
    /// Empty hooks (default)
    pub const NONE: Self = Self {
        on_modify_power: None,
        on_modify_accuracy: None,
        on_defender_accuracy: None,
        on_crit_stage: None,
        on_after_hit: None,
        on_bypass_speed: None,
        on_turn_end: None,
    };
}
