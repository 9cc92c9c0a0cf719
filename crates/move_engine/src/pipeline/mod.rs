//! Move resolution pipeline.
//!
//! A requested (user, move, target) tuple moves through
//! `Selected -> ConditionsChecked -> TargetsResolved -> per-target
//! (accuracy, power, damage, secondary effects) -> Done`. Each stage folds
//! its value over a reference cell; see [`resolution::MoveResolution`] for
//! the state machine and [`power::calculate_battle_power`] for the power order.

pub mod accuracy;
pub mod damage;
pub mod effects;
pub mod formula;
pub mod modifier;
pub mod power;
pub mod resolution;

pub use modifier::Modifier;
pub use resolution::{
    execute_move, simulate_move, use_move, HitResult, MoveOutcome, MoveResolution, ResolutionState, TargetReport,
};

use crate::moves::Move;
use crate::state::CombatantId;
use crate::types::Type;

/// The (user, target, move) triple a stage runs against, with the move's
/// effective type for this use.
#[derive(Clone, Copy, Debug)]
pub struct MoveContext<'m> {
    pub user: CombatantId,
    pub target: CombatantId,
    pub mv: &'m Move,
    pub move_type: Type,
}

impl<'m> MoveContext<'m> {
    pub fn new(user: CombatantId, target: CombatantId, mv: &'m Move, move_type: Type) -> Self {
        Self { user, target, mv, move_type }
    }
}
