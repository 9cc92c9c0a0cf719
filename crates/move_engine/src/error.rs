//! Error types.
//!
//! Game-semantic failures (a move failing, missing, or having no effect) are
//! never errors; they are outcome values in [`crate::pipeline`]. The types here
//! cover programming and configuration mistakes only.

use thiserror::Error;

use crate::moves::MoveId;
use crate::state::BattlerIndex;
use crate::tags::{ArenaTagKind, BattlerTagKind};

/// A catalog entry that violates a construction-time invariant.
#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("move {move_id:?}: chance {chance} is outside 0..=100")]
    ChanceOutOfRange { move_id: MoveId, chance: i16 },

    #[error("move {move_id:?}: stat stage delta {delta} must be non-zero and within -6..=6")]
    StageDeltaOutOfRange { move_id: MoveId, delta: i8 },

    #[error("move {move_id:?}: fraction {num}/{den} is invalid")]
    InvalidFraction { move_id: MoveId, num: u16, den: u16 },

    #[error("move {move_id:?}: charge tag {tag:?} is not a semi-invulnerable tag")]
    NotSemiInvulnerable { move_id: MoveId, tag: BattlerTagKind },

    #[error("move {move_id:?}: status move declares a damage attribute")]
    DamageAttrOnStatusMove { move_id: MoveId },

    #[error("battler tag {0:?} is stackable but has no layer cap")]
    UncappedBattlerTag(BattlerTagKind),

    #[error("arena tag {0:?} is stackable but has no layer cap")]
    UncappedArenaTag(ArenaTagKind),

    #[error("catalog is missing an entry for {0:?}")]
    MissingMove(MoveId),
}

/// Invalid roster, scenario or command input.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("unknown move key `{0}`")]
    UnknownMove(String),

    #[error("unknown ability key `{0}`")]
    UnknownAbility(String),

    #[error("unknown item key `{0}`")]
    UnknownItem(String),

    #[error("combatant `{0}` has no moves")]
    EmptyMoveset(String),

    #[error("combatant `{name}` has {count} moves; at most 4 are allowed")]
    TooManyMoves { name: String, count: usize },

    #[error("combatant `{0}` must have one or two types")]
    InvalidTypes(String),

    #[error("field slot {0:?} is already occupied")]
    SlotOccupied(BattlerIndex),

    #[error("field slot {0:?} is not available in this battle format")]
    SlotUnavailable(BattlerIndex),

    #[error("no active combatant in slot {0:?}")]
    EmptySlot(BattlerIndex),

    #[error("move index {index} is out of range for `{name}`")]
    MoveIndexOutOfRange { name: String, index: usize },

    #[error("no combatant with id {0:?}")]
    UnknownCombatant(crate::state::CombatantId),

    #[error("`{name}` cannot switch in: {reason}")]
    InvalidSwitch { name: String, reason: &'static str },

    #[error("side {0:?} has no combatants")]
    EmptySide(crate::state::Side),
}

pub type Result<T, E = ConfigError> = std::result::Result<T, E>;

/// Failure loading or running a scenario file.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid scenario: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("turn {turn}: unknown combatant `{name}`")]
    UnknownActor { turn: usize, name: String },

    #[error("turn {turn}: `{actor}` does not know `{key}`")]
    MoveNotKnown { turn: usize, actor: String, key: String },
}
