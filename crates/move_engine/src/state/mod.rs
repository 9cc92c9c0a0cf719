//! Per-combatant and per-battlefield runtime state.

pub mod combatant;
pub mod field;

pub use combatant::{AttackRecord, Combatant, MoveRecord, MoveResult, MoveSlot, TurnData};
pub use field::{Battlefield, Terrain, TerrainKind, Weather, WeatherKind, DEFAULT_FIELD_TURNS};

use serde::{Deserialize, Serialize};

use crate::types::TypeImmunities;

/// Number of move slots per combatant
pub const MAX_MOVES: usize = 4;

/// Number of stats affected by boosts (Atk, Def, SpA, SpD, Spe, Acc, Eva)
pub const BOOST_STATS: usize = 7;

/// Stat stage bounds
pub const MIN_STAGE: i8 = -6;
pub const MAX_STAGE: i8 = 6;

/// Permanent stats, in the order stored on a combatant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermanentStat {
    Hp = 0,
    Atk = 1,
    Def = 2,
    SpAtk = 3,
    SpDef = 4,
    Spd = 5,
}

/// Stats that carry a battle stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleStat {
    Atk = 0,
    Def = 1,
    SpAtk = 2,
    SpDef = 3,
    Spd = 4,
    Acc = 5,
    Eva = 6,
}

impl BattleStat {
    pub const ALL: [BattleStat; BOOST_STATS] = [
        BattleStat::Atk,
        BattleStat::Def,
        BattleStat::SpAtk,
        BattleStat::SpDef,
        BattleStat::Spd,
        BattleStat::Acc,
        BattleStat::Eva,
    ];

    /// The permanent stat this stage scales, if any (accuracy/evasion have none).
    pub const fn permanent(self) -> Option<PermanentStat> {
        match self {
            BattleStat::Atk => Some(PermanentStat::Atk),
            BattleStat::Def => Some(PermanentStat::Def),
            BattleStat::SpAtk => Some(PermanentStat::SpAtk),
            BattleStat::SpDef => Some(PermanentStat::SpDef),
            BattleStat::Spd => Some(PermanentStat::Spd),
            BattleStat::Acc | BattleStat::Eva => None,
        }
    }
}

/// Non-volatile status conditions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Burn,
    Poison,
    Toxic,
    Paralysis,
    Sleep,
    Freeze,
}

impl StatusKind {
    /// Type immunity flag that blocks this status.
    pub fn immunity(self) -> TypeImmunities {
        match self {
            StatusKind::Burn => TypeImmunities::BRN,
            StatusKind::Poison => TypeImmunities::PSN,
            StatusKind::Toxic => TypeImmunities::TOX,
            StatusKind::Paralysis => TypeImmunities::PAR,
            StatusKind::Freeze => TypeImmunities::FRZ,
            StatusKind::Sleep => TypeImmunities::empty(),
        }
    }

    pub const fn is_poison(self) -> bool {
        matches!(self, StatusKind::Poison | StatusKind::Toxic)
    }
}

/// Active status with its counter (sleep turns remaining, toxic escalation).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCondition {
    pub kind: StatusKind,
    pub turns: u8,
}

impl StatusCondition {
    pub const fn new(kind: StatusKind) -> Self {
        Self { kind, turns: 0 }
    }
}

/// Which half of the field a combatant fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub const fn opposite(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// Registry key of a combatant. Tags and turn records hold these instead of
/// references, and resolve them through the battle when needed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u8);

/// Field slot addressed by commands and targeting.
///
/// `Attacker` is a sentinel resolved at execution time to whoever most
/// recently hit the user.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlerIndex {
    Player = 0,
    Player2 = 1,
    Enemy = 2,
    Enemy2 = 3,
    Attacker = 4,
}

impl BattlerIndex {
    /// Concrete field slots in field order.
    pub const FIELD: [BattlerIndex; 4] = [
        BattlerIndex::Player,
        BattlerIndex::Player2,
        BattlerIndex::Enemy,
        BattlerIndex::Enemy2,
    ];

    pub const fn from_side_slot(side: Side, slot: u8) -> BattlerIndex {
        match (side, slot) {
            (Side::Player, 0) => BattlerIndex::Player,
            (Side::Player, _) => BattlerIndex::Player2,
            (Side::Enemy, 0) => BattlerIndex::Enemy,
            (Side::Enemy, _) => BattlerIndex::Enemy2,
        }
    }

    pub const fn side(self) -> Option<Side> {
        match self {
            BattlerIndex::Player | BattlerIndex::Player2 => Some(Side::Player),
            BattlerIndex::Enemy | BattlerIndex::Enemy2 => Some(Side::Enemy),
            BattlerIndex::Attacker => None,
        }
    }

    pub const fn slot(self) -> Option<u8> {
        match self {
            BattlerIndex::Player | BattlerIndex::Enemy => Some(0),
            BattlerIndex::Player2 | BattlerIndex::Enemy2 => Some(1),
            BattlerIndex::Attacker => None,
        }
    }

    pub const fn is_sentinel(self) -> bool {
        matches!(self, BattlerIndex::Attacker)
    }
}

/// Apply stat stage boost to a base stat
/// Stages range from -6 to +6
/// Multipliers: -6 = 2/8, -5 = 2/7, ..., 0 = 2/2, ..., +6 = 8/2
#[inline]
pub fn apply_stat_boost(base: u16, stage: i8) -> u16 {
    let stage = stage.clamp(MIN_STAGE, MAX_STAGE) as i32;
    let (numerator, denominator) = if stage >= 0 {
        (2 + stage, 2)
    } else {
        (2, 2 - stage)
    };
    ((base as i32 * numerator) / denominator) as u16
}
