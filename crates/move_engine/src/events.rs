//! Discrete events handed to the presentation layer.
//!
//! The engine never renders anything; every observable change is pushed onto
//! `Battle::events` as a [`BattleEvent`]. Simulated runs emit nothing.

use serde::Serialize;

use crate::abilities::AbilityId;
use crate::moves::MoveId;
use crate::state::{BattleStat, BattlerIndex, CombatantId, StatusKind, TerrainKind, WeatherKind};
use crate::tags::{ArenaTagKind, ArenaTagSide, BattlerTagKind};

/// Why a move stopped before execution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancelReason {
    Flinched,
    Confused,
    Paralyzed,
    Asleep,
    Frozen,
    Taunted,
    NoPp,
    /// Stopped by one of the user's own ability hooks
    Ability,
}

/// What caused a change in HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageSource {
    Move,
    Recoil,
    Status,
    Weather,
    LeechSeed,
    Hazard,
    Confusion,
    Substitute,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BattleEvent {
    TurnStarted { turn: u16 },
    TurnEnded { turn: u16 },
    Summoned { combatant: CombatantId, slot: BattlerIndex },
    Withdrawn { combatant: CombatantId },
    MoveUsed { user: CombatantId, move_id: MoveId },
    /// "But it failed!"
    MoveFailed { user: CombatantId, move_id: MoveId },
    MoveCancelled { user: CombatantId, move_id: MoveId, reason: CancelReason },
    ChargingMove { user: CombatantId, move_id: MoveId },
    Missed { user: CombatantId, target: CombatantId },
    NoEffect { target: CombatantId },
    Protected { target: CombatantId },
    CriticalHit { target: CombatantId },
    /// Emitted only when the multiplier differs from neutral (4 = 1x)
    Effectiveness { target: CombatantId, multiplier: u8 },
    HitCount { user: CombatantId, hits: u8 },
    Damage { target: CombatantId, amount: u16, hp_left: u16, source: DamageSource },
    SubstituteDamaged { target: CombatantId, amount: u16 },
    Heal { target: CombatantId, amount: u16, hp_left: u16 },
    StatusApplied { target: CombatantId, status: StatusKind },
    StatusCured { target: CombatantId, status: StatusKind },
    StatChanged { target: CombatantId, stat: BattleStat, delta: i8 },
    /// Stage already at its bound
    StatUnchanged { target: CombatantId, stat: BattleStat, rising: bool },
    TagAdded { target: CombatantId, tag: BattlerTagKind },
    TagStacked { target: CombatantId, tag: BattlerTagKind, layers: u8 },
    TagRefused { target: CombatantId, tag: BattlerTagKind },
    TagRemoved { target: CombatantId, tag: BattlerTagKind },
    ArenaTagAdded { side: ArenaTagSide, tag: ArenaTagKind, layers: u8 },
    ArenaTagRefused { side: ArenaTagSide, tag: ArenaTagKind },
    ArenaTagRemoved { side: ArenaTagSide, tag: ArenaTagKind },
    WeatherChanged { weather: Option<WeatherKind> },
    TerrainChanged { terrain: Option<TerrainKind> },
    AbilityShown { combatant: CombatantId, ability: AbilityId },
    Fainted { target: CombatantId },
    /// Generic message key with its subject, for text the presentation layer localizes
    Message { key: &'static str, subject: Option<CombatantId> },
}

impl BattleEvent {
    /// Events that change HP, status or stat stages of a combatant.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            BattleEvent::Damage { .. }
                | BattleEvent::Heal { .. }
                | BattleEvent::StatusApplied { .. }
                | BattleEvent::StatChanged { .. }
                | BattleEvent::TagAdded { .. }
                | BattleEvent::TagStacked { .. }
                | BattleEvent::ArenaTagAdded { .. }
        )
    }
}
