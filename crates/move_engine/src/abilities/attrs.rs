//! Ability attributes.
//!
//! Each ability is an ordered list of [`AbAttr`]s. Every attribute belongs to
//! exactly one [`AbilityStage`]; the pipeline visits a stage by filtering the
//! relevant combatants' attributes on it.

use crate::moves::{MoveCategory, MoveFlags};
use crate::state::{BattleStat, StatusKind, TerrainKind, WeatherKind};
use crate::types::Type;

/// Pipeline point at which an ability attribute participates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AbilityStage {
    /// Before the move is announced; hooks may cancel it
    PreMove,
    MoveTypeChange,
    /// User pre-attack power hooks
    VariableMovePower,
    AllyMovePower,
    /// Aura hooks from every active combatant
    FieldMovePower,
    /// Type boosts from the user's side of the field
    UserFieldMovePower,
    PreDefend,
    ReceivedDamage,
    IgnoreMoveEffects,
    StabBoost,
    StatMultiplier,
    PostDefend,
    PostAttack,
    ProtectStat,
    PostStatLowered,
    StatusImmunity,
    SuppressWeather,
    PostSummon,
    ModifyPriority,
    BypassSpeed,
    BlockCrit,
    Redirect,
}

/// Gate for a user power boost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PowerCondition {
    /// In-flight power at or below the bound
    PowerAtMost(u16),
    Flag(MoveFlags),
    /// The move carries a chance-based effect
    HasSecondaryEffect,
}

/// What happens when a pre-defend immunity absorbs a move.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ImmunityReaction {
    None,
    Heal { num: u16, den: u16 },
    StatBoost(BattleStat, i8),
    /// Grants the Flash Fire type boost
    FlashFire,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PriorityCondition {
    StatusMove,
    /// Moves of this type while the user is at full HP
    TypeAtFullHp(Type),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AbAttr {
    MoveTypeChange { from: Type, to: Type, multiplier: f64 },
    PowerBoost { condition: PowerCondition, multiplier: f64 },
    AllyCategoryPowerBoost { category: MoveCategory, multiplier: f64 },
    FieldTypePowerBoost { ty: Type, multiplier: f64 },
    UserFieldTypePowerBoost { ty: Type, multiplier: f64 },
    StabMultiplier(f64),
    StatMultiplier { stat: BattleStat, multiplier: f64, physical_only: bool },
    TypeImmunity { ty: Type, reaction: ImmunityReaction },
    /// Caps the accuracy of status moves aimed at the holder
    StatusAccuracyCap(i16),
    ReceivedTypeDamage { types: &'static [Type], multiplier: f64 },
    FullHpDamageReduction(f64),
    /// Holder ignores secondary effects aimed at it
    IgnoreSecondaryEffects,
    /// Holder's own moves drop their secondary effects
    SuppressOwnSecondaryEffects,
    ContactStatus { status: StatusKind, chance: u8 },
    ContactDamage { divisor: u16 },
    PhysicalHitStatChange(&'static [(BattleStat, i8)]),
    /// Passes a status inflicted by an opponent back to it, on any move
    SyncStatus,
    ContactInflict { status: StatusKind, chance: u8 },
    /// Skips the turn after one spent acting
    LoafAfterActing,
    ProtectStats,
    StatLoweredBoost { stat: BattleStat, delta: i8 },
    StatusImmunity(StatusKind),
    SuppressWeather,
    SummonWeather(WeatherKind),
    SummonTerrain(TerrainKind),
    SummonOpponentStages(&'static [(BattleStat, i8)]),
    PriorityBoost { condition: PriorityCondition, delta: i8 },
    BypassSpeedChance(u8),
    ActLast,
    BlockCrit,
    RedirectType(Type),
}

impl AbAttr {
    pub const fn stage(&self) -> AbilityStage {
        use AbAttr::*;
        match self {
            MoveTypeChange { .. } => AbilityStage::MoveTypeChange,
            PowerBoost { .. } => AbilityStage::VariableMovePower,
            AllyCategoryPowerBoost { .. } => AbilityStage::AllyMovePower,
            FieldTypePowerBoost { .. } => AbilityStage::FieldMovePower,
            UserFieldTypePowerBoost { .. } => AbilityStage::UserFieldMovePower,
            StabMultiplier(_) => AbilityStage::StabBoost,
            StatMultiplier { .. } => AbilityStage::StatMultiplier,
            TypeImmunity { .. } | StatusAccuracyCap(_) => AbilityStage::PreDefend,
            ReceivedTypeDamage { .. } | FullHpDamageReduction(_) => AbilityStage::ReceivedDamage,
            IgnoreSecondaryEffects | SuppressOwnSecondaryEffects => AbilityStage::IgnoreMoveEffects,
            ContactStatus { .. } | ContactDamage { .. } | PhysicalHitStatChange(_) | SyncStatus => {
                AbilityStage::PostDefend
            }
            LoafAfterActing => AbilityStage::PreMove,
            ContactInflict { .. } => AbilityStage::PostAttack,
            ProtectStats => AbilityStage::ProtectStat,
            StatLoweredBoost { .. } => AbilityStage::PostStatLowered,
            StatusImmunity(_) => AbilityStage::StatusImmunity,
            SuppressWeather => AbilityStage::SuppressWeather,
            SummonWeather(_) | SummonTerrain(_) | SummonOpponentStages(_) => AbilityStage::PostSummon,
            PriorityBoost { .. } => AbilityStage::ModifyPriority,
            BypassSpeedChance(_) | ActLast => AbilityStage::BypassSpeed,
            BlockCrit => AbilityStage::BlockCrit,
            RedirectType(_) => AbilityStage::Redirect,
        }
    }

    /// Whether activation announces the ability.
    pub const fn show_ability(&self) -> bool {
        matches!(
            self.stage(),
            AbilityStage::PreMove
                | AbilityStage::PreDefend
                | AbilityStage::PostDefend
                | AbilityStage::PostAttack
                | AbilityStage::ProtectStat
                | AbilityStage::PostStatLowered
                | AbilityStage::StatusImmunity
                | AbilityStage::PostSummon
                | AbilityStage::BypassSpeed
        )
    }

    /// Post-attack/post-defend hooks only fire on damaging hits unless this is false.
    pub const fn requires_damaging_hit(&self) -> bool {
        !matches!(self, AbAttr::SyncStatus)
            && matches!(self.stage(), AbilityStage::PostDefend | AbilityStage::PostAttack)
    }
}
