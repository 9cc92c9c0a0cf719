//! The immutable move catalog.
//!
//! Built once on first access and validated before it is published. A
//! validation failure is a programming error and aborts with the
//! [`CatalogError`] message.

use std::sync::OnceLock;

use tracing::debug;

use super::attrs::{EffectKind, EffectTrigger, MoveAttr, MoveEffect, MultiHitKind, StatusMatch};
use super::conditions::MoveCondition;
use super::{AttrKind, Move, MoveId};
use crate::error::CatalogError;
use crate::state::{BattleStat, StatusKind, TerrainKind, WeatherKind, MAX_STAGE, MIN_STAGE};
use crate::tags::{validate_tag_kinds, ArenaTagKind, BattlerTagKind};
use crate::types::Type;

static CATALOG: OnceLock<MoveCatalog> = OnceLock::new();

/// Global move catalog.
pub fn catalog() -> &'static MoveCatalog {
    CATALOG.get_or_init(|| match MoveCatalog::build() {
        Ok(catalog) => catalog,
        Err(err) => panic!("invalid move catalog: {err}"),
    })
}

/// Index-addressable moves, one per [`MoveId`].
#[derive(Debug)]
pub struct MoveCatalog {
    moves: Vec<Move>,
}

impl MoveCatalog {
    pub fn build() -> Result<Self, CatalogError> {
        validate_tag_kinds()?;
        let moves: Vec<Move> = MoveId::ALL.iter().map(|&id| define(id)).collect();
        for (idx, mv) in moves.iter().enumerate() {
            if mv.id as usize != idx {
                return Err(CatalogError::MissingMove(MoveId::ALL[idx]));
            }
            validate_move(mv)?;
        }
        debug!(count = moves.len(), "move catalog built");
        Ok(Self { moves })
    }

    #[inline]
    pub fn get(&self, id: MoveId) -> &Move {
        &self.moves[id as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> {
        self.moves.iter()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }
}

/// Construction-time invariants for a single move.
pub fn validate_move(mv: &Move) -> Result<(), CatalogError> {
    let move_id = mv.id;
    if !(-1..=100).contains(&mv.data.chance) {
        return Err(CatalogError::ChanceOutOfRange { move_id, chance: i16::from(mv.data.chance) });
    }
    for attr in mv.attrs() {
        if mv.is_status()
            && matches!(
                attr.kind(),
                AttrKind::VariablePower | AttrKind::FixedDamage | AttrKind::MultiHit
            )
        {
            return Err(CatalogError::DamageAttrOnStatusMove { move_id });
        }
        match attr {
            MoveAttr::Charge(Some(tag)) if !tag.is_semi_invulnerable() => {
                return Err(CatalogError::NotSemiInvulnerable { move_id, tag: *tag });
            }
            MoveAttr::Effect(effect) => validate_effect(move_id, effect)?,
            _ => {}
        }
    }
    Ok(())
}

fn validate_effect(move_id: MoveId, effect: &MoveEffect) -> Result<(), CatalogError> {
    if let Some(chance) = effect.chance {
        if !(0..=100).contains(&chance) {
            return Err(CatalogError::ChanceOutOfRange { move_id, chance: i16::from(chance) });
        }
    }
    match effect.kind {
        EffectKind::StatStages(changes) => {
            for &(_, delta) in changes {
                if delta == 0 || !(MIN_STAGE..=MAX_STAGE).contains(&delta) {
                    return Err(CatalogError::StageDeltaOutOfRange { move_id, delta });
                }
            }
        }
        EffectKind::Heal { num, den } | EffectKind::Recoil { num, den } | EffectKind::Drain { num, den } => {
            if den == 0 || num == 0 || num > den {
                return Err(CatalogError::InvalidFraction { move_id, num, den });
            }
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Definitions
// ============================================================================

fn status(kind: StatusKind) -> MoveEffect {
    MoveEffect::new(EffectKind::Status(kind))
}

fn stages(changes: &'static [(BattleStat, i8)]) -> MoveEffect {
    MoveEffect::new(EffectKind::StatStages(changes))
}

fn self_stages(changes: &'static [(BattleStat, i8)]) -> MoveEffect {
    MoveEffect::on_self(EffectKind::StatStages(changes))
}

fn tag(kind: BattlerTagKind) -> MoveEffect {
    MoveEffect::new(EffectKind::AddTag(kind))
}

fn self_tag(kind: BattlerTagKind) -> MoveEffect {
    MoveEffect::on_self(EffectKind::AddTag(kind))
}

fn side_tag(kind: ArenaTagKind) -> MoveEffect {
    MoveEffect::on_self(EffectKind::AddArenaTag(kind))
}

fn define(id: MoveId) -> Move {
    use MoveId::*;
    let b = Move::builder(id);
    match id {
        // ====================================================================
        // Multi-hit and crit
        // ====================================================================
        Doubleslap | Bulletseed => b.attr(MoveAttr::MultiHit(MultiHitKind::TwoToFive)),
        Doublekick => b.attr(MoveAttr::MultiHit(MultiHitKind::Two)),
        Slash => b.attr(MoveAttr::HighCrit(1)),

        // ====================================================================
        // Secondary status
        // ====================================================================
        Firepunch | Flamethrower | Sacredfire => b.effect(status(StatusKind::Burn)),
        Thunderpunch | Thunderbolt => b.effect(status(StatusKind::Paralysis)),
        Icebeam | Blizzard => b.effect(status(StatusKind::Freeze)),
        Thunder => b
            .attr(MoveAttr::WeatherAccuracy)
            .attr(MoveAttr::HitsSemiInvulnerable(BattlerTagKind::Flying))
            .effect(status(StatusKind::Paralysis)),
        Hurricane => b
            .attr(MoveAttr::WeatherAccuracy)
            .attr(MoveAttr::HitsSemiInvulnerable(BattlerTagKind::Flying))
            .effect(tag(BattlerTagKind::Confused)),
        Bodyslam => b
            .attr(MoveAttr::MinimizeAccuracy)
            .attr(MoveAttr::HitsTagPower { tag: BattlerTagKind::Minimized, multiplier: 2.0 })
            .effect(status(StatusKind::Paralysis)),
        Stomp => b
            .attr(MoveAttr::MinimizeAccuracy)
            .attr(MoveAttr::HitsTagPower { tag: BattlerTagKind::Minimized, multiplier: 2.0 })
            .effect(tag(BattlerTagKind::Flinched)),
        Fakeout => b
            .condition(MoveCondition::FirstTurnOnly)
            .effect(tag(BattlerTagKind::Flinched)),

        // ====================================================================
        // Status moves
        // ====================================================================
        Thunderwave => b
            .attr(MoveAttr::StatusMoveTypeImmunity(Type::Ground))
            .effect(status(StatusKind::Paralysis)),
        Willowisp => b.effect(status(StatusKind::Burn)),
        Toxic => b
            .attr(MoveAttr::ToxicAccuracy)
            .effect(status(StatusKind::Toxic)),
        Swordsdance => b.effect(self_stages(&[(BattleStat::Atk, 2)])),
        Growl => b.effect(stages(&[(BattleStat::Atk, -1)])),
        Screech => b.effect(stages(&[(BattleStat::Def, -2)])),
        Minimize => b
            .effect(self_tag(BattlerTagKind::Minimized))
            .effect(self_stages(&[(BattleStat::Eva, 2)])),
        Confuseray => b.effect(tag(BattlerTagKind::Confused)),
        Focusenergy => b.effect(self_tag(BattlerTagKind::FocusEnergy)),
        Recover => b.effect(MoveEffect::on_self(EffectKind::Heal { num: 1, den: 2 })),
        Leechseed => b.effect(tag(BattlerTagKind::Seeded)),
        Substitute => b.effect(MoveEffect::on_self(EffectKind::Substitute)),
        Protect => b.effect(MoveEffect::on_self(EffectKind::Protect)),
        Stockpile => b
            .effect(self_tag(BattlerTagKind::Stockpiling).fail_on_overlap())
            .effect(self_stages(&[(BattleStat::Def, 1), (BattleStat::SpDef, 1)])),
        Followme => b.effect(self_tag(BattlerTagKind::CenterOfAttention)),
        Helpinghand => b.effect(tag(BattlerTagKind::HelpingHand)),
        Taunt => b.effect(tag(BattlerTagKind::Taunted)),
        Charge => b
            .effect(self_tag(BattlerTagKind::Charged))
            .effect(self_stages(&[(BattleStat::SpDef, 1)])),
        Magnetrise => b.effect(self_tag(BattlerTagKind::MagnetRisen)),

        // ====================================================================
        // Field effects
        // ====================================================================
        Lightscreen => b.effect(side_tag(ArenaTagKind::LightScreen)),
        Reflect => b.effect(side_tag(ArenaTagKind::Reflect)),
        Tailwind => b.effect(side_tag(ArenaTagKind::Tailwind)),
        Gravity => b.effect(side_tag(ArenaTagKind::Gravity)),
        Mudsport => b.effect(side_tag(ArenaTagKind::MudSport)),
        Watersport => b.effect(side_tag(ArenaTagKind::WaterSport)),
        Spikes => b.effect(MoveEffect::new(EffectKind::AddArenaTag(ArenaTagKind::Spikes))),
        Toxicspikes => b.effect(MoveEffect::new(EffectKind::AddArenaTag(ArenaTagKind::ToxicSpikes))),
        Stealthrock => b.effect(MoveEffect::new(EffectKind::AddArenaTag(ArenaTagKind::StealthRock))),
        Raindance => b.effect(MoveEffect::on_self(EffectKind::Weather(WeatherKind::Rain))),
        Sunnyday => b.effect(MoveEffect::on_self(EffectKind::Weather(WeatherKind::Sun))),
        Electricterrain => b.effect(MoveEffect::on_self(EffectKind::Terrain(TerrainKind::Electric))),
        Psychicterrain => b.effect(MoveEffect::on_self(EffectKind::Terrain(TerrainKind::Psychic))),

        // ====================================================================
        // Variable power
        // ====================================================================
        Gust => b
            .attr(MoveAttr::HitsSemiInvulnerable(BattlerTagKind::Flying))
            .attr(MoveAttr::HitsTagPower { tag: BattlerTagKind::Flying, multiplier: 2.0 }),
        Earthquake => b
            .attr(MoveAttr::HitsSemiInvulnerable(BattlerTagKind::Underground))
            .attr(MoveAttr::HitsTagPower { tag: BattlerTagKind::Underground, multiplier: 2.0 }),
        Lowkick => b.attr(MoveAttr::WeightPower),
        Heavyslam => b.attr(MoveAttr::WeightRatioPower),
        Eruption => b.attr(MoveAttr::HpRatioPower),
        Brine => b.attr(MoveAttr::TargetHalfHpPower),
        Venoshock => b.attr(MoveAttr::TargetStatusPower(StatusMatch::Poisoned)),
        Hex => b.attr(MoveAttr::TargetStatusPower(StatusMatch::Any)),
        Facade => b.attr(MoveAttr::UserStatusPower),
        Furycutter => b
            .attr(MoveAttr::ConsecutiveUsePower { max_power: 160 })
            .partial(),
        Weatherball => b
            .attr(MoveAttr::WeatherBallType)
            .attr(MoveAttr::WeatherBallPower),
        Expandingforce => b
            .attr(MoveAttr::TerrainSpread(TerrainKind::Psychic))
            .attr(MoveAttr::TerrainPower { terrain: TerrainKind::Psychic, multiplier: 1.5 }),
        Terablast => b.attr(MoveAttr::TeraBlastType),

        // ====================================================================
        // Fixed damage, charge and recoil
        // ====================================================================
        Seismictoss => b.attr(MoveAttr::LevelDamage),
        Dragonrage => b.attr(MoveAttr::FixedDamage(40)),
        Counter => b.attr(MoveAttr::CounterDamage).partial(),
        Fissure => b
            .attr(MoveAttr::OneHitKo)
            .attr(MoveAttr::HitsSemiInvulnerable(BattlerTagKind::Underground)),
        Fly => b.attr(MoveAttr::Charge(Some(BattlerTagKind::Flying))),
        Dig => b.attr(MoveAttr::Charge(Some(BattlerTagKind::Underground))),
        Doubleedge => b.effect(
            MoveEffect::on_self(EffectKind::Recoil { num: 1, den: 3 })
                .trigger(EffectTrigger::PostApply),
        ),
        Gigadrain => b.effect(
            MoveEffect::on_self(EffectKind::Drain { num: 1, den: 2 })
                .trigger(EffectTrigger::PostApply),
        ),

        _ => b,
    }
    .build()
}
