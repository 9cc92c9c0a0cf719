//! Move attributes: the closed set of components a move is assembled from.
//!
//! Calculation attributes (power, type, accuracy, target, damage shaping) run
//! against `&Battle` and write into the reference cell they are handed.
//! Effect attributes mutate the battle and honor the `simulated` flag.

use super::conditions::MoveCondition;
use super::{Move, MoveCategory, MoveTarget};
use crate::battle::Battle;
use crate::cells::{NumberCell, TypeCell};
use crate::pipeline::{effects, MoveContext};
use crate::rng::BattleRng;
use crate::state::{BattleStat, CombatantId, StatusKind, TerrainKind, WeatherKind};
use crate::tags::{ArenaTagKind, BattlerTagKind};
use crate::types::Type;

/// Run-time kind tag used to filter attributes by pipeline stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AttrKind {
    VariablePower,
    VariableType,
    VariableAccuracy,
    VariableTarget,
    /// Lets a move hit a semi-invulnerable target
    HitsSemiInvulnerable,
    FixedDamage,
    MultiHit,
    CritStage,
    Typeless,
    TypeImmunity,
    Charge,
    Effect,
}

/// Hit-count distribution of a multi-hit move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MultiHitKind {
    Two,
    Three,
    /// 2-5 hits weighted 35/35/15/15
    TwoToFive,
}

impl MultiHitKind {
    pub fn roll(self, rng: &mut BattleRng) -> u8 {
        match self {
            MultiHitKind::Two => 2,
            MultiHitKind::Three => 3,
            MultiHitKind::TwoToFive => match rng.random_int(100) {
                0..=34 => 2,
                35..=69 => 3,
                70..=84 => 4,
                _ => 5,
            },
        }
    }

    /// Expected hits, used for AI estimates.
    pub fn expected_hits(self) -> f64 {
        match self {
            MultiHitKind::Two => 2.0,
            MultiHitKind::Three => 3.0,
            MultiHitKind::TwoToFive => 3.1,
        }
    }
}

/// Status predicate for status-dependent power.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusMatch {
    Any,
    Poisoned,
}

/// When an effect fires relative to the damage step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EffectTrigger {
    PreApply,
    OnHit,
    PostApply,
}

impl EffectTrigger {
    pub const ORDER: [EffectTrigger; 3] =
        [EffectTrigger::PreApply, EffectTrigger::OnHit, EffectTrigger::PostApply];
}

/// What an effect does when it activates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum EffectKind {
    Status(StatusKind),
    StatStages(&'static [(BattleStat, i8)]),
    AddTag(BattlerTagKind),
    AddArenaTag(ArenaTagKind),
    Weather(WeatherKind),
    Terrain(TerrainKind),
    /// Restore `num/den` of max HP
    Heal { num: u16, den: u16 },
    /// Lose `num/den` of damage dealt
    Recoil { num: u16, den: u16 },
    /// Restore `num/den` of damage dealt
    Drain { num: u16, den: u16 },
    Protect,
    Substitute,
}

/// An effect attribute: a kind plus its activation rules.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoveEffect {
    pub kind: EffectKind,
    pub trigger: EffectTrigger,
    pub self_target: bool,
    /// Overrides the move's chance when set
    pub chance: Option<i8>,
    pub first_hit_only: bool,
    /// Fail the whole move when the effect is refused
    pub fail_on_overlap: bool,
}

impl MoveEffect {
    pub const fn new(kind: EffectKind) -> Self {
        Self {
            kind,
            trigger: EffectTrigger::OnHit,
            self_target: false,
            chance: None,
            first_hit_only: false,
            fail_on_overlap: false,
        }
    }

    /// Effect on the user.
    pub const fn on_self(kind: EffectKind) -> Self {
        Self { self_target: true, ..Self::new(kind) }
    }

    pub const fn trigger(mut self, trigger: EffectTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    pub const fn chance(mut self, chance: i8) -> Self {
        self.chance = Some(chance);
        self
    }

    pub const fn first_hit_only(mut self) -> Self {
        self.first_hit_only = true;
        self
    }

    pub const fn fail_on_overlap(mut self) -> Self {
        self.fail_on_overlap = true;
        self
    }

    /// Chance used for the activation roll (-1 = no roll).
    pub fn effective_chance(&self, mv: &Move) -> i8 {
        self.chance.unwrap_or(mv.data.chance)
    }

    /// An effect of a damaging move aimed at the target.
    pub fn is_secondary(&self, mv: &Move) -> bool {
        !mv.is_status() && !self.self_target
    }

    /// Roll the activation chance. No roll is drawn at -1 or 100.
    pub fn roll(&self, mv: &Move, rng: &mut BattleRng) -> bool {
        let chance = self.effective_chance(mv);
        if chance < 0 || chance >= 100 {
            return true;
        }
        (rng.random_int(100) as i32) < i32::from(chance)
    }
}

/// Cells an attribute can write into.
pub enum AttrArgs<'a> {
    Power(&'a mut NumberCell),
    Type(&'a mut TypeCell),
    Accuracy(&'a mut NumberCell),
    Target(&'a mut MoveTarget),
    CritStage(&'a mut NumberCell),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MoveAttr {
    // ========================================================================
    // Variable power
    // ========================================================================
    /// Multiply power when the target carries `tag`
    HitsTagPower { tag: BattlerTagKind, multiplier: f64 },
    /// Power scales with the user's remaining HP
    HpRatioPower,
    /// Power from target weight brackets
    WeightPower,
    /// Power from user/target weight ratio
    WeightRatioPower,
    /// Doubles per consecutive successful use, capped at `max_power`
    ConsecutiveUsePower { max_power: u16 },
    TargetHalfHpPower,
    TargetStatusPower(StatusMatch),
    UserStatusPower,
    WeatherBallPower,
    TerrainPower { terrain: TerrainKind, multiplier: f64 },

    // ========================================================================
    // Variable type / accuracy / target
    // ========================================================================
    WeatherBallType,
    TeraBlastType,
    /// Rain: always hits. Sun: 50.
    WeatherAccuracy,
    /// Poison-type users never miss
    ToxicAccuracy,
    /// Never misses a minimized target
    MinimizeAccuracy,
    OneHitKo,
    /// Spreads to all near enemies under `terrain` when the user is grounded
    TerrainSpread(TerrainKind),
    HitsSemiInvulnerable(BattlerTagKind),

    // ========================================================================
    // Damage shaping
    // ========================================================================
    /// Damage equals the user's level
    LevelDamage,
    FixedDamage(u16),
    /// Twice the physical damage last taken this turn
    CounterDamage,
    MultiHit(MultiHitKind),
    HighCrit(u8),
    Typeless,
    /// Status move that fails against `Type`
    StatusMoveTypeImmunity(Type),
    /// Two-turn move; the optional tag makes the user semi-invulnerable while charging
    Charge(Option<BattlerTagKind>),

    Effect(MoveEffect),
}

impl MoveAttr {
    pub fn kind(&self) -> AttrKind {
        use MoveAttr::*;
        match self {
            HitsTagPower { .. }
            | HpRatioPower
            | WeightPower
            | WeightRatioPower
            | ConsecutiveUsePower { .. }
            | TargetHalfHpPower
            | TargetStatusPower(_)
            | UserStatusPower
            | WeatherBallPower
            | TerrainPower { .. } => AttrKind::VariablePower,
            WeatherBallType | TeraBlastType => AttrKind::VariableType,
            WeatherAccuracy | ToxicAccuracy | MinimizeAccuracy | OneHitKo => {
                AttrKind::VariableAccuracy
            }
            TerrainSpread(_) => AttrKind::VariableTarget,
            HitsSemiInvulnerable(_) => AttrKind::HitsSemiInvulnerable,
            LevelDamage | FixedDamage(_) | CounterDamage => AttrKind::FixedDamage,
            MultiHit(_) => AttrKind::MultiHit,
            HighCrit(_) => AttrKind::CritStage,
            Typeless => AttrKind::Typeless,
            StatusMoveTypeImmunity(_) => AttrKind::TypeImmunity,
            Charge(_) => AttrKind::Charge,
            Effect(_) => AttrKind::Effect,
        }
    }

    /// Condition this attribute contributes to its move.
    pub fn condition(&self) -> Option<MoveCondition> {
        match self {
            MoveAttr::CounterDamage => Some(MoveCondition::TookPhysicalDamage),
            MoveAttr::OneHitKo => Some(MoveCondition::TargetLevelNotHigher),
            MoveAttr::Effect(e) => match e.kind {
                EffectKind::Heal { .. } if e.self_target => Some(MoveCondition::NotAtFullHp),
                EffectKind::Substitute => Some(MoveCondition::SubstituteAffordable),
                _ => None,
            },
            _ => None,
        }
    }

    /// Apply a calculation attribute. Returns whether it activated.
    pub fn apply_calc(&self, battle: &Battle, ctx: &MoveContext<'_>, args: &mut AttrArgs<'_>) -> bool {
        let user = battle.combatant(ctx.user);
        let target = battle.combatant(ctx.target);
        match (self, args) {
            (MoveAttr::HitsTagPower { tag, multiplier }, AttrArgs::Power(power)) => {
                if target.tags.has(*tag) {
                    power.scale(*multiplier);
                    return true;
                }
                false
            }
            (MoveAttr::HpRatioPower, AttrArgs::Power(power)) => {
                power.value = (power.value * user.hp_ratio()).max(1.0);
                true
            }
            (MoveAttr::WeightPower, AttrArgs::Power(power)) => {
                power.value = match target.weight {
                    w if w < 10.0 => 20.0,
                    w if w < 25.0 => 40.0,
                    w if w < 50.0 => 60.0,
                    w if w < 100.0 => 80.0,
                    w if w < 200.0 => 100.0,
                    _ => 120.0,
                };
                true
            }
            (MoveAttr::WeightRatioPower, AttrArgs::Power(power)) => {
                let ratio = if target.weight > 0.0 { user.weight / target.weight } else { 5.0 };
                power.value = match ratio {
                    r if r >= 5.0 => 120.0,
                    r if r >= 4.0 => 100.0,
                    r if r >= 3.0 => 80.0,
                    r if r >= 2.0 => 60.0,
                    _ => 40.0,
                };
                true
            }
            (MoveAttr::ConsecutiveUsePower { max_power }, AttrArgs::Power(power)) => {
                let streak = user.consecutive_uses(ctx.mv.id).min(8) as i32;
                if streak == 0 {
                    return false;
                }
                power.value = (power.value * 2f64.powi(streak)).min(f64::from(*max_power));
                true
            }
            (MoveAttr::TargetHalfHpPower, AttrArgs::Power(power)) => {
                if u32::from(target.hp) * 2 <= u32::from(target.max_hp()) {
                    power.scale(2.0);
                    return true;
                }
                false
            }
            (MoveAttr::TargetStatusPower(matcher), AttrArgs::Power(power)) => {
                let hit = match (matcher, target.status) {
                    (StatusMatch::Any, Some(_)) => true,
                    (StatusMatch::Poisoned, Some(s)) => s.kind.is_poison(),
                    _ => false,
                };
                if hit {
                    power.scale(2.0);
                }
                hit
            }
            (MoveAttr::UserStatusPower, AttrArgs::Power(power)) => {
                let boosted = matches!(
                    user.status.map(|s| s.kind),
                    Some(StatusKind::Burn | StatusKind::Poison | StatusKind::Toxic | StatusKind::Paralysis)
                );
                if boosted {
                    power.scale(2.0);
                }
                boosted
            }
            (MoveAttr::WeatherBallPower, AttrArgs::Power(power)) => {
                if battle.active_weather().is_some() {
                    power.scale(2.0);
                    return true;
                }
                false
            }
            (MoveAttr::TerrainPower { terrain, multiplier }, AttrArgs::Power(power)) => {
                if battle.active_terrain() == Some(*terrain) && battle.is_grounded(ctx.user) {
                    power.scale(*multiplier);
                    return true;
                }
                false
            }
            (MoveAttr::WeatherBallType, AttrArgs::Type(ty)) => {
                let new_type = match battle.active_weather() {
                    Some(WeatherKind::Sun) => Type::Fire,
                    Some(WeatherKind::Rain) => Type::Water,
                    Some(WeatherKind::Sandstorm) => Type::Rock,
                    Some(WeatherKind::Hail) => Type::Ice,
                    _ => return false,
                };
                ty.value = new_type;
                true
            }
            (MoveAttr::TeraBlastType, AttrArgs::Type(ty)) => match (user.terastallized, user.tera_type) {
                (true, Some(tera)) => {
                    ty.value = tera;
                    true
                }
                _ => false,
            },
            (MoveAttr::WeatherAccuracy, AttrArgs::Accuracy(acc)) => match battle.active_weather() {
                Some(WeatherKind::Rain) => {
                    acc.value = -1.0;
                    true
                }
                Some(WeatherKind::Sun) => {
                    acc.value = 50.0;
                    true
                }
                _ => false,
            },
            (MoveAttr::ToxicAccuracy, AttrArgs::Accuracy(acc)) => {
                if user.has_type(Type::Poison) {
                    acc.value = -1.0;
                    return true;
                }
                false
            }
            (MoveAttr::MinimizeAccuracy, AttrArgs::Accuracy(acc)) => {
                if target.tags.has(BattlerTagKind::Minimized) {
                    acc.value = -1.0;
                    return true;
                }
                false
            }
            (MoveAttr::OneHitKo, AttrArgs::Accuracy(acc)) => {
                let diff = i32::from(user.level) - i32::from(target.level);
                acc.value = f64::from(30 + diff.max(0));
                true
            }
            (MoveAttr::TerrainSpread(terrain), AttrArgs::Target(move_target)) => {
                if battle.active_terrain() == Some(*terrain) && battle.is_grounded(ctx.user) {
                    **move_target = MoveTarget::AllNearEnemies;
                    return true;
                }
                false
            }
            (MoveAttr::HighCrit(stages), AttrArgs::CritStage(stage)) => {
                stage.value += f64::from(*stages);
                true
            }
            _ => false,
        }
    }

    /// Damage that bypasses the formula, if this attribute fixes it.
    pub fn fixed_damage(&self, battle: &Battle, ctx: &MoveContext<'_>) -> Option<u32> {
        let user = battle.combatant(ctx.user);
        match self {
            MoveAttr::LevelDamage => Some(u32::from(user.level)),
            MoveAttr::FixedDamage(amount) => Some(u32::from(*amount)),
            MoveAttr::CounterDamage => {
                let taken = user
                    .turn_data
                    .attackers
                    .iter()
                    .find(|r| r.category == MoveCategory::Physical)
                    .map(|r| r.damage)?;
                Some(taken.saturating_mul(2).max(1))
            }
            MoveAttr::OneHitKo => Some(u32::from(battle.combatant(ctx.target).hp)),
            _ => None,
        }
    }

    /// Apply an effect attribute.
    pub fn apply_effect(
        &self,
        battle: &mut Battle,
        ctx: &MoveContext<'_>,
        damage_dealt: u32,
        simulated: bool,
    ) -> bool {
        match self {
            MoveAttr::Effect(effect) => effects::apply_effect(battle, ctx, effect, damage_dealt, simulated),
            _ => false,
        }
    }

    // ========================================================================
    // AI benefit scores
    // ========================================================================

    /// How much using this attribute helps the user.
    pub fn user_benefit_score(&self, battle: &Battle, user: CombatantId, mv: &Move) -> i32 {
        let MoveAttr::Effect(effect) = self else {
            return 0;
        };
        let combatant = battle.combatant(user);
        let weight = chance_weight(effect, mv);
        let score = match effect.kind {
            EffectKind::StatStages(changes) if effect.self_target => changes
                .iter()
                .map(|(stat, delta)| i32::from(combatant.stage_room(*stat, *delta)) * 10)
                .sum(),
            EffectKind::Heal { num, den } if effect.self_target => {
                let missing = 1.0 - combatant.hp_ratio();
                ((missing.min(f64::from(num) / f64::from(den))) * 100.0) as i32
            }
            EffectKind::Recoil { num, den } => -(i32::from(num) * 30 / i32::from(den)),
            EffectKind::Drain { num, den } => i32::from(num) * 20 / i32::from(den),
            EffectKind::Protect => 5,
            EffectKind::Substitute => 10,
            EffectKind::AddArenaTag(_) | EffectKind::Weather(_) | EffectKind::Terrain(_) => 10,
            _ => 0,
        };
        (f64::from(score) * weight) as i32
    }

    /// How much this attribute helps the target (negative = harms it).
    pub fn target_benefit_score(&self, battle: &Battle, target: CombatantId, mv: &Move) -> i32 {
        let MoveAttr::Effect(effect) = self else {
            return 0;
        };
        if effect.self_target {
            return 0;
        }
        let combatant = battle.combatant(target);
        let weight = chance_weight(effect, mv);
        let score = match effect.kind {
            EffectKind::Status(_) if combatant.status.is_some() => 0,
            EffectKind::Status(StatusKind::Sleep | StatusKind::Freeze) => -50,
            EffectKind::Status(StatusKind::Toxic) => -45,
            EffectKind::Status(_) => -40,
            EffectKind::StatStages(changes) => changes
                .iter()
                .map(|(stat, delta)| i32::from(combatant.stage_room(*stat, *delta)) * 10)
                .sum(),
            EffectKind::AddTag(BattlerTagKind::Confused | BattlerTagKind::Seeded) => -30,
            EffectKind::AddTag(BattlerTagKind::Flinched) => -20,
            EffectKind::AddTag(BattlerTagKind::Taunted) => -15,
            _ => 0,
        };
        (f64::from(score) * weight) as i32
    }
}

fn chance_weight(effect: &MoveEffect, mv: &Move) -> f64 {
    match effect.effective_chance(mv) {
        c if c < 0 || c >= 100 => 1.0,
        c => f64::from(c) / 100.0,
    }
}

/// Apply every attribute of `kind` in declaration order. Returns whether any activated.
pub fn apply_attrs_of_kind(
    kind: AttrKind,
    battle: &Battle,
    ctx: &MoveContext<'_>,
    args: &mut AttrArgs<'_>,
) -> bool {
    let mut activated = false;
    for attr in ctx.mv.attrs_of_kind(kind) {
        activated |= attr.apply_calc(battle, ctx, args);
    }
    activated
}
