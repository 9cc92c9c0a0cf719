use crate::abilities::attrs::{AbAttr, ImmunityReaction, PowerCondition, PriorityCondition};
use crate::abilities::AbilityId;
use crate::moves::{MoveCategory, MoveFlags};
use crate::state::{BattleStat, StatusKind, TerrainKind, WeatherKind};
use crate::types::Type;

/// Dark Aura / Fairy Aura boost
const AURA_MULTIPLIER: f64 = 4.0 / 3.0;

/// Ordered attributes of an ability.
#[inline]
pub fn ability_attrs(ability: AbilityId) -> &'static [AbAttr] {
    ABILITY_REGISTRY[ability as usize]
}

pub static ABILITY_REGISTRY: [&[AbAttr]; AbilityId::COUNT] = {
    let mut registry: [&[AbAttr]; AbilityId::COUNT] = [&[]; AbilityId::COUNT];

    // =========================================================================
    // Weather / Terrain Setters
    // =========================================================================
    registry[AbilityId::Drizzle as usize] = &[AbAttr::SummonWeather(WeatherKind::Rain)];
    registry[AbilityId::Drought as usize] = &[AbAttr::SummonWeather(WeatherKind::Sun)];
    registry[AbilityId::Electricsurge as usize] = &[AbAttr::SummonTerrain(TerrainKind::Electric)];
    registry[AbilityId::Psychicsurge as usize] = &[AbAttr::SummonTerrain(TerrainKind::Psychic)];
    registry[AbilityId::Cloudnine as usize] = &[AbAttr::SuppressWeather];
    registry[AbilityId::Airlock as usize] = &[AbAttr::SuppressWeather];

    // =========================================================================
    // Switch-in Effects
    // =========================================================================
    registry[AbilityId::Intimidate as usize] =
        &[AbAttr::SummonOpponentStages(&[(BattleStat::Atk, -1)])];

    // =========================================================================
    // Priority and Turn Order
    // =========================================================================
    registry[AbilityId::Prankster as usize] = &[AbAttr::PriorityBoost {
        condition: PriorityCondition::StatusMove,
        delta: 1,
    }];
    registry[AbilityId::Galewings as usize] = &[AbAttr::PriorityBoost {
        condition: PriorityCondition::TypeAtFullHp(Type::Flying),
        delta: 1,
    }];
    registry[AbilityId::Quickdraw as usize] = &[AbAttr::BypassSpeedChance(30)];
    registry[AbilityId::Stall as usize] = &[AbAttr::ActLast];
    registry[AbilityId::Truant as usize] = &[AbAttr::LoafAfterActing];

    // =========================================================================
    // Type Changers
    // =========================================================================
    registry[AbilityId::Pixilate as usize] = &[AbAttr::MoveTypeChange {
        from: Type::Normal,
        to: Type::Fairy,
        multiplier: 1.2,
    }];
    registry[AbilityId::Aerilate as usize] = &[AbAttr::MoveTypeChange {
        from: Type::Normal,
        to: Type::Flying,
        multiplier: 1.2,
    }];

    // =========================================================================
    // Base Power Modifiers
    // =========================================================================
    registry[AbilityId::Technician as usize] = &[AbAttr::PowerBoost {
        condition: PowerCondition::PowerAtMost(60),
        multiplier: 1.5,
    }];
    registry[AbilityId::Ironfist as usize] = &[AbAttr::PowerBoost {
        condition: PowerCondition::Flag(MoveFlags::PUNCH),
        multiplier: 1.2,
    }];
    registry[AbilityId::Toughclaws as usize] = &[AbAttr::PowerBoost {
        condition: PowerCondition::Flag(MoveFlags::CONTACT),
        multiplier: 1.3,
    }];
    registry[AbilityId::Sheerforce as usize] = &[
        AbAttr::PowerBoost {
            condition: PowerCondition::HasSecondaryEffect,
            multiplier: 1.3,
        },
        AbAttr::SuppressOwnSecondaryEffects,
    ];
    registry[AbilityId::Battery as usize] = &[AbAttr::AllyCategoryPowerBoost {
        category: MoveCategory::Special,
        multiplier: 1.3,
    }];
    registry[AbilityId::Steelyspirit as usize] = &[AbAttr::UserFieldTypePowerBoost {
        ty: Type::Steel,
        multiplier: 1.5,
    }];
    registry[AbilityId::Darkaura as usize] = &[AbAttr::FieldTypePowerBoost {
        ty: Type::Dark,
        multiplier: AURA_MULTIPLIER,
    }];
    registry[AbilityId::Fairyaura as usize] = &[AbAttr::FieldTypePowerBoost {
        ty: Type::Fairy,
        multiplier: AURA_MULTIPLIER,
    }];

    // =========================================================================
    // Stat Modifiers
    // =========================================================================
    registry[AbilityId::Adaptability as usize] = &[AbAttr::StabMultiplier(2.0)];
    registry[AbilityId::Hugepower as usize] = &[AbAttr::StatMultiplier {
        stat: BattleStat::Atk,
        multiplier: 2.0,
        physical_only: false,
    }];
    registry[AbilityId::Hustle as usize] = &[
        AbAttr::StatMultiplier {
            stat: BattleStat::Atk,
            multiplier: 1.5,
            physical_only: false,
        },
        AbAttr::StatMultiplier {
            stat: BattleStat::Acc,
            multiplier: 0.8,
            physical_only: true,
        },
    ];
    registry[AbilityId::Compoundeyes as usize] = &[AbAttr::StatMultiplier {
        stat: BattleStat::Acc,
        multiplier: 1.3,
        physical_only: false,
    }];

    // =========================================================================
    // Immunities and Absorption
    // =========================================================================
    registry[AbilityId::Levitate as usize] = &[AbAttr::TypeImmunity {
        ty: Type::Ground,
        reaction: ImmunityReaction::None,
    }];
    registry[AbilityId::Voltabsorb as usize] = &[AbAttr::TypeImmunity {
        ty: Type::Electric,
        reaction: ImmunityReaction::Heal { num: 1, den: 4 },
    }];
    registry[AbilityId::Waterabsorb as usize] = &[AbAttr::TypeImmunity {
        ty: Type::Water,
        reaction: ImmunityReaction::Heal { num: 1, den: 4 },
    }];
    registry[AbilityId::Flashfire as usize] = &[AbAttr::TypeImmunity {
        ty: Type::Fire,
        reaction: ImmunityReaction::FlashFire,
    }];
    registry[AbilityId::Lightningrod as usize] = &[
        AbAttr::TypeImmunity {
            ty: Type::Electric,
            reaction: ImmunityReaction::StatBoost(BattleStat::SpAtk, 1),
        },
        AbAttr::RedirectType(Type::Electric),
    ];
    registry[AbilityId::Stormdrain as usize] = &[
        AbAttr::TypeImmunity {
            ty: Type::Water,
            reaction: ImmunityReaction::StatBoost(BattleStat::SpAtk, 1),
        },
        AbAttr::RedirectType(Type::Water),
    ];
    registry[AbilityId::Wonderskin as usize] = &[AbAttr::StatusAccuracyCap(50)];
    registry[AbilityId::Limber as usize] = &[AbAttr::StatusImmunity(StatusKind::Paralysis)];
    registry[AbilityId::Waterveil as usize] = &[AbAttr::StatusImmunity(StatusKind::Burn)];
    registry[AbilityId::Clearbody as usize] = &[AbAttr::ProtectStats];
    registry[AbilityId::Battlearmor as usize] = &[AbAttr::BlockCrit];
    registry[AbilityId::Shielddust as usize] = &[AbAttr::IgnoreSecondaryEffects];

    // =========================================================================
    // Defender Damage Modifiers
    // =========================================================================
    registry[AbilityId::Thickfat as usize] = &[AbAttr::ReceivedTypeDamage {
        types: &[Type::Fire, Type::Ice],
        multiplier: 0.5,
    }];
    registry[AbilityId::Multiscale as usize] = &[AbAttr::FullHpDamageReduction(0.5)];

    // =========================================================================
    // Contact and Hit Reactions
    // =========================================================================
    registry[AbilityId::Static as usize] = &[AbAttr::ContactStatus {
        status: StatusKind::Paralysis,
        chance: 30,
    }];
    registry[AbilityId::Flamebody as usize] = &[AbAttr::ContactStatus {
        status: StatusKind::Burn,
        chance: 30,
    }];
    registry[AbilityId::Roughskin as usize] = &[AbAttr::ContactDamage { divisor: 8 }];
    registry[AbilityId::Weakarmor as usize] = &[AbAttr::PhysicalHitStatChange(&[
        (BattleStat::Def, -1),
        (BattleStat::Spd, 2),
    ])];
    registry[AbilityId::Synchronize as usize] = &[AbAttr::SyncStatus];
    registry[AbilityId::Poisontouch as usize] = &[AbAttr::ContactInflict {
        status: StatusKind::Poison,
        chance: 30,
    }];
    registry[AbilityId::Defiant as usize] = &[AbAttr::StatLoweredBoost {
        stat: BattleStat::Atk,
        delta: 2,
    }];

    registry
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityStage;

    #[test]
    fn test_registry_lookup() {
        assert!(ability_attrs(AbilityId::Noability).is_empty());
        assert_eq!(
            ability_attrs(AbilityId::Drizzle),
            &[AbAttr::SummonWeather(WeatherKind::Rain)]
        );
    }

    #[test]
    fn test_multi_stage_ability_order() {
        let stages: Vec<AbilityStage> = ability_attrs(AbilityId::Lightningrod)
            .iter()
            .map(AbAttr::stage)
            .collect();
        assert_eq!(stages, vec![AbilityStage::PreDefend, AbilityStage::Redirect]);
    }
}
