//! Core damage formula and math utilities.
//!
//! Integer math with the truncation and "round half down" behavior the
//! damage formula expects.

use super::Modifier;

/// 32-bit overflow wrapping.
#[inline]
pub const fn of32(value: u64) -> u32 {
    (value & 0xFFFF_FFFF) as u32
}

/// Rounding that sends an exact half down.
///
/// The fractional part > 0.5 rounds up, otherwise rounds down.
#[inline]
pub fn pokeround(value: u32, divisor: u32) -> u32 {
    let quotient = value / divisor;
    let remainder = value % divisor;
    // 0.5 exactly rounds DOWN
    if remainder > divisor / 2 {
        quotient + 1
    } else {
        quotient
    }
}

/// Apply a 4096-scale modifier: `pokeround(value * modifier / 4096)`.
#[inline]
pub fn apply_modifier(value: u32, modifier: Modifier) -> u32 {
    if modifier == Modifier::ONE {
        return value;
    }
    let product = of32(u64::from(value) * u64::from(modifier.val()));
    pokeround(product, 4096)
}

/// Chain several 4096-scale modifiers into one.
///
/// Each intermediate result uses pokeround. The result is clamped to
/// roughly 0.0002x..32x.
pub fn chain_mods(modifiers: &[Modifier]) -> u32 {
    let mut result: u32 = 4096;
    for &modifier in modifiers {
        if modifier != Modifier::ONE {
            let product = of32(u64::from(result) * u64::from(modifier.val()));
            result = pokeround(product, 4096);
        }
    }
    result.clamp(1, 131072)
}

/// Base damage before modifiers.
///
/// Formula: `floor((floor(2 * Level / 5 + 2) * BasePower * Attack / Defense) / 50) + 2`
///
/// Each intermediate step is truncated.
pub fn get_base_damage(level: u32, base_power: u32, attack: u32, defense: u32) -> u32 {
    if defense == 0 {
        return 0;
    }
    let level_factor = 2 * level / 5 + 2;
    let numerator = of32(u64::from(level_factor) * u64::from(base_power));
    let numerator = of32(u64::from(numerator) * u64::from(attack));
    numerator / defense / 50 + 2
}

/// Damage for one of the 16 random rolls (0 = 85%, 15 = 100%).
#[inline]
pub fn apply_random_roll(base_damage: u32, roll_index: u8) -> u32 {
    let roll = 85 + u32::from(roll_index.min(15));
    of32(u64::from(base_damage) * u64::from(roll)) / 100
}

/// Apply type effectiveness on the 4 = 1x scale (always floor division).
#[inline]
pub fn apply_effectiveness(damage: u32, effectiveness: u8) -> u32 {
    of32(u64::from(damage) * u64::from(effectiveness)) / 4
}

/// Accuracy/Evasion stage table.
///
/// Index 0 = -6, Index 6 = 0, Index 12 = +6
const ACC_EVA_TABLE: [(u32, u32); 13] = [
    (3, 9), // -6: 33%
    (3, 8), // -5: 38%
    (3, 7), // -4: 43%
    (3, 6), // -3: 50%
    (3, 5), // -2: 60%
    (3, 4), // -1: 75%
    (3, 3), //  0: 100%
    (4, 3), // +1: 133%
    (5, 3), // +2: 167%
    (6, 3), // +3: 200%
    (7, 3), // +4: 233%
    (8, 3), // +5: 267%
    (9, 3), // +6: 300%
];

/// Multiplier for a combined accuracy-minus-evasion stage.
pub fn acc_eva_multiplier(stage: i8) -> f64 {
    let (num, den) = ACC_EVA_TABLE[(stage.clamp(-6, 6) + 6) as usize];
    f64::from(num) / f64::from(den)
}

/// Critical hit chance denominators by stage: 1/24, 1/8, 1/2, always.
pub const CRIT_CHANCES: [u32; 4] = [24, 8, 2, 1];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_of32() {
        assert_eq!(of32(100), 100);
        assert_eq!(of32(0xFFFF_FFFF), 0xFFFF_FFFF);
        assert_eq!(of32(0x1_0000_0000), 0);
    }

    #[test]
    fn test_pokeround_half_goes_down() {
        assert_eq!(pokeround(6, 4), 1); // 1.5
        assert_eq!(pokeround(7, 4), 2); // 1.75
        assert_eq!(pokeround(5, 4), 1); // 1.25
    }

    #[test]
    fn test_apply_modifier() {
        assert_eq!(apply_modifier(100, Modifier::ONE), 100);
        assert_eq!(apply_modifier(100, Modifier::ONE_POINT_FIVE), 150);
        assert_eq!(apply_modifier(100, Modifier::HALF), 50);
        assert_eq!(apply_modifier(100, Modifier::from_f64(2.0)), 200);
        assert_eq!(apply_modifier(100, Modifier::SPREAD), 75);
    }

    #[test]
    fn test_chain_mods() {
        assert_eq!(chain_mods(&[Modifier::ONE_POINT_FIVE]), 6144);
        // 1.5x * 1.5x = 2.25x
        assert_eq!(chain_mods(&[Modifier::ONE_POINT_FIVE, Modifier::ONE_POINT_FIVE]), 9216);
        // 1.5x * 0.5x = 0.75x
        assert_eq!(chain_mods(&[Modifier::ONE_POINT_FIVE, Modifier::HALF]), 3072);
    }

    #[test]
    fn test_base_damage() {
        // floor(floor(22 * 90 * 100 / 100) / 50) + 2 = 39 + 2
        assert_eq!(get_base_damage(50, 90, 100, 100), 41);
        assert_eq!(get_base_damage(100, 90, 100, 100), 77);
        assert_eq!(get_base_damage(50, 90, 100, 0), 0);
    }

    #[test]
    fn test_random_rolls() {
        assert_eq!(apply_random_roll(100, 0), 85);
        assert_eq!(apply_random_roll(100, 15), 100);
        assert_eq!(apply_random_roll(100, 40), 100);
    }

    #[test]
    fn test_acc_eva_table() {
        assert_eq!(acc_eva_multiplier(0), 1.0);
        assert_eq!(acc_eva_multiplier(6), 3.0);
        assert!((acc_eva_multiplier(-6) - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(acc_eva_multiplier(12), 3.0);
    }

    #[test]
    fn test_effectiveness_scale() {
        assert_eq!(apply_effectiveness(50, 8), 100);
        assert_eq!(apply_effectiveness(50, 2), 25);
        assert_eq!(apply_effectiveness(50, 0), 0);
    }
}
