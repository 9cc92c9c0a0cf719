//! Type-safe damage modifier.

/// A fixed-point damage modifier (4096 scale).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Modifier(pub u16);

impl Modifier {
    /// 1.0x modifier (4096).
    pub const ONE: Self = Self(4096);

    /// 0.5x modifier (2048).
    pub const HALF: Self = Self(2048);

    /// 1.5x modifier (6144).
    pub const ONE_POINT_FIVE: Self = Self(6144);

    /// 1.3x modifier (5325), used by terrain boosts.
    pub const ONE_POINT_THREE: Self = Self(5325);

    /// Spread moves hitting more than one target (0.75x).
    pub const SPREAD: Self = Self(3072);

    /// Screens when the battle is a double battle.
    /// Value is 2732 (approx 2/3).
    pub const SCREENS_DOUBLES: Self = Self(2732);

    pub const fn new(val: u16) -> Self {
        Self(val)
    }

    pub const fn val(self) -> u16 {
        self.0
    }

    /// Nearest 4096-scale modifier for a float multiplier: `round(val * 4096)`.
    pub fn from_f64(val: f64) -> Self {
        Self((val * 4096.0 + 0.5).clamp(0.0, f64::from(u16::MAX)) as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_matches_named_constants() {
        assert_eq!(Modifier::from_f64(1.0), Modifier::ONE);
        assert_eq!(Modifier::from_f64(0.5), Modifier::HALF);
        assert_eq!(Modifier::from_f64(1.5), Modifier::ONE_POINT_FIVE);
        assert_eq!(Modifier::from_f64(0.75), Modifier::SPREAD);
        assert_eq!(Modifier::from_f64(1.3), Modifier::ONE_POINT_THREE);
    }
}
