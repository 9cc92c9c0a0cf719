//! Battle configuration.

use serde::{Deserialize, Serialize};

/// Number of field slots per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BattleFormat {
    #[default]
    Single,
    Double,
}

impl BattleFormat {
    pub const fn slots_per_side(self) -> u8 {
        match self {
            BattleFormat::Single => 1,
            BattleFormat::Double => 2,
        }
    }
}

/// Per-battle settings, usually loaded from a scenario file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed for the battle RNG
    pub seed: u64,
    pub format: BattleFormat,
    /// Highest level a roster entry may declare
    pub level_cap: u8,
    /// Turn limit for scripted runs (0 = unlimited)
    pub max_turns: u16,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            format: BattleFormat::Single,
            level_cap: 100,
            max_turns: 0,
        }
    }
}

impl BattleConfig {
    pub fn single(seed: u64) -> Self {
        Self { seed, ..Default::default() }
    }

    pub fn double(seed: u64) -> Self {
        Self {
            seed,
            format: BattleFormat::Double,
            ..Default::default()
        }
    }
}
