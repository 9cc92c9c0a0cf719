//! Shapes of the catalog JSON files under `data/`.

use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Deserialize)]
pub struct TypeChartEntry {
    /// Keyed by attacking type or status key; 0 neutral, 1 weak, 2 resists, 3 immune
    #[serde(rename = "damageTaken")]
    pub damage_taken: BTreeMap<String, u8>,
}

#[derive(Deserialize)]
pub struct AbilityEntry {
    pub num: Option<i16>,
}

#[derive(Deserialize)]
pub struct ItemEntry {
    pub num: Option<i16>,
    #[serde(rename = "typeBoost")]
    pub type_boost: Option<String>,
}

/// `true` for moves that never miss, a percentage otherwise
#[derive(Deserialize)]
#[serde(untagged)]
pub enum Accuracy {
    Always(bool),
    Percent(i16),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveEntry {
    pub num: Option<i16>,
    #[serde(default)]
    pub base_power: u16,
    pub accuracy: Option<Accuracy>,
    #[serde(default)]
    pub pp: u8,
    #[serde(default)]
    pub priority: i8,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub move_type: Option<String>,
    pub target: Option<String>,
    pub chance: Option<i8>,
    #[serde(default)]
    pub flags: HashMap<String, u8>,
}

impl MoveEntry {
    /// -1 for moves that skip the accuracy roll.
    pub fn accuracy(&self) -> i16 {
        match self.accuracy {
            Some(Accuracy::Percent(n)) => n,
            Some(Accuracy::Always(_)) | None => -1,
        }
    }
}
