//! Combatant blueprints.
//!
//! A [`CombatantConfig`] describes a combatant before it joins a battle:
//! permanent stats, ability, held item and moveset. [`RosterEntry`] is the
//! string-keyed form read from scenario files.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::abilities::AbilityId;
use crate::error::{ConfigError, Result};
use crate::items::ItemId;
use crate::moves::MoveId;
use crate::state::{
    Combatant, CombatantId, MoveSlot, Side, StatusCondition, StatusKind, TurnData, BOOST_STATS,
    MAX_MOVES,
};
use crate::tags::BattlerTags;
use crate::types::Type;

/// Default level for new configs
pub const DEFAULT_LEVEL: u8 = 50;

/// Default permanent stats [HP, Atk, Def, SpA, SpD, Spe]
pub const DEFAULT_STATS: [u16; 6] = [100; 6];

/// Default weight in kilograms
pub const DEFAULT_WEIGHT: f32 = 50.0;

/// Blueprint for creating a combatant.
#[derive(Clone, Debug, PartialEq)]
pub struct CombatantConfig {
    pub name: String,

    /// Level (1-100)
    pub level: u8,

    pub types: (Type, Option<Type>),

    /// Final stats [HP, Atk, Def, SpA, SpD, Spe]
    pub stats: [u16; 6],

    pub ability: AbilityId,

    /// Held item
    pub item: ItemId,

    /// Move set, at most four
    pub moves: Vec<MoveId>,

    /// Weight in kilograms
    pub weight: f32,

    pub tera_type: Option<Type>,

    /// Current HP (if less than max, e.g. for restoring a saved team)
    pub current_hp: Option<u16>,

    /// Status carried in from an earlier battle
    pub status: Option<StatusKind>,
}

impl Default for CombatantConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            level: DEFAULT_LEVEL,
            types: (Type::Normal, None),
            stats: DEFAULT_STATS,
            ability: AbilityId::default(),
            item: ItemId::default(),
            moves: Vec::new(),
            weight: DEFAULT_WEIGHT,
            tera_type: None,
            current_hp: None,
            status: None,
        }
    }
}

impl CombatantConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set level
    pub fn level(mut self, level: u8) -> Self {
        self.level = level.clamp(1, 100);
        self
    }

    pub fn types(mut self, primary: Type, secondary: Option<Type>) -> Self {
        // A duplicated secondary type is the same as none
        self.types = (primary, secondary.filter(|t| *t != primary));
        self
    }

    /// Set final stats
    pub fn stats(mut self, stats: [u16; 6]) -> Self {
        self.stats = stats;
        self
    }

    pub fn ability(mut self, ability: AbilityId) -> Self {
        self.ability = ability;
        self
    }

    /// Set held item
    pub fn item(mut self, item: ItemId) -> Self {
        self.item = item;
        self
    }

    pub fn moves(mut self, moves: &[MoveId]) -> Self {
        self.moves = moves.to_vec();
        self
    }

    pub fn weight(mut self, weight: f32) -> Self {
        self.weight = weight.max(0.1);
        self
    }

    pub fn tera_type(mut self, tera_type: Type) -> Self {
        self.tera_type = Some(tera_type);
        self
    }

    /// Set current HP (clamped to max HP when built)
    pub fn current_hp(mut self, hp: u16) -> Self {
        self.current_hp = Some(hp);
        self
    }

    pub fn status(mut self, status: StatusKind) -> Self {
        self.status = Some(status);
        self
    }

    // ========================================================================
    // Building
    // ========================================================================

    /// Create the runtime combatant. It starts benched.
    pub fn build(&self, id: CombatantId, side: Side) -> Result<Combatant> {
        if self.moves.is_empty() {
            return Err(ConfigError::EmptyMoveset(self.name.clone()));
        }
        if self.moves.len() > MAX_MOVES {
            return Err(ConfigError::TooManyMoves {
                name: self.name.clone(),
                count: self.moves.len(),
            });
        }

        let max_hp = self.stats[0].max(1);
        let mut stats = self.stats;
        stats[0] = max_hp;
        let hp = self.current_hp.unwrap_or(max_hp).min(max_hp);

        let moveset: SmallVec<[MoveSlot; MAX_MOVES]> =
            self.moves.iter().map(|&id| MoveSlot::new(id)).collect();

        Ok(Combatant {
            id,
            name: self.name.clone(),
            side,
            field_slot: None,
            level: self.level,
            types: self.types,
            stats,
            hp,
            weight: self.weight,
            ability: self.ability,
            item: self.item,
            moveset,
            status: self.status.filter(|_| hp > 0).map(StatusCondition::new),
            stat_stages: [0; BOOST_STATS],
            tags: BattlerTags::default(),
            move_history: SmallVec::new(),
            turn_data: TurnData::default(),
            ability_override: None,
            ability_suppressed: false,
            types_override: None,
            tera_type: self.tera_type,
            terastallized: false,
            active_turns: 0,
        })
    }
}

/// A roster line as written in scenario files, with string keys.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterEntry {
    pub name: String,
    pub level: Option<u8>,
    /// One or two type keys
    pub types: Vec<String>,
    pub stats: Option<[u16; 6]>,
    pub ability: Option<String>,
    pub item: Option<String>,
    pub moves: Vec<String>,
    pub weight: Option<f32>,
    pub tera_type: Option<String>,
    pub current_hp: Option<u16>,
    pub status: Option<StatusKind>,
}

impl RosterEntry {
    /// Resolve every key into a typed config.
    pub fn to_config(&self) -> Result<CombatantConfig> {
        let mut config = CombatantConfig::new(self.name.clone());
        if let Some(level) = self.level {
            config = config.level(level);
        }
        match self.types.as_slice() {
            [] => {}
            [primary] => config = config.types(parse_type(&self.name, primary)?, None),
            [primary, secondary] => {
                config = config.types(
                    parse_type(&self.name, primary)?,
                    Some(parse_type(&self.name, secondary)?),
                )
            }
            _ => return Err(ConfigError::InvalidTypes(self.name.clone())),
        }
        if let Some(stats) = self.stats {
            config = config.stats(stats);
        }
        if let Some(key) = &self.ability {
            let ability = AbilityId::from_str(&normalize(key))
                .ok_or_else(|| ConfigError::UnknownAbility(key.clone()))?;
            config = config.ability(ability);
        }
        if let Some(key) = &self.item {
            let item =
                ItemId::from_str(&normalize(key)).ok_or_else(|| ConfigError::UnknownItem(key.clone()))?;
            config = config.item(item);
        }
        let moves = self
            .moves
            .iter()
            .map(|key| MoveId::from_str(&normalize(key)).ok_or_else(|| ConfigError::UnknownMove(key.clone())))
            .collect::<Result<Vec<_>>>()?;
        config = config.moves(&moves);
        if let Some(weight) = self.weight {
            config = config.weight(weight);
        }
        if let Some(key) = &self.tera_type {
            config = config.tera_type(parse_type(&self.name, key)?);
        }
        if let Some(hp) = self.current_hp {
            config = config.current_hp(hp);
        }
        config.status = self.status;
        Ok(config)
    }
}

/// Catalog keys are lowercase with no separators.
fn normalize(key: &str) -> String {
    key.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn parse_type(name: &str, key: &str) -> Result<Type> {
    Type::from_str(key)
        .or_else(|| Type::from_str(&normalize(key)))
        .ok_or_else(|| ConfigError::InvalidTypes(name.to_string()))
}
