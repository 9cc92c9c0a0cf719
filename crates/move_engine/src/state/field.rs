//! Battlefield state: weather, terrain and arena tags.
//!
//! One [`Battlefield`] is owned by each `Battle`. Arena tag lifecycles (add,
//! overlap, lapse, remove) live in [`crate::tags::arena`]; this type only
//! stores and queries them.

use serde::{Deserialize, Serialize};

use super::Side;
use crate::tags::{ArenaTag, ArenaTagKind, ArenaTagSide};
use crate::types::Type;

/// Default duration of weather and terrain set by a move or ability
pub const DEFAULT_FIELD_TURNS: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherKind {
    Sun,
    Rain,
    Sandstorm,
    Hail,
    Fog,
}

impl WeatherKind {
    /// Damage multiplier applied to moves of `ty` under this weather.
    pub fn type_multiplier(self, ty: Type) -> f64 {
        match (self, ty) {
            (WeatherKind::Sun, Type::Fire) | (WeatherKind::Rain, Type::Water) => 1.5,
            (WeatherKind::Sun, Type::Water) | (WeatherKind::Rain, Type::Fire) => 0.5,
            _ => 1.0,
        }
    }

    /// Whether this weather deals chip damage at turn end.
    pub const fn is_damaging(self) -> bool {
        matches!(self, WeatherKind::Sandstorm | WeatherKind::Hail)
    }
}

/// Active weather. `turns_left == 0` lasts until replaced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    pub kind: WeatherKind,
    pub turns_left: u8,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerrainKind {
    Electric,
    Psychic,
    Grassy,
    Misty,
}

impl TerrainKind {
    /// Type boosted for grounded users.
    pub const fn boosted_type(self) -> Option<Type> {
        match self {
            TerrainKind::Electric => Some(Type::Electric),
            TerrainKind::Psychic => Some(Type::Psychic),
            TerrainKind::Grassy => Some(Type::Grass),
            TerrainKind::Misty => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Terrain {
    pub kind: TerrainKind,
    pub turns_left: u8,
}

/// Field-wide state shared by every combatant.
#[derive(Clone, Debug, Default)]
pub struct Battlefield {
    pub weather: Option<Weather>,
    pub terrain: Option<Terrain>,
    pub arena_tags: Vec<ArenaTag>,
}

impl Battlefield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw weather, ignoring suppression.
    pub fn weather_kind(&self) -> Option<WeatherKind> {
        self.weather.map(|w| w.kind)
    }

    pub fn terrain_kind(&self) -> Option<TerrainKind> {
        self.terrain.map(|t| t.kind)
    }

    /// Set weather. Returns `false` when the same weather is already up.
    pub fn set_weather(&mut self, kind: WeatherKind, turns: u8) -> bool {
        if self.weather_kind() == Some(kind) {
            return false;
        }
        self.weather = Some(Weather { kind, turns_left: turns });
        true
    }

    /// Set terrain. Returns `false` when the same terrain is already up.
    pub fn set_terrain(&mut self, kind: TerrainKind, turns: u8) -> bool {
        if self.terrain_kind() == Some(kind) {
            return false;
        }
        self.terrain = Some(Terrain { kind, turns_left: turns });
        true
    }

    /// Tag of `kind` affecting `side`. Field-wide tags match every side.
    pub fn arena_tag(&self, kind: ArenaTagKind, side: Side) -> Option<&ArenaTag> {
        self.arena_tags
            .iter()
            .find(|t| t.kind == kind && t.side.covers(side))
    }

    /// Tag of `kind` registered on exactly `side`.
    pub fn arena_tag_on(&self, kind: ArenaTagKind, side: ArenaTagSide) -> Option<&ArenaTag> {
        self.arena_tags.iter().find(|t| t.kind == kind && t.side == side)
    }

    pub fn arena_tag_on_mut(
        &mut self,
        kind: ArenaTagKind,
        side: ArenaTagSide,
    ) -> Option<&mut ArenaTag> {
        self.arena_tags
            .iter_mut()
            .find(|t| t.kind == kind && t.side == side)
    }

    pub fn has_arena_tag(&self, kind: ArenaTagKind, side: Side) -> bool {
        self.arena_tag(kind, side).is_some()
    }

    /// Field-scoped tag check (any side).
    pub fn has_field_tag(&self, kind: ArenaTagKind) -> bool {
        self.arena_tags.iter().any(|t| t.kind == kind)
    }

    /// Remove a tag without firing lifecycle callbacks.
    pub fn take_arena_tag(&mut self, kind: ArenaTagKind, side: ArenaTagSide) -> Option<ArenaTag> {
        let pos = self
            .arena_tags
            .iter()
            .position(|t| t.kind == kind && t.side == side)?;
        Some(self.arena_tags.remove(pos))
    }
}
