//! Side- and field-scoped arena tags.

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::TagAddResult;
use crate::battle::Battle;
use crate::events::{BattleEvent, DamageSource};
use crate::moves::MoveId;
use crate::pipeline::effects;
use crate::state::{CombatantId, Side, StatusKind};
use crate::types::{type_effectiveness, Type};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArenaTagKind {
    Reflect,
    LightScreen,
    Tailwind,
    Spikes,
    ToxicSpikes,
    StealthRock,
    Gravity,
    MudSport,
    WaterSport,
}

impl ArenaTagKind {
    pub const ALL: [ArenaTagKind; 9] = [
        ArenaTagKind::Reflect,
        ArenaTagKind::LightScreen,
        ArenaTagKind::Tailwind,
        ArenaTagKind::Spikes,
        ArenaTagKind::ToxicSpikes,
        ArenaTagKind::StealthRock,
        ArenaTagKind::Gravity,
        ArenaTagKind::MudSport,
        ArenaTagKind::WaterSport,
    ];

    /// Turns a fresh tag lasts (0 = until removed).
    pub const fn default_turns(self) -> u8 {
        match self {
            ArenaTagKind::Reflect | ArenaTagKind::LightScreen => 5,
            ArenaTagKind::Tailwind => 4,
            ArenaTagKind::Gravity | ArenaTagKind::MudSport | ArenaTagKind::WaterSport => 5,
            ArenaTagKind::Spikes | ArenaTagKind::ToxicSpikes | ArenaTagKind::StealthRock => 0,
        }
    }

    pub const fn is_stackable(self) -> bool {
        matches!(self, ArenaTagKind::Spikes | ArenaTagKind::ToxicSpikes)
    }

    pub const fn max_layers(self) -> u8 {
        match self {
            ArenaTagKind::Spikes => 3,
            ArenaTagKind::ToxicSpikes => 2,
            _ => 0,
        }
    }

    /// Power multiplier a weakening tag applies to moves of `ty`.
    pub fn weakens(self, ty: Type) -> Option<f64> {
        match (self, ty) {
            (ArenaTagKind::MudSport, Type::Electric) | (ArenaTagKind::WaterSport, Type::Fire) => {
                Some(1.0 / 3.0)
            }
            _ => None,
        }
    }
}

/// Which side an arena tag is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArenaTagSide {
    Both,
    Player,
    Enemy,
}

impl ArenaTagSide {
    pub const fn of(side: Side) -> Self {
        match side {
            Side::Player => ArenaTagSide::Player,
            Side::Enemy => ArenaTagSide::Enemy,
        }
    }

    pub const fn covers(self, side: Side) -> bool {
        match self {
            ArenaTagSide::Both => true,
            ArenaTagSide::Player => matches!(side, Side::Player),
            ArenaTagSide::Enemy => matches!(side, Side::Enemy),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArenaTag {
    pub kind: ArenaTagKind,
    pub side: ArenaTagSide,
    /// 0 = until removed
    pub turns_left: u8,
    pub layers: u8,
    pub source: Option<CombatantId>,
    pub source_move: Option<MoveId>,
}

impl ArenaTag {
    pub fn new(kind: ArenaTagKind, side: ArenaTagSide, turns: u8) -> Self {
        Self {
            kind,
            side,
            turns_left: turns,
            layers: 1,
            source: None,
            source_move: None,
        }
    }

    pub fn with_source(mut self, source: CombatantId, source_move: Option<MoveId>) -> Self {
        self.source = Some(source);
        self.source_move = source_move;
        self
    }
}

// ============================================================================
// Lifecycle
// ============================================================================

pub fn add_arena_tag(battle: &mut Battle, tag: ArenaTag, simulated: bool) -> TagAddResult {
    let (kind, side) = (tag.kind, tag.side);
    if let Some(existing) = battle.field.arena_tag_on(kind, side) {
        let layers = existing.layers;
        if kind.is_stackable() && layers < kind.max_layers() {
            if !simulated {
                if let Some(t) = battle.field.arena_tag_on_mut(kind, side) {
                    t.layers += 1;
                }
                battle.emit(
                    BattleEvent::ArenaTagAdded { side, tag: kind, layers: layers + 1 },
                    false,
                );
            }
            return TagAddResult::Stacked(layers + 1);
        }
        battle.emit(BattleEvent::ArenaTagRefused { side, tag: kind }, simulated);
        return TagAddResult::Refused;
    }
    if simulated {
        return TagAddResult::Added;
    }
    trace!(?kind, ?side, "arena tag added");
    battle.field.arena_tags.push(tag);
    battle.emit(BattleEvent::ArenaTagAdded { side, tag: kind, layers: 1 }, false);
    TagAddResult::Added
}

pub fn remove_arena_tag(
    battle: &mut Battle,
    kind: ArenaTagKind,
    side: ArenaTagSide,
    simulated: bool,
) -> bool {
    if simulated {
        return battle.field.arena_tag_on(kind, side).is_some();
    }
    match battle.field.take_arena_tag(kind, side) {
        Some(_) => {
            trace!(?kind, ?side, "arena tag removed");
            battle.emit(BattleEvent::ArenaTagRemoved { side, tag: kind }, false);
            true
        }
        None => false,
    }
}

/// Turn-end lapse of every arena tag.
pub fn lapse_arena_tags(battle: &mut Battle) {
    let mut expired = Vec::new();
    for tag in battle.field.arena_tags.iter_mut() {
        if tag.turns_left == 0 {
            continue;
        }
        tag.turns_left -= 1;
        if tag.turns_left == 0 {
            expired.push((tag.kind, tag.side));
        }
    }
    for (kind, side) in expired {
        remove_arena_tag(battle, kind, side, false);
    }
}

/// Entry hazards applied to a combatant as it is summoned.
pub fn apply_entry_hazards(battle: &mut Battle, id: CombatantId) {
    let side = ArenaTagSide::of(battle.combatant(id).side);
    let grounded = battle.is_grounded(id);

    if grounded {
        if let Some(layers) = battle.field.arena_tag_on(ArenaTagKind::Spikes, side).map(|t| t.layers) {
            let max_hp = u32::from(battle.combatant(id).max_hp());
            let divisor = match layers {
                1 => 8,
                2 => 6,
                _ => 4,
            };
            hazard_damage(battle, id, (max_hp / divisor).max(1));
        }
    }

    if battle.field.arena_tag_on(ArenaTagKind::StealthRock, side).is_some() {
        let combatant = battle.combatant(id);
        let (t1, t2) = combatant.current_types();
        let eff = u32::from(type_effectiveness(Type::Rock, t1, t2));
        let damage = u32::from(combatant.max_hp()) * eff / 32;
        if damage > 0 {
            hazard_damage(battle, id, damage);
        }
    }

    if grounded && !battle.combatant(id).is_fainted() {
        if let Some(layers) =
            battle.field.arena_tag_on(ArenaTagKind::ToxicSpikes, side).map(|t| t.layers)
        {
            if battle.combatant(id).has_type(Type::Poison) {
                remove_arena_tag(battle, ArenaTagKind::ToxicSpikes, side, false);
            } else {
                let status = if layers >= 2 { StatusKind::Toxic } else { StatusKind::Poison };
                effects::try_inflict_status(battle, id, status, None, false);
            }
        }
    }
}

fn hazard_damage(battle: &mut Battle, id: CombatantId, amount: u32) {
    let target = battle.combatant_mut(id);
    let dealt = target.take_damage(amount);
    let hp_left = target.hp;
    battle.emit(
        BattleEvent::Damage { target: id, amount: dealt, hp_left, source: DamageSource::Hazard },
        false,
    );
    battle.check_faint(id, false);
}
