//! The battle: combatant registry, battlefield, seeded RNG and event log.
//!
//! Tag sources and attack records refer to combatants by [`CombatantId`],
//! resolved through this registry.

use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::abilities::{dispatch, AbilityId};
use crate::config::BattleConfig;
use crate::error::{ConfigError, Result};
use crate::events::BattleEvent;
use crate::roster::CombatantConfig;
use crate::rng::BattleRng;
use crate::snapshot::BattleSnapshot;
use crate::state::{
    BattleStat, Battlefield, BattlerIndex, Combatant, CombatantId, Side, StatusKind, TerrainKind, WeatherKind,
};
use crate::tags::{arena, ArenaTagKind, BattlerTagKind};
use crate::types::Type;

#[derive(Clone, Debug)]
pub struct Battle {
    pub config: BattleConfig,
    pub combatants: Vec<Combatant>,
    pub field: Battlefield,
    pub rng: BattleRng,
    pub turn: u16,
    /// Events emitted since the last `take_events`
    pub events: Vec<BattleEvent>,
}

impl Battle {
    pub fn new(config: BattleConfig) -> Self {
        let rng = BattleRng::new(config.seed);
        Self {
            config,
            combatants: Vec::new(),
            field: Battlefield::new(),
            rng,
            turn: 0,
            events: Vec::new(),
        }
    }

    /// Register a combatant on `side`. It stays benched until summoned.
    pub fn add_combatant(&mut self, config: &CombatantConfig, side: Side) -> Result<CombatantId> {
        let id = CombatantId(self.combatants.len() as u8);
        let mut combatant = config.build(id, side)?;
        combatant.level = combatant.level.min(self.config.level_cap);
        debug!(?id, name = %combatant.name, ?side, "combatant registered");
        self.combatants.push(combatant);
        Ok(id)
    }

    /// Place a combatant into a field slot of its side.
    ///
    /// Volatile state is reset, entry hazards apply, and post-summon ability
    /// hooks fire if the combatant is still standing.
    pub fn summon(&mut self, id: CombatantId, slot: u8) -> Result<()> {
        let side = self.combatant(id).side;
        let index = BattlerIndex::from_side_slot(side, slot);
        if slot >= self.config.format.slots_per_side() {
            return Err(ConfigError::SlotUnavailable(index));
        }
        if let Some(current) = self.occupant(index) {
            if current != id {
                return Err(ConfigError::SlotOccupied(index));
            }
        }
        if self.combatant(id).is_fainted() {
            return Err(ConfigError::EmptySlot(index));
        }

        let combatant = self.combatant_mut(id);
        combatant.reset_for_summon();
        combatant.field_slot = Some(slot);
        self.emit(BattleEvent::Summoned { combatant: id, slot: index }, false);

        arena::apply_entry_hazards(self, id);
        if self.check_faint(id, false) {
            return Ok(());
        }
        dispatch::apply_post_summon(self, id);
        Ok(())
    }

    /// Take a combatant off the field.
    pub fn withdraw(&mut self, id: CombatantId) {
        let combatant = self.combatant_mut(id);
        combatant.field_slot = None;
        combatant.tags.clear();
        combatant.stat_stages = Default::default();
        trace!(?id, "combatant withdrawn");
        self.emit(BattleEvent::Withdrawn { combatant: id }, false);
    }

    #[inline]
    pub fn combatant(&self, id: CombatantId) -> &Combatant {
        &self.combatants[id.0 as usize]
    }

    #[inline]
    pub fn combatant_mut(&mut self, id: CombatantId) -> &mut Combatant {
        &mut self.combatants[id.0 as usize]
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.get(id.0 as usize)
    }

    /// Active, non-fainted combatant in a field slot.
    pub fn occupant(&self, index: BattlerIndex) -> Option<CombatantId> {
        let side = index.side()?;
        let slot = index.slot()?;
        self.combatants
            .iter()
            .find(|c| c.side == side && c.field_slot == Some(slot) && !c.is_fainted())
            .map(|c| c.id)
    }

    /// Active combatants in field order.
    pub fn active_ids(&self) -> SmallVec<[CombatantId; 4]> {
        BattlerIndex::FIELD
            .iter()
            .filter_map(|&index| self.occupant(index))
            .collect()
    }

    pub fn opponents_of(&self, id: CombatantId) -> SmallVec<[CombatantId; 2]> {
        let side = self.combatant(id).side.opposite();
        self.side_ids(side)
    }

    /// Active allies, excluding `id` itself.
    pub fn allies_of(&self, id: CombatantId) -> SmallVec<[CombatantId; 2]> {
        let side = self.combatant(id).side;
        let mut allies = self.side_ids(side);
        allies.retain(|a| *a != id);
        allies
    }

    fn side_ids(&self, side: Side) -> SmallVec<[CombatantId; 2]> {
        (0..self.config.format.slots_per_side())
            .filter_map(|slot| self.occupant(BattlerIndex::from_side_slot(side, slot)))
            .collect()
    }

    /// Registered combatants of a side that can still fight.
    pub fn remaining(&self, side: Side) -> usize {
        self.combatants
            .iter()
            .filter(|c| c.side == side && !c.is_fainted())
            .count()
    }

    /// Append an event unless the run is simulated.
    pub fn emit(&mut self, event: BattleEvent, simulated: bool) {
        if simulated {
            return;
        }
        trace!(?event, "event");
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<BattleEvent> {
        std::mem::take(&mut self.events)
    }

    /// Emit a faint and vacate the slot once HP reaches zero. Returns whether it fainted.
    pub fn check_faint(&mut self, id: CombatantId, simulated: bool) -> bool {
        let combatant = self.combatant(id);
        if !combatant.is_fainted() || combatant.field_slot.is_none() {
            return combatant.is_fainted();
        }
        if !simulated {
            debug!(?id, "combatant fainted");
            let combatant = self.combatant_mut(id);
            combatant.field_slot = None;
            combatant.tags.clear();
            self.emit(BattleEvent::Fainted { target: id }, false);
        }
        true
    }

    // ------------------------------------------------------------------------
    // Battlefield queries
    // ------------------------------------------------------------------------

    /// Whether an active ability suppresses weather effects.
    pub fn weather_suppressed(&self) -> bool {
        dispatch::weather_suppressed(self)
    }

    /// Weather whose effects apply right now.
    pub fn active_weather(&self) -> Option<WeatherKind> {
        if self.weather_suppressed() {
            return None;
        }
        self.field.weather_kind()
    }

    pub fn active_terrain(&self) -> Option<TerrainKind> {
        self.field.terrain_kind()
    }

    /// Start weather. Returns false when that weather is already up.
    pub fn set_weather(&mut self, kind: WeatherKind, turns: u8, simulated: bool) -> bool {
        if self.field.weather_kind() == Some(kind) {
            return false;
        }
        if !simulated {
            self.field.set_weather(kind, turns);
            debug!(?kind, turns, "weather set");
            self.emit(BattleEvent::WeatherChanged { weather: Some(kind) }, false);
        }
        true
    }

    pub fn clear_weather(&mut self) {
        if self.field.weather.take().is_some() {
            self.emit(BattleEvent::WeatherChanged { weather: None }, false);
        }
    }

    pub fn set_terrain(&mut self, kind: TerrainKind, turns: u8, simulated: bool) -> bool {
        if self.field.terrain_kind() == Some(kind) {
            return false;
        }
        if !simulated {
            self.field.set_terrain(kind, turns);
            debug!(?kind, turns, "terrain set");
            self.emit(BattleEvent::TerrainChanged { terrain: Some(kind) }, false);
        }
        true
    }

    pub fn clear_terrain(&mut self) {
        if self.field.terrain.take().is_some() {
            self.emit(BattleEvent::TerrainChanged { terrain: None }, false);
        }
    }

    /// Grounded unless airborne by type, ability or tag; Gravity grounds everyone.
    pub fn is_grounded(&self, id: CombatantId) -> bool {
        if self.field.has_field_tag(ArenaTagKind::Gravity) {
            return true;
        }
        let combatant = self.combatant(id);
        if combatant.has_type(Type::Flying) {
            return false;
        }
        if combatant.tags.has(BattlerTagKind::MagnetRisen) {
            return false;
        }
        !combatant.has_ability(AbilityId::Levitate)
    }

    /// Speed used for turn order.
    pub fn effective_speed(&self, id: CombatantId) -> u32 {
        let combatant = self.combatant(id);
        let mut speed = u32::from(combatant.boosted_stat(BattleStat::Spd));
        if matches!(combatant.status, Some(s) if s.kind == StatusKind::Paralysis) {
            speed /= 2;
        }
        if self.field.has_arena_tag(ArenaTagKind::Tailwind, combatant.side) {
            speed *= 2;
        }
        speed
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot::capture(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::moves::MoveId;
    use crate::state::StatusCondition;
    use crate::tags::{ArenaTag, ArenaTagSide};

    fn cfg(name: &str) -> CombatantConfig {
        CombatantConfig::new(name).moves(&[MoveId::Tackle])
    }

    #[test]
    fn test_summon_rejects_bad_slots() {
        let mut battle = Battle::new(BattleConfig::single(0));
        let a = battle.add_combatant(&cfg("A"), Side::Player).unwrap();
        let b = battle.add_combatant(&cfg("B"), Side::Player).unwrap();
        assert_eq!(
            battle.summon(a, 1),
            Err(ConfigError::SlotUnavailable(BattlerIndex::Player2))
        );
        battle.summon(a, 0).unwrap();
        assert_eq!(battle.summon(b, 0), Err(ConfigError::SlotOccupied(BattlerIndex::Player)));
    }

    #[test]
    fn test_geometry_queries() {
        let mut battle = Battle::new(BattleConfig::double(0));
        let ids: Vec<_> = ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .map(|(i, n)| {
                let side = if i < 2 { Side::Player } else { Side::Enemy };
                battle.add_combatant(&cfg(n), side).unwrap()
            })
            .collect();
        battle.summon(ids[0], 0).unwrap();
        battle.summon(ids[1], 1).unwrap();
        battle.summon(ids[2], 0).unwrap();
        battle.summon(ids[3], 1).unwrap();

        assert_eq!(battle.active_ids().as_slice(), ids.as_slice());
        assert_eq!(battle.allies_of(ids[0]).as_slice(), &[ids[1]]);
        assert_eq!(battle.opponents_of(ids[0]).as_slice(), &[ids[2], ids[3]]);
        assert_eq!(battle.occupant(BattlerIndex::Enemy2), Some(ids[3]));
        assert_eq!(battle.occupant(BattlerIndex::Attacker), None);
    }

    #[test]
    fn test_faint_vacates_slot_once() {
        let mut battle = Battle::new(BattleConfig::single(0));
        let a = battle.add_combatant(&cfg("A"), Side::Player).unwrap();
        battle.summon(a, 0).unwrap();
        battle.take_events();
        battle.combatant_mut(a).hp = 0;
        assert!(battle.check_faint(a, false));
        assert!(battle.check_faint(a, false));
        assert_eq!(battle.occupant(BattlerIndex::Player), None);
        let faints = battle
            .events
            .iter()
            .filter(|e| matches!(e, BattleEvent::Fainted { .. }))
            .count();
        assert_eq!(faints, 1);
    }

    #[test]
    fn test_grounding() {
        let mut battle = Battle::new(BattleConfig::single(0));
        let bird = battle
            .add_combatant(&cfg("Bird").types(Type::Flying, None), Side::Player)
            .unwrap();
        let floater = battle
            .add_combatant(&cfg("Floater").ability(AbilityId::Levitate), Side::Enemy)
            .unwrap();
        battle.summon(bird, 0).unwrap();
        battle.summon(floater, 0).unwrap();
        assert!(!battle.is_grounded(bird));
        assert!(!battle.is_grounded(floater));

        arena::add_arena_tag(
            &mut battle,
            ArenaTag::new(ArenaTagKind::Gravity, ArenaTagSide::Both, 5),
            false,
        );
        assert!(battle.is_grounded(bird));
        assert!(battle.is_grounded(floater));
    }

    #[test]
    fn test_effective_speed_modifiers() {
        let mut battle = Battle::new(BattleConfig::single(0));
        let a = battle
            .add_combatant(&cfg("A").stats([100, 100, 100, 100, 100, 120]), Side::Player)
            .unwrap();
        battle.summon(a, 0).unwrap();
        assert_eq!(battle.effective_speed(a), 120);

        battle.combatant_mut(a).status = Some(StatusCondition::new(StatusKind::Paralysis));
        assert_eq!(battle.effective_speed(a), 60);

        arena::add_arena_tag(
            &mut battle,
            ArenaTag::new(ArenaTagKind::Tailwind, ArenaTagSide::Player, 4),
            false,
        );
        assert_eq!(battle.effective_speed(a), 120);
    }

    #[test]
    fn test_set_weather_reports_change() {
        let mut battle = Battle::new(BattleConfig::single(0));
        assert!(battle.set_weather(WeatherKind::Sun, 5, false));
        assert!(!battle.set_weather(WeatherKind::Sun, 5, false));
        assert!(battle.set_weather(WeatherKind::Rain, 5, true));
        assert_eq!(battle.field.weather_kind(), Some(WeatherKind::Sun));
    }
}
