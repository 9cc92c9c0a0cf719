//! Turn commands, action ordering and end-of-turn upkeep.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::abilities::dispatch;
use crate::battle::Battle;
use crate::error::{ConfigError, Result};
use crate::events::{BattleEvent, DamageSource};
use crate::items;
use crate::pipeline::effects;
use crate::queue::{TurnQueue, TurnReport};
use crate::state::{BattlerIndex, CombatantId, StatusKind, TurnData, WeatherKind};
use crate::tags::{arena, battler, LapseTiming};
use crate::types::Type;

/// Switches resolve before any move.
pub const SWITCH_PRIORITY: i8 = 7;

/// What one combatant does this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TurnCommand {
    UseMove {
        user: CombatantId,
        move_index: usize,
        #[serde(default)]
        target: Option<BattlerIndex>,
    },
    Switch {
        out: CombatantId,
        incoming: CombatantId,
    },
    Pass {
        user: CombatantId,
    },
}

impl TurnCommand {
    pub fn actor(&self) -> CombatantId {
        match *self {
            TurnCommand::UseMove { user, .. } | TurnCommand::Pass { user } => user,
            TurnCommand::Switch { out, .. } => out,
        }
    }

    /// Bracket this command belongs to.
    pub fn priority(&self, battle: &Battle) -> i8 {
        match *self {
            TurnCommand::UseMove { user, move_index, .. } => battle
                .combatant(user)
                .moveset
                .get(move_index)
                .map_or(0, |slot| dispatch::modified_priority(battle, user, slot.id.get())),
            TurnCommand::Switch { .. } => SWITCH_PRIORITY,
            TurnCommand::Pass { .. } => 0,
        }
    }

    /// Reject commands that reference missing combatants or move slots.
    pub fn validate(&self, battle: &Battle) -> Result<()> {
        let actor_id = self.actor();
        let actor = battle.get(actor_id).ok_or(ConfigError::UnknownCombatant(actor_id))?;
        match *self {
            TurnCommand::UseMove { move_index, .. } if move_index >= actor.moveset.len() => {
                Err(ConfigError::MoveIndexOutOfRange { name: actor.name.clone(), index: move_index })
            }
            TurnCommand::Switch { incoming, .. } => {
                let next = battle.get(incoming).ok_or(ConfigError::UnknownCombatant(incoming))?;
                let reason = if next.side != actor.side {
                    Some("wrong side")
                } else if next.is_fainted() {
                    Some("fainted")
                } else if next.field_slot.is_some() {
                    Some("already active")
                } else {
                    None
                };
                match reason {
                    Some(reason) => Err(ConfigError::InvalidSwitch { name: next.name.clone(), reason }),
                    None => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }
}

/// Order one priority bracket.
///
/// Each actor's "moves first" roll (Quick Draw, Quick Claw) is drawn once
/// here. Then bypassers lead, act-last abilities trail, and the rest go by
/// effective speed with seeded tie-breaking.
pub fn order_bracket(battle: &mut Battle, commands: &[TurnCommand]) -> Vec<TurnCommand> {
    let mut keyed: SmallVec<[(TurnCommand, bool, bool, u32); 4]> = SmallVec::new();
    for &command in commands {
        let actor = command.actor();
        let bypass = match command {
            TurnCommand::UseMove { .. } => dispatch::bypass_speed_chance(battle, actor)
                .or_else(|| items::bypass_speed_chance(battle, actor))
                .map_or(false, |chance| battle.rng.random_int(100) < u32::from(chance)),
            _ => false,
        };
        let last = dispatch::acts_last(battle, actor);
        let speed = battle.effective_speed(actor);
        keyed.push((command, bypass, last, speed));
    }

    // Shuffle first so the stable sort leaves speed ties in seeded order
    battle.rng.shuffle(&mut keyed);
    keyed.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then(a.2.cmp(&b.2))
            .then(b.3.cmp(&a.3))
    });
    trace!(order = ?keyed.iter().map(|k| k.0.actor()).collect::<Vec<_>>(), "bracket ordered");
    keyed.into_iter().map(|k| k.0).collect()
}

/// Withdraw `out` and send `incoming` into the same slot.
pub fn switch_in(battle: &mut Battle, out: CombatantId, incoming: CombatantId) -> Result<()> {
    if let Some(slot) = battle.combatant(out).field_slot {
        battle.withdraw(out);
        return battle.summon(incoming, slot);
    }
    // Outgoing combatant already fainted: fill the first empty slot
    let side = battle.combatant(incoming).side;
    let slot = (0..battle.config.format.slots_per_side())
        .find(|&slot| battle.occupant(BattlerIndex::from_side_slot(side, slot)).is_none())
        .ok_or(ConfigError::SlotOccupied(BattlerIndex::from_side_slot(side, 0)))?;
    battle.summon(incoming, slot)
}

// ============================================================================
// Turn end
// ============================================================================

/// End-of-turn upkeep, in order: battler tag lapses, status damage, weather
/// chip, field timers, held items. Then per-turn scratch data resets.
pub fn end_turn(battle: &mut Battle) {
    let active = battle.active_ids();

    for &id in &active {
        if battle.combatant(id).is_active() {
            battler::lapse_tags(battle, id, LapseTiming::TurnEnd);
        }
    }
    for &id in &active {
        apply_status_damage(battle, id);
    }
    apply_weather_damage(battle, &active);

    lapse_weather(battle);
    lapse_terrain(battle);
    arena::lapse_arena_tags(battle);

    for &id in &active {
        if battle.combatant(id).is_active() {
            items::apply_turn_end(battle, id);
        }
    }

    for id in battle.active_ids() {
        let combatant = battle.combatant_mut(id);
        combatant.active_turns = combatant.active_turns.saturating_add(1);
    }
    for combatant in battle.combatants.iter_mut() {
        combatant.turn_data = TurnData::default();
    }

    battle.emit(BattleEvent::TurnEnded { turn: battle.turn }, false);
    debug!(turn = battle.turn, "turn ended");
}

fn apply_status_damage(battle: &mut Battle, id: CombatantId) {
    let combatant = battle.combatant(id);
    if !combatant.is_active() {
        return;
    }
    let max_hp = u32::from(combatant.max_hp());
    let amount = match combatant.status {
        Some(status) => match status.kind {
            StatusKind::Burn => max_hp / 16,
            StatusKind::Poison => max_hp / 8,
            StatusKind::Toxic => {
                let counter = status.turns.saturating_add(1).min(15);
                if let Some(s) = battle.combatant_mut(id).status.as_mut() {
                    s.turns = counter;
                }
                max_hp * u32::from(counter) / 16
            }
            _ => return,
        },
        None => return,
    };
    effects::indirect_damage(battle, id, amount.max(1), DamageSource::Status);
}

fn apply_weather_damage(battle: &mut Battle, active: &[CombatantId]) {
    let Some(weather) = battle.active_weather().filter(|w| w.is_damaging()) else {
        return;
    };
    let immune: &[Type] = match weather {
        WeatherKind::Sandstorm => &[Type::Rock, Type::Ground, Type::Steel],
        _ => &[Type::Ice],
    };
    for &id in active {
        let combatant = battle.combatant(id);
        if !combatant.is_active() || immune.iter().any(|&ty| combatant.has_type(ty)) {
            continue;
        }
        let amount = (u32::from(combatant.max_hp()) / 16).max(1);
        effects::indirect_damage(battle, id, amount, DamageSource::Weather);
    }
}

fn lapse_weather(battle: &mut Battle) {
    let expired = match battle.field.weather.as_mut() {
        Some(weather) if weather.turns_left > 0 => {
            weather.turns_left -= 1;
            weather.turns_left == 0
        }
        _ => false,
    };
    if expired {
        battle.clear_weather();
    }
}

fn lapse_terrain(battle: &mut Battle) {
    let expired = match battle.field.terrain.as_mut() {
        Some(terrain) if terrain.turns_left > 0 => {
            terrain.turns_left -= 1;
            terrain.turns_left == 0
        }
        _ => false,
    };
    if expired {
        battle.clear_terrain();
    }
}

/// Queue and run a full turn.
pub fn run_turn(battle: &mut Battle, commands: &[TurnCommand]) -> Result<TurnReport> {
    let queue = TurnQueue::new(battle, commands)?;
    Ok(queue.run(battle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::AbilityId;
    use crate::config::BattleConfig;
    use crate::items::ItemId;
    use crate::moves::MoveId;
    use crate::roster::CombatantConfig;
    use crate::state::{Side, StatusCondition};
    use crate::tags::{ArenaTag, ArenaTagKind, ArenaTagSide};

    fn mon(name: &str, speed: u16) -> CombatantConfig {
        CombatantConfig::new(name)
            .stats([200, 100, 100, 100, 100, speed])
            .moves(&[MoveId::Tackle, MoveId::Quickattack, MoveId::Growl])
    }

    fn duel(a: CombatantConfig, b: CombatantConfig) -> (Battle, CombatantId, CombatantId) {
        let mut battle = Battle::new(BattleConfig::single(21));
        let a = battle.add_combatant(&a, Side::Player).unwrap();
        let b = battle.add_combatant(&b, Side::Enemy).unwrap();
        battle.summon(a, 0).unwrap();
        battle.summon(b, 0).unwrap();
        (battle, a, b)
    }

    fn attack(user: CombatantId, move_index: usize) -> TurnCommand {
        TurnCommand::UseMove { user, move_index, target: None }
    }

    #[test]
    fn test_faster_acts_first() {
        let (mut battle, a, b) = duel(mon("Slow", 50), mon("Fast", 120));
        let order = order_bracket(&mut battle, &[attack(a, 0), attack(b, 0)]);
        assert_eq!(order[0].actor(), b);
    }

    #[test]
    fn test_paralysis_and_tailwind_change_speed() {
        let (mut battle, a, b) = duel(mon("A", 100), mon("B", 80));
        battle.combatant_mut(a).status = Some(StatusCondition::new(StatusKind::Paralysis));
        let order = order_bracket(&mut battle, &[attack(a, 0), attack(b, 0)]);
        assert_eq!(order[0].actor(), b);

        arena::add_arena_tag(
            &mut battle,
            ArenaTag::new(ArenaTagKind::Tailwind, ArenaTagSide::Player, 4),
            false,
        );
        let order = order_bracket(&mut battle, &[attack(a, 0), attack(b, 0)]);
        assert_eq!(order[0].actor(), a);
    }

    #[test]
    fn test_stall_moves_last() {
        let (mut battle, a, b) = duel(mon("A", 200).ability(AbilityId::Stall), mon("B", 10));
        let order = order_bracket(&mut battle, &[attack(a, 0), attack(b, 0)]);
        assert_eq!(order[1].actor(), a);
    }

    #[test]
    fn test_speed_ties_are_seeded() {
        let first = {
            let (mut battle, a, b) = duel(mon("A", 100), mon("B", 100));
            order_bracket(&mut battle, &[attack(a, 0), attack(b, 0)])
        };
        let second = {
            let (mut battle, a, b) = duel(mon("A", 100), mon("B", 100));
            order_bracket(&mut battle, &[attack(a, 0), attack(b, 0)])
        };
        assert_eq!(first, second);
    }

    #[test]
    fn test_priority_brackets() {
        let (battle, a, b) = duel(mon("A", 10), mon("B", 100).ability(AbilityId::Prankster));
        assert_eq!(attack(a, 1).priority(&battle), 1);
        assert_eq!(attack(b, 2).priority(&battle), 1);
        assert_eq!(attack(b, 0).priority(&battle), 0);
        assert_eq!(TurnCommand::Pass { user: a }.priority(&battle), 0);
    }

    #[test]
    fn test_validate_rejects_bad_slot() {
        let (battle, a, _) = duel(mon("A", 10), mon("B", 10));
        assert!(matches!(
            attack(a, 9).validate(&battle),
            Err(ConfigError::MoveIndexOutOfRange { index: 9, .. })
        ));
    }

    #[test]
    fn test_status_damage_at_turn_end() {
        let (mut battle, a, b) = duel(mon("A", 10), mon("B", 10));
        battle.combatant_mut(a).status = Some(StatusCondition::new(StatusKind::Burn));
        battle.combatant_mut(b).status = Some(StatusCondition::new(StatusKind::Toxic));
        end_turn(&mut battle);
        assert_eq!(battle.combatant(a).hp, 200 - 12);
        assert_eq!(battle.combatant(b).hp, 200 - 12);
        end_turn(&mut battle);
        assert_eq!(battle.combatant(b).hp, 200 - 12 - 25);
    }

    #[test]
    fn test_sandstorm_spares_rock_types() {
        let (mut battle, a, b) = duel(mon("A", 10).types(Type::Rock, None), mon("B", 10));
        battle.set_weather(WeatherKind::Sandstorm, 5, false);
        end_turn(&mut battle);
        assert_eq!(battle.combatant(a).hp, 200);
        assert_eq!(battle.combatant(b).hp, 188);
    }

    #[test]
    fn test_field_timers_expire() {
        let (mut battle, _, _) = duel(mon("A", 10), mon("B", 10));
        battle.set_weather(WeatherKind::Rain, 2, false);
        arena::add_arena_tag(
            &mut battle,
            ArenaTag::new(ArenaTagKind::Reflect, ArenaTagSide::Enemy, 1),
            false,
        );
        end_turn(&mut battle);
        assert_eq!(battle.active_weather(), Some(WeatherKind::Rain));
        assert!(!battle.field.has_field_tag(ArenaTagKind::Reflect));
        end_turn(&mut battle);
        assert_eq!(battle.active_weather(), None);
    }

    #[test]
    fn test_turn_end_resets_scratch_and_counts_turns() {
        let (mut battle, a, _) = duel(mon("A", 10).item(ItemId::Leftovers), mon("B", 10));
        battle.combatant_mut(a).hp = 100;
        battle.combatant_mut(a).turn_data.acted = true;
        end_turn(&mut battle);
        let combatant = battle.combatant(a);
        assert_eq!(combatant.hp, 112);
        assert!(!combatant.turn_data.acted);
        assert_eq!(combatant.active_turns, 1);
    }

    #[test]
    fn test_switch_keeps_slot() {
        let mut battle = Battle::new(BattleConfig::single(2));
        let a = battle.add_combatant(&mon("A", 10), Side::Player).unwrap();
        let c = battle.add_combatant(&mon("C", 10), Side::Player).unwrap();
        battle.summon(a, 0).unwrap();
        let command = TurnCommand::Switch { out: a, incoming: c };
        command.validate(&battle).unwrap();
        switch_in(&mut battle, a, c).unwrap();
        assert_eq!(battle.occupant(BattlerIndex::Player), Some(c));
        assert_eq!(battle.combatant(a).field_slot, None);
    }
}
