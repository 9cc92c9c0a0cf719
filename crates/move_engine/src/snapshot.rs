//! Serializable battle snapshots for persistence and fixture comparison.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::abilities::AbilityId;
use crate::battle::Battle;
use crate::items::ItemId;
use crate::moves::MoveId;
use crate::rng::RngState;
use crate::state::{BattleStat, BattlerIndex, CombatantId, Side, StatusCondition, Terrain, Weather};
use crate::tags::{ArenaTag, BattlerTag};

/// Point-in-time view of a battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleSnapshot {
    pub turn: u16,
    pub rng: RngState,
    pub combatants: Vec<CombatantSnapshot>,
    pub field: FieldSnapshot,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub name: String,
    pub side: Side,
    /// `None` while benched
    pub slot: Option<BattlerIndex>,
    pub hp: u16,
    pub max_hp: u16,
    pub status: Option<StatusCondition>,
    pub ability: AbilityId,
    pub item: ItemId,
    /// Non-zero stages only
    pub stages: BTreeMap<BattleStat, i8>,
    pub tags: Vec<BattlerTag>,
    pub pp: Vec<(MoveId, u8)>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSnapshot {
    pub weather: Option<Weather>,
    pub terrain: Option<Terrain>,
    pub tags: Vec<ArenaTag>,
}

impl BattleSnapshot {
    pub fn capture(battle: &Battle) -> Self {
        let combatants = battle
            .combatants
            .iter()
            .map(|c| CombatantSnapshot {
                id: c.id,
                name: c.name.clone(),
                side: c.side,
                slot: c.battler_index(),
                hp: c.hp,
                max_hp: c.max_hp(),
                status: c.status,
                ability: c.effective_ability(),
                item: c.item,
                stages: BattleStat::ALL
                    .iter()
                    .filter(|&&stat| c.stage(stat) != 0)
                    .map(|&stat| (stat, c.stage(stat)))
                    .collect(),
                tags: c.tags.iter().cloned().collect(),
                pp: c.moveset.iter().map(|slot| (slot.id, slot.pp)).collect(),
            })
            .collect();

        Self {
            turn: battle.turn,
            rng: battle.rng.state(),
            combatants,
            field: FieldSnapshot {
                weather: battle.field.weather,
                terrain: battle.field.terrain,
                tags: battle.field.arena_tags.clone(),
            },
        }
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&CombatantSnapshot> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BattleConfig;
    use crate::roster::CombatantConfig;
    use crate::state::{StatusKind, WeatherKind};
    use crate::tags::{battler, BattlerTagKind};

    #[test]
    fn test_snapshot_captures_state() {
        let mut battle = Battle::new(BattleConfig::single(5));
        let a = battle
            .add_combatant(&CombatantConfig::new("A").moves(&[MoveId::Tackle]), Side::Player)
            .unwrap();
        let b = battle
            .add_combatant(&CombatantConfig::new("B").moves(&[MoveId::Tackle]), Side::Player)
            .unwrap();
        battle.summon(a, 0).unwrap();
        battle.combatant_mut(a).change_stage(BattleStat::Atk, 2);
        battle.combatant_mut(a).status = Some(StatusCondition::new(StatusKind::Burn));
        battler::add_tag(&mut battle, a, BattlerTag::new(BattlerTagKind::FocusEnergy), false);
        battle.set_weather(WeatherKind::Rain, 5, false);

        let snapshot = battle.snapshot();
        let first = snapshot.combatant(a).unwrap();
        assert_eq!(first.slot, Some(BattlerIndex::Player));
        assert_eq!(first.stages.get(&BattleStat::Atk), Some(&2));
        assert_eq!(first.stages.len(), 1);
        assert_eq!(first.tags.len(), 1);
        assert_eq!(first.status.map(|s| s.kind), Some(StatusKind::Burn));
        assert_eq!(snapshot.combatant(b).unwrap().slot, None);
        assert_eq!(snapshot.field.weather.map(|w| w.kind), Some(WeatherKind::Rain));
    }

    #[test]
    fn test_snapshot_json_round_trip() {
        let mut battle = Battle::new(BattleConfig::single(5));
        let a = battle
            .add_combatant(&CombatantConfig::new("A").moves(&[MoveId::Tackle]), Side::Enemy)
            .unwrap();
        battle.summon(a, 0).unwrap();
        let snapshot = battle.snapshot();
        let json = snapshot.to_json().unwrap();
        let back: BattleSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
