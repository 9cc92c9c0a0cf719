//! Scripted battles loaded from JSON.
//!
//! ```json
//! {
//!   "config": { "seed": 7, "format": "single" },
//!   "player": [{ "name": "Zap", "types": ["electric"], "moves": ["thunderbolt"] }],
//!   "enemy": [{ "name": "Tide", "types": ["water"], "moves": ["surf"] }],
//!   "field": { "weather": "rain" },
//!   "turns": [
//!     [{ "action": "move", "actor": "Zap", "move": "thunderbolt" },
//!      { "action": "auto", "actor": "Tide" }]
//!   ]
//! }
//! ```
//!
//! Combatants are named in turns by roster name. The first roster entries
//! of each side start on the field; a fainted combatant is replaced by the
//! next healthy bench entry after the turn.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::ai;
use crate::battle::Battle;
use crate::config::BattleConfig;
use crate::error::ScenarioError;
use crate::events::BattleEvent;
use crate::moves::MoveId;
use crate::queue::TurnReport;
use crate::roster::RosterEntry;
use crate::snapshot::BattleSnapshot;
use crate::state::{BattlerIndex, CombatantId, Side, TerrainKind, WeatherKind};
use crate::turn::{run_turn, TurnCommand};

/// Field state before turn one. Set conditions last until replaced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSetup {
    pub weather: Option<WeatherKind>,
    pub terrain: Option<TerrainKind>,
}

/// One scripted action, addressed by roster name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptedAction {
    Move {
        actor: String,
        #[serde(rename = "move")]
        move_key: String,
        #[serde(default)]
        target: Option<BattlerIndex>,
    },
    Switch {
        actor: String,
        to: String,
    },
    Pass {
        actor: String,
    },
    /// Let the move scorer pick
    Auto {
        actor: String,
    },
}

impl ScriptedAction {
    pub fn actor(&self) -> &str {
        match self {
            ScriptedAction::Move { actor, .. }
            | ScriptedAction::Switch { actor, .. }
            | ScriptedAction::Pass { actor }
            | ScriptedAction::Auto { actor } => actor,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scenario {
    pub config: BattleConfig,
    pub player: Vec<RosterEntry>,
    pub enemy: Vec<RosterEntry>,
    pub field: FieldSetup,
    pub turns: Vec<Vec<ScriptedAction>>,
}

/// Everything a finished scenario produced.
#[derive(Debug)]
pub struct ScenarioResult {
    pub battle: Battle,
    pub reports: Vec<TurnReport>,
    pub events: Vec<BattleEvent>,
}

impl ScenarioResult {
    pub fn snapshot(&self) -> BattleSnapshot {
        self.battle.snapshot()
    }

    /// Combatant id for a roster name.
    pub fn id_of(&self, name: &str) -> Option<CombatantId> {
        self.battle.combatants.iter().find(|c| c.name == name).map(|c| c.id)
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ScenarioError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ScenarioError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Build the battle with both rosters registered and leads summoned.
    pub fn setup(&self, seed: Option<u64>) -> Result<Battle, ScenarioError> {
        let mut config = self.config.clone();
        if let Some(seed) = seed {
            config.seed = seed;
        }
        let slots = config.format.slots_per_side();
        let mut battle = Battle::new(config);

        for (side, roster) in [(Side::Player, &self.player), (Side::Enemy, &self.enemy)] {
            if roster.is_empty() {
                return Err(crate::error::ConfigError::EmptySide(side).into());
            }
            let mut ids = Vec::with_capacity(roster.len());
            for entry in roster {
                ids.push(battle.add_combatant(&entry.to_config()?, side)?);
            }
            for (slot, &id) in ids.iter().take(usize::from(slots)).enumerate() {
                battle.summon(id, slot as u8)?;
            }
        }

        if let Some(weather) = self.field.weather {
            battle.set_weather(weather, 0, false);
        }
        if let Some(terrain) = self.field.terrain {
            battle.set_terrain(terrain, 0, false);
        }
        Ok(battle)
    }

    /// Run every scripted turn, stopping early once a side is out.
    pub fn run(&self, seed: Option<u64>) -> Result<ScenarioResult, ScenarioError> {
        let mut battle = self.setup(seed)?;
        let mut events = battle.take_events();
        let mut reports = Vec::with_capacity(self.turns.len());
        let max_turns = match battle.config.max_turns {
            0 => usize::MAX,
            n => usize::from(n),
        };

        for (turn, actions) in self.turns.iter().enumerate().take(max_turns) {
            if battle.remaining(Side::Player) == 0 || battle.remaining(Side::Enemy) == 0 {
                debug!(turn, "side defeated; remaining turns skipped");
                break;
            }
            let commands = self.commands_for(&mut battle, turn + 1, actions)?;
            reports.push(run_turn(&mut battle, &commands)?);
            replace_fainted(&mut battle)?;
            events.extend(battle.take_events());
        }

        info!(turns = reports.len(), events = events.len(), "scenario finished");
        Ok(ScenarioResult { battle, reports, events })
    }

    fn commands_for(
        &self,
        battle: &mut Battle,
        turn: usize,
        actions: &[ScriptedAction],
    ) -> Result<Vec<TurnCommand>, ScenarioError> {
        let names: HashMap<String, CombatantId> =
            battle.combatants.iter().map(|c| (c.name.clone(), c.id)).collect();
        let lookup = |name: &str| {
            names.get(name).copied().ok_or_else(|| ScenarioError::UnknownActor {
                turn,
                name: name.to_string(),
            })
        };

        let mut commands = Vec::with_capacity(actions.len());
        for action in actions {
            let actor = lookup(action.actor())?;
            if !battle.combatant(actor).is_active() {
                continue;
            }
            let command = match action {
                ScriptedAction::Move { move_key, target, .. } => {
                    let move_index = MoveId::from_str(move_key).and_then(|id| {
                        battle.combatant(actor).moveset.iter().position(|slot| slot.id == id)
                    });
                    let Some(move_index) = move_index else {
                        return Err(ScenarioError::MoveNotKnown {
                            turn,
                            actor: action.actor().to_string(),
                            key: move_key.clone(),
                        });
                    };
                    TurnCommand::UseMove { user: actor, move_index, target: *target }
                }
                ScriptedAction::Switch { to, .. } => TurnCommand::Switch { out: actor, incoming: lookup(to)? },
                ScriptedAction::Pass { .. } => TurnCommand::Pass { user: actor },
                ScriptedAction::Auto { .. } => ai::choose_command(battle, actor),
            };
            commands.push(command);
        }
        Ok(commands)
    }
}

/// Fill slots left empty by fainting with the next healthy bench entry.
fn replace_fainted(battle: &mut Battle) -> Result<(), ScenarioError> {
    for side in [Side::Player, Side::Enemy] {
        for slot in 0..battle.config.format.slots_per_side() {
            if battle.occupant(BattlerIndex::from_side_slot(side, slot)).is_some() {
                continue;
            }
            let next = battle
                .combatants
                .iter()
                .find(|c| c.side == side && c.field_slot.is_none() && !c.is_fainted())
                .map(|c| c.id);
            if let Some(id) = next {
                battle.summon(id, slot)?;
            }
        }
    }
    Ok(())
}
