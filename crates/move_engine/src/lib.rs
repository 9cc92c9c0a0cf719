//! move_engine - move and ability effect resolution for a turn-based creature battler
//!
//! Moves and abilities are declarative catalog entries composed of ordered
//! attributes. A move use runs through a stepped pipeline (conditions,
//! targeting, accuracy, power, damage, effects) whose stages fold values over
//! reference cells. All randomness comes from one seeded generator per
//! battle, so a seed reproduces a battle exactly.

/// Type definitions and type chart
pub mod types {
    include!(concat!(env!("OUT_DIR"), "/types.rs"));
}

/// Ability identifiers, attributes and stage dispatch
pub mod abilities;

/// Held item identifiers and hooks
pub mod items;

/// Move identifiers, catalog and attributes
pub mod moves;

pub mod ai;
pub mod battle;
pub mod cells;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod queue;
pub mod rng;
pub mod roster;
pub mod scenario;
pub mod snapshot;

/// Runtime state of combatants and the battlefield
pub mod state;

pub mod tags;
pub mod turn;

// Re-export commonly used types
pub use abilities::AbilityId;
pub use battle::Battle;
pub use config::{BattleConfig, BattleFormat};
pub use error::{CatalogError, ConfigError, ScenarioError};
pub use events::BattleEvent;
pub use items::ItemId;
pub use moves::{Move, MoveId};
pub use pipeline::{execute_move, simulate_move, use_move, MoveOutcome, MoveResolution};
pub use queue::{Phase, TurnQueue, TurnReport};
pub use roster::CombatantConfig;
pub use scenario::Scenario;
pub use snapshot::BattleSnapshot;
pub use state::{BattlerIndex, CombatantId, Side};
pub use turn::{run_turn, TurnCommand};
pub use types::{Type, TypeImmunities};
