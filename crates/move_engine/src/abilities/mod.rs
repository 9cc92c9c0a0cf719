//! Ability attributes, registry and stage dispatch.

// Include generated ability identifiers
include!(concat!(env!("OUT_DIR"), "/abilities.rs"));

pub mod attrs;
pub mod dispatch;
pub mod registry;

pub use attrs::{AbAttr, AbilityStage, ImmunityReaction, PowerCondition, PriorityCondition};
pub use registry::{ability_attrs, ABILITY_REGISTRY};
