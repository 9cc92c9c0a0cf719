//! Move definitions and attribute composition.
//!
//! Static stats come from the generated `MoveData` table. Behavior is
//! assembled from ordered [`MoveAttr`]s and [`MoveCondition`]s attached when
//! the catalog is built; nothing here is mutated after construction.

// Include generated move identifiers
include!(concat!(env!("OUT_DIR"), "/moves.rs"));

pub mod attrs;
pub mod catalog;
pub mod conditions;
pub mod targeting;

pub use attrs::{
    AttrArgs, AttrKind, EffectKind, EffectTrigger, MoveAttr, MoveEffect, MultiHitKind,
    StatusMatch,
};
pub use catalog::{catalog, MoveCatalog};
pub use conditions::MoveCondition;
pub use targeting::{resolve_targets, ResolvedTargets};

impl MoveId {
    /// Catalog entry for this move.
    #[inline]
    pub fn get(self) -> &'static Move {
        catalog().get(self)
    }
}

/// A move as used by the pipeline: static data plus its components.
#[derive(Clone, Debug)]
pub struct Move {
    pub id: MoveId,
    pub data: MoveData,
    attrs: Vec<MoveAttr>,
    conditions: Vec<MoveCondition>,
    /// Known approximation of the real behavior
    pub partial: bool,
}

impl Move {
    pub fn builder(id: MoveId) -> MoveBuilder {
        MoveBuilder {
            mv: Move {
                id,
                data: *id.data(),
                attrs: Vec::new(),
                conditions: Vec::new(),
                partial: false,
            },
        }
    }

    /// Attributes in declaration order.
    pub fn attrs(&self) -> &[MoveAttr] {
        &self.attrs
    }

    pub fn conditions(&self) -> &[MoveCondition] {
        &self.conditions
    }

    pub fn attrs_of_kind(&self, kind: AttrKind) -> impl Iterator<Item = &MoveAttr> {
        self.attrs.iter().filter(move |a| a.kind() == kind)
    }

    pub fn has_attr(&self, kind: AttrKind) -> bool {
        self.attrs.iter().any(|a| a.kind() == kind)
    }

    /// Secondary and primary effects in declaration order.
    pub fn effects(&self) -> impl Iterator<Item = &MoveEffect> {
        self.attrs.iter().filter_map(|a| match a {
            MoveAttr::Effect(effect) => Some(effect),
            _ => None,
        })
    }

    #[inline]
    pub fn category(&self) -> MoveCategory {
        self.data.category
    }

    #[inline]
    pub fn is_status(&self) -> bool {
        self.data.category == MoveCategory::Status
    }

    #[inline]
    pub fn has_flag(&self, flag: MoveFlags) -> bool {
        self.data.flags.contains(flag)
    }

    pub fn is_ohko(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, MoveAttr::OneHitKo))
    }

    pub fn is_typeless(&self) -> bool {
        self.attrs.iter().any(|a| matches!(a, MoveAttr::Typeless))
    }

    pub fn is_multi_hit(&self) -> bool {
        self.has_attr(AttrKind::MultiHit)
    }

    /// Whether any effect rolls against a chance below 100.
    pub fn has_secondary_chance(&self) -> bool {
        self.effects()
            .any(|e| matches!(e.chance.unwrap_or(self.data.chance), 1..=99))
    }
}

/// Builds a [`Move`], auto-registering each attribute's condition.
pub struct MoveBuilder {
    mv: Move,
}

impl MoveBuilder {
    pub fn attr(mut self, attr: MoveAttr) -> Self {
        if let Some(condition) = attr.condition() {
            self.mv.conditions.push(condition);
        }
        self.mv.attrs.push(attr);
        self
    }

    pub fn effect(self, effect: MoveEffect) -> Self {
        self.attr(MoveAttr::Effect(effect))
    }

    pub fn condition(mut self, condition: MoveCondition) -> Self {
        self.mv.conditions.push(condition);
        self
    }

    pub fn partial(mut self) -> Self {
        self.mv.partial = true;
        self
    }

    // ========================================================================
    // Stat overrides (custom moves built outside the catalog)
    // ========================================================================

    pub fn power(mut self, power: u16) -> Self {
        self.mv.data.power = power;
        self
    }

    pub fn accuracy(mut self, accuracy: i16) -> Self {
        self.mv.data.accuracy = accuracy;
        self
    }

    pub fn chance(mut self, chance: i8) -> Self {
        self.mv.data.chance = chance;
        self
    }

    pub fn move_type(mut self, move_type: crate::types::Type) -> Self {
        self.mv.data.move_type = move_type;
        self
    }

    pub fn category(mut self, category: MoveCategory) -> Self {
        self.mv.data.category = category;
        self
    }

    pub fn target(mut self, target: MoveTarget) -> Self {
        self.mv.data.target = target;
        self
    }

    pub fn priority(mut self, priority: i8) -> Self {
        self.mv.data.priority = priority;
        self
    }

    pub fn flags(mut self, flags: MoveFlags) -> Self {
        self.mv.data.flags = flags;
        self
    }

    pub fn build(self) -> Move {
        self.mv
    }
}
