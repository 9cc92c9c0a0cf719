//! Volatile tags and their lifecycles.
//!
//! A tag moves through `Absent -> Active(turns) -> Lapsing -> Removed`.
//! `on_add` fires once when the tag is inserted; `lapse` runs once per
//! matching [`LapseTiming`] bucket and a `false` result removes the tag
//! through `on_remove`. Re-adding an existing kind goes through `on_overlap`,
//! which refuses unless the kind is stackable.

pub mod arena;
pub mod battler;

pub use arena::{ArenaTag, ArenaTagKind, ArenaTagSide};
pub use battler::{BattlerTag, BattlerTagKind, BattlerTags, TagPayload};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Point in a turn at which a tag gets a chance to lapse.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LapseTiming {
    /// Before the owner's move executes
    PreMove,
    /// After the owner's move completes
    AfterMove,
    TurnEnd,
    /// Only lapsed explicitly by the effect that owns the tag
    Custom,
}

/// Result of trying to add a tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagAddResult {
    Added,
    /// Stackable kind gained a layer; carries the new layer count
    Stacked(u8),
    /// Overlap refused (already present, or at its layer cap)
    Refused,
}

impl TagAddResult {
    pub const fn succeeded(self) -> bool {
        !matches!(self, TagAddResult::Refused)
    }
}

/// Check that every stackable tag kind declares a layer cap.
pub fn validate_tag_kinds() -> Result<(), CatalogError> {
    for kind in BattlerTagKind::ALL {
        if kind.is_stackable() && kind.max_layers() == 0 {
            return Err(CatalogError::UncappedBattlerTag(kind));
        }
    }
    for kind in ArenaTagKind::ALL {
        if kind.is_stackable() && kind.max_layers() == 0 {
            return Err(CatalogError::UncappedArenaTag(kind));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_kinds_are_capped() {
        assert_eq!(validate_tag_kinds(), Ok(()));
    }

    #[test]
    fn test_add_result_success() {
        assert!(TagAddResult::Added.succeeded());
        assert!(TagAddResult::Stacked(2).succeeded());
        assert!(!TagAddResult::Refused.succeeded());
    }
}
