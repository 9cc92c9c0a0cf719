//! Reference cells threaded through a single pipeline stage.
//!
//! Hooks never return values; they read and overwrite the in-flight value
//! held by a cell passed as `&mut`. A cell lives only as long as the stage
//! that created it.

use crate::types::Type;

const FLOOR_EPSILON: f64 = 1e-9;

/// Numeric accumulator (power, accuracy, multipliers, hit counts).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumberCell {
    pub value: f64,
}

impl NumberCell {
    pub const fn new(value: f64) -> Self {
        Self { value }
    }

    /// Multiply in place.
    #[inline]
    pub fn scale(&mut self, factor: f64) {
        self.value *= factor;
    }

    /// Floored integer view, saturating at zero.
    ///
    /// Values within float noise of the next integer count as that integer.
    #[inline]
    pub fn floor_u32(&self) -> u32 {
        if self.value <= 0.0 {
            0
        } else {
            (self.value + FLOOR_EPSILON).floor() as u32
        }
    }
}

/// Flag a hook raises to stop the stage, as pre-move hooks do to cancel a move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BoolCell {
    pub value: bool,
}

impl BoolCell {
    pub const fn new(value: bool) -> Self {
        Self { value }
    }

    #[inline]
    pub fn set(&mut self) {
        self.value = true;
    }
}

/// Effective move type as it is being rewritten by type-changing effects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TypeCell {
    pub value: Type,
}

impl TypeCell {
    pub const fn new(value: Type) -> Self {
        Self { value }
    }
}
