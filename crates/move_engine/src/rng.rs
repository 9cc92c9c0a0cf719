//! Per-battle deterministic random number generation.
//!
//! Every roll in a battle (accuracy, secondary-effect chance, multi-hit
//! counts, damage rolls, critical hits, speed ties) is drawn from one
//! [`BattleRng`]. Identical seeds reproduce identical battles, and a cloned
//! generator replays exactly the rolls the original would make next, which is
//! what simulated (dry-run) resolution relies on.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Deterministic battle RNG backed by ChaCha8.
#[derive(Clone, Debug)]
pub struct BattleRng {
    inner: ChaCha8Rng,
    seed: u64,
}

/// Serializable RNG position for snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub word_pos: u128,
}

impl BattleRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Seed this generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `[0, n)`. Returns 0 without drawing when `n <= 1`.
    pub fn random_int(&mut self, n: u32) -> u32 {
        if n <= 1 {
            return 0;
        }
        self.inner.gen_range(0..n)
    }

    /// Uniform integer in `[min, max]`.
    pub fn random_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + self.random_int(max - min + 1)
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.random_int(slice.len() as u32) as usize;
        slice.get(idx)
    }

    /// Fisher-Yates shuffle driven by `random_int`.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        for i in (1..slice.len()).rev() {
            let j = self.random_int(i as u32 + 1) as usize;
            slice.swap(i, j);
        }
    }

    /// Capture the current stream position.
    #[must_use]
    pub fn state(&self) -> RngState {
        RngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore a generator at a captured stream position.
    #[must_use]
    pub fn from_state(state: RngState) -> Self {
        let mut rng = Self::new(state.seed);
        rng.inner.set_word_pos(state.word_pos);
        rng
    }
}
