//! Seeded random source
//!
//! Every random draw in the simulation goes through an `RngSource`. Two
//! sources seeded with the same value produce the same sequence, which is what
//! makes level builds reproducible.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Seeded PCG32 wrapper
#[derive(Debug, Clone)]
pub struct RngSource {
    seed: u64,
    rng: Pcg32,
}

impl RngSource {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    /// Seed this source was created with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform value in [0, 1)
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// True with probability `p` (clamped to [0, 1])
    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.unit() < p.clamp(0.0, 1.0)
    }

    /// Uniform value between `lo` and `hi`; returns `lo` for an empty range
    pub fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if !(hi > lo) {
            return lo;
        }
        lo + (hi - lo) * self.unit()
    }

    /// Uniform integer in [lo, hi]; returns `lo` when `hi < lo`
    pub fn int_inclusive(&mut self, lo: i32, hi: i32) -> i32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }
}
