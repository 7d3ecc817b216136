//! Deterministic random numbers for headless runs.
//!
//! RULE: the hourglass itself never rolls dice. Randomness is only used by
//! drivers (frame-time jitter, scripted opponents) and always flows from a
//! single seed, so a run can be replayed exactly.

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// Stable stream assignments. NEVER reorder — only append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum Stream {
    FrameTiming = 0,
    EnemyHand   = 1,
}

pub struct FrameRng {
    inner: Pcg64Mcg,
}

impl FrameRng {
    pub fn new(seed: u64, stream: Stream) -> Self {
        let derived_seed = seed ^ (stream as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self { inner: Pcg64Mcg::seed_from_u64(derived_seed) }
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// One frame's delta at `fps`, stretched or squeezed by up to
    /// `jitter` (0.25 = ±25%). Never negative.
    pub fn frame_delta(&mut self, fps: f64, jitter: f64) -> f64 {
        let nominal = 1.0 / fps;
        let swing = (self.next_f64() * 2.0 - 1.0) * jitter;
        (nominal * (1.0 + swing)).max(0.0)
    }
}
