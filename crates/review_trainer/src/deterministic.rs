//! Deterministic utilities for reproducible training
//!
//! Every random choice the trainer makes (split shuffles, row bagging,
//! feature subsampling) draws from an [`LcgRng`] seeded from the run
//! configuration, so a given seed always yields the same model.

use std::num::Wrapping;

/// Row bagging draws
pub const BAGGING_STREAM: u64 = 1;
/// Per-tree feature subsampling
pub const FEATURE_STREAM: u64 = 2;
/// Early-stopping validation split
pub const VALIDATION_SPLIT_STREAM: u64 = 3;

/// Seed for sub-stream `stream` of `seed`; stream 0 is `seed` itself.
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    seed ^ stream.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// 64-bit linear congruential generator (Knuth MMIX constants).
///
/// Only the high bits are used for output; the low bits of an LCG with a
/// power-of-two modulus cycle quickly.
#[derive(Clone, Debug)]
pub struct LcgRng {
    state: Wrapping<u64>,
}

impl LcgRng {
    const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
    const INCREMENT: u64 = 1_442_695_040_888_963_407;

    pub fn new(seed: u64) -> Self {
        let mut rng = Self {
            state: Wrapping(seed),
        };
        rng.step();
        rng
    }

    /// Derive an independent stream, e.g. one per boosting concern.
    pub fn derive(seed: u64, stream: u64) -> Self {
        Self::new(derive_seed(seed, stream))
    }

    fn step(&mut self) -> u64 {
        self.state = self.state * Wrapping(Self::MULTIPLIER) + Wrapping(Self::INCREMENT);
        self.state.0
    }

    /// Next 32 random bits
    pub fn next_u32(&mut self) -> u32 {
        (self.step() >> 32) as u32
    }

    /// Uniform value in [0, 1) with 53 bits of precision
    pub fn next_f64(&mut self) -> f64 {
        (self.step() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform index in [0, n); 0 when `n == 0`
    pub fn next_below(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        ((u64::from(self.next_u32()) * n as u64) >> 32) as usize
    }

    /// Fisher-Yates shuffle
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.next_below(i + 1);
            items.swap(i, j);
        }
    }

    /// `k` distinct indices from `0..n`, ascending
    pub fn sample_indices(&mut self, n: usize, k: usize) -> Vec<usize> {
        let mut all: Vec<usize> = (0..n).collect();
        self.shuffle(&mut all);
        all.truncate(k.min(n));
        all.sort_unstable();
        all
    }
}
