//! # Lazy Uniform Sampler
//!
//! Uniform sampling without replacement over `[0, n)`.
//!
//! ## Algorithm: Lazy Fisher–Yates
//!
//! The population is conceptually the identity array `[0, n)`. With `d`
//! values already drawn, a draw picks `p` uniformly in `[0, n - d)`, yields
//! the value at `p`, then moves the value at `n - d - 1` into `p`. Only
//! positions whose value differs from identity are stored, in a sparse
//! override map, so initialization is O(1) for any `n` and each draw is O(1)
//! expected.

use super::error::{SamplingError, SamplingResult};
use super::rng::SamplerRng;
use crate::ports::inbound::UniformSamplerApi;
use std::collections::HashMap;

/// Largest population accepted by `initialize`.
pub const MAX_POPULATION: u64 = u32::MAX as u64;

/// Uniform sampler without replacement.
#[derive(Debug, Clone)]
pub struct LazyUniformSampler {
    len: u64,
    drawn: u64,
    /// position -> value, only where value != position
    overrides: HashMap<u64, u64>,
    rng: SamplerRng,
}

impl LazyUniformSampler {
    pub fn new() -> Self {
        Self::with_rng(SamplerRng::from_entropy())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SamplerRng::seeded(seed))
    }

    fn with_rng(rng: SamplerRng) -> Self {
        Self {
            len: 0,
            drawn: 0,
            overrides: HashMap::new(),
            rng,
        }
    }

    /// Initialized population size.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn value_at(&self, position: u64) -> u64 {
        self.overrides.get(&position).copied().unwrap_or(position)
    }

    /// Draw one value. Caller guarantees `drawn < len`.
    fn draw_one(&mut self) -> u64 {
        let remaining = self.len - self.drawn;
        let position = self.rng.below(remaining);
        let last = remaining - 1;

        let value = self.value_at(position);
        let replacement = self.value_at(last);

        if replacement == position {
            self.overrides.remove(&position);
        } else {
            self.overrides.insert(position, replacement);
        }
        // `last` is now outside the live range
        self.overrides.remove(&last);

        self.drawn += 1;
        value
    }
}

impl Default for LazyUniformSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformSamplerApi for LazyUniformSampler {
    fn initialize(&mut self, n: u64) -> SamplingResult<()> {
        if n == 0 || n > MAX_POPULATION {
            return Err(SamplingError::InvalidPopulation(n));
        }
        self.len = n;
        self.drawn = 0;
        self.overrides.clear();
        Ok(())
    }

    fn sample(&mut self, count: usize) -> SamplingResult<Vec<u64>> {
        let remaining = self.remaining();
        if count as u64 > remaining {
            return Err(SamplingError::OutOfRange {
                requested: count,
                available: remaining as usize,
            });
        }

        Ok((0..count).map(|_| self.draw_one()).collect())
    }

    fn reset(&mut self) {
        self.drawn = 0;
        self.overrides.clear();
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    fn remaining(&self) -> u64 {
        self.len - self.drawn
    }
}
