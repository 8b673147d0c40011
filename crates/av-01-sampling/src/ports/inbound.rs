//! Inbound Ports (Driving Ports / API)
//!
//! The consensus engine depends on these traits rather than on the concrete
//! samplers, so tests can swap in scripted samplers.

use crate::domain::error::SamplingResult;

/// Stake-weighted sampling without replacement.
pub trait WeightedSamplerApi: Send {
    /// Replace the population with `weights`.
    ///
    /// Fails with `NoEligibleSamples` on an empty slice and `WeightOverflow`
    /// when the weights sum past `u64::MAX`.
    fn initialize(&mut self, weights: &[u64]) -> SamplingResult<()>;

    /// Draw `k` distinct indices, then regenerate priorities so the next call
    /// is an independent round.
    fn sample(&mut self, k: usize) -> SamplingResult<Vec<usize>>;

    /// Change the weight of `index`, returning the previous weight.
    fn update(&mut self, index: usize, weight: u64) -> SamplingResult<u64>;

    /// Permanently exclude `index` from future draws.
    fn remove(&mut self, index: usize) -> SamplingResult<()>;

    /// Regenerate all priorities.
    fn reset(&mut self);

    /// Switch to deterministic mode.
    fn set_seed(&mut self, seed: u64);

    /// Number of elements that can still be drawn in one round.
    fn eligible(&self) -> usize;

    /// Sum of the weights of non-removed elements.
    fn total_weight(&self) -> u64;

    /// Current weight of `index`.
    fn weight(&self, index: usize) -> SamplingResult<u64>;
}

/// Uniform sampling without replacement over `[0, n)`.
pub trait UniformSamplerApi: Send {
    /// Fails with `InvalidPopulation` unless `0 < n <= u32::MAX`.
    fn initialize(&mut self, n: u64) -> SamplingResult<()>;

    /// Draw `count` indices not drawn since the last reset.
    fn sample(&mut self, count: usize) -> SamplingResult<Vec<u64>>;

    /// Restore the full population.
    fn reset(&mut self);

    fn set_seed(&mut self, seed: u64);

    /// Undrawn population.
    fn remaining(&self) -> u64;
}
