//! Domain layer for the Sampling subsystem
//!
//! Contains the two sampler implementations, their shared randomness source
//! and the error taxonomy.

pub mod error;
pub mod rng;
pub mod uniform;
pub mod weighted;

pub use error::*;
pub use uniform::LazyUniformSampler;
pub use weighted::WeightedHeapSampler;
