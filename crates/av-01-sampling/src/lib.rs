//! # AV-01: Sampling Subsystem
//!
//! Quorum sampling primitives for the DAG consensus engine.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): Pure data structures, no I/O
//!   - `WeightedHeapSampler`: stake-weighted sampling without replacement,
//!     backed by a binary min-heap over exponential-race priorities
//!   - `LazyUniformSampler`: uniform sampling without replacement using a
//!     lazy Fisher–Yates shuffle over a sparse override table
//! - **Ports** (`ports/`): `WeightedSamplerApi` and `UniformSamplerApi`,
//!   the driving ports consumed by the consensus engine
//!
//! ## Complexity
//!
//! | Operation         | Weighted   | Uniform       |
//! |-------------------|------------|---------------|
//! | initialize        | O(n)       | O(1)          |
//! | one draw          | O(log n)   | O(1) expected |
//! | update / remove   | O(log n)   | n/a           |
//! | reset             | O(n)       | O(touched)    |
//!
//! ## Concurrency
//!
//! Samplers are not `Sync`-safe for mutation. Each instance must be owned by
//! a single caller, or one instance per worker with its own seed.
//!
//! ## Usage
//!
//! ```rust
//! use av_01_sampling::{WeightedHeapSampler, WeightedSamplerApi};
//!
//! let mut sampler = WeightedHeapSampler::new();
//! sampler.set_seed(7);
//! sampler.initialize(&[10, 20, 30]).unwrap();
//! let drawn = sampler.sample(3).unwrap();
//! assert_eq!(drawn.len(), 3);
//! ```

pub mod domain;
pub mod ports;

pub use domain::error::{SamplingError, SamplingResult};
pub use domain::uniform::LazyUniformSampler;
pub use domain::weighted::WeightedHeapSampler;
pub use ports::inbound::{UniformSamplerApi, WeightedSamplerApi};
