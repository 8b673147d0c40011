//! Error types for the Sampling subsystem

use thiserror::Error;

/// All errors a sampler can return.
///
/// Every sampler operation validates its arguments before mutating state,
/// so an `Err` always leaves the sampler exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SamplingError {
    /// Initialization with an empty population, or a draw with nothing eligible
    #[error("No eligible samples")]
    NoEligibleSamples,

    /// Cumulative weight does not fit in u64
    #[error("Weight overflow: cumulative weight exceeds u64::MAX")]
    WeightOverflow,

    /// More samples requested than remain in the population
    #[error("Sample out of range: requested {requested}, available {available}")]
    OutOfRange { requested: usize, available: usize },

    /// Element index outside the initialized population
    #[error("Index out of range: {index} >= {len}")]
    IndexOutOfRange { index: usize, len: usize },

    /// Element was previously removed
    #[error("Element removed: {0}")]
    ElementRemoved(usize),

    /// Uniform population size not in (0, u32::MAX]
    #[error("Invalid population size: {0}")]
    InvalidPopulation(u64),
}

/// Result type for sampling operations
pub type SamplingResult<T> = Result<T, SamplingError>;
