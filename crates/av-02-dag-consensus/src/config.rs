//! Configuration for the DAG consensus engine

use crate::domain::errors::{DagError, DagResult};
pub use crate::domain::quorum::SamplingMode;
use serde::{Deserialize, Serialize};

/// Which decision rule the engine applies to poll results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionKind {
    /// One round; accept when the yes stake reaches alpha
    #[default]
    Majority,
    /// `beta` consecutive successful rounds
    Confidence,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    pub kind: DecisionKind,
    /// Yes share of the sampled weight a round needs, in percent
    pub alpha_percent: u8,
    /// Consecutive successful rounds for `Confidence`
    pub beta: u32,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            kind: DecisionKind::Majority,
            alpha_percent: 67,
            beta: 3,
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Worker threads in the processing pool
    pub max_parallelism: usize,
    /// Committee size per voting round
    pub sample_size: usize,
    pub sampling_mode: SamplingMode,
    pub decision: DecisionConfig,
    /// Upper bound on passes per batch
    pub max_passes: usize,
    /// Seed for reproducible committee draws
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_parallelism: 4,
            sample_size: 20,
            sampling_mode: SamplingMode::StakeWeighted,
            decision: DecisionConfig::default(),
            max_passes: 64,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> DagResult<()> {
        if self.max_parallelism == 0 {
            return Err(DagError::InvalidConfig(
                "max_parallelism must be at least 1".into(),
            ));
        }
        if self.sample_size == 0 {
            return Err(DagError::InvalidConfig(
                "sample_size must be at least 1".into(),
            ));
        }
        if self.max_passes == 0 {
            return Err(DagError::InvalidConfig("max_passes must be at least 1".into()));
        }
        if self.decision.alpha_percent == 0 || self.decision.alpha_percent > 100 {
            return Err(DagError::InvalidConfig(format!(
                "alpha_percent must be in 1..=100, got {}",
                self.decision.alpha_percent
            )));
        }
        if self.decision.kind == DecisionKind::Confidence && self.decision.beta == 0 {
            return Err(DagError::InvalidConfig(
                "beta must be at least 1 for the confidence rule".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.max_parallelism, 4);
        assert_eq!(config.sample_size, 20);
        assert_eq!(config.sampling_mode, SamplingMode::StakeWeighted);
        assert_eq!(config.decision.alpha_percent, 67);
        assert!(config.seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let config = EngineConfig {
            max_parallelism: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(DagError::InvalidConfig(_))));
    }

    #[test]
    fn test_alpha_bounds() {
        let mut config = EngineConfig::default();
        config.decision.alpha_percent = 101;
        assert!(config.validate().is_err());
        config.decision.alpha_percent = 100;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_confidence_needs_beta() {
        let mut config = EngineConfig::default();
        config.decision.kind = DecisionKind::Confidence;
        config.decision.beta = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig = serde_json::from_str(
            r#"{ "max_parallelism": 8, "sampling_mode": "uniform", "decision": { "kind": "confidence" } }"#,
        )
        .unwrap();

        assert_eq!(config.max_parallelism, 8);
        assert_eq!(config.sampling_mode, SamplingMode::Uniform);
        assert_eq!(config.decision.kind, DecisionKind::Confidence);
        assert_eq!(config.decision.beta, 3);
        assert_eq!(config.sample_size, 20);
    }
}
