//! Decision rules
//!
//! Turn the polls gathered for one vertex into a verdict. The engine asks the
//! rule how many rounds it wants, runs them, then hands over every poll.

use crate::config::{DecisionConfig, DecisionKind};
use crate::domain::quorum::Poll;
use crate::domain::value_objects::Decision;

pub trait DecisionRule: Send + Sync {
    /// Polls to gather before deciding.
    fn rounds(&self) -> usize;

    fn decide(&self, polls: &[Poll]) -> Decision;

    fn name(&self) -> &'static str;
}

/// Single round: accept when the yes stake reaches `alpha_percent`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MajorityRule {
    pub alpha_percent: u8,
}

impl DecisionRule for MajorityRule {
    fn rounds(&self) -> usize {
        1
    }

    fn decide(&self, polls: &[Poll]) -> Decision {
        match polls.first() {
            Some(poll) if poll.succeeded(self.alpha_percent) => Decision::Accept,
            _ => Decision::Reject,
        }
    }

    fn name(&self) -> &'static str {
        "majority"
    }
}

/// Snowball-style confidence: `beta` consecutive successful rounds accept,
/// the first failed round rejects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfidenceRule {
    pub alpha_percent: u8,
    pub beta: u32,
}

impl DecisionRule for ConfidenceRule {
    fn rounds(&self) -> usize {
        self.beta.max(1) as usize
    }

    fn decide(&self, polls: &[Poll]) -> Decision {
        let consecutive = polls
            .iter()
            .take_while(|poll| poll.succeeded(self.alpha_percent))
            .count();
        if consecutive >= self.rounds() {
            Decision::Accept
        } else {
            Decision::Reject
        }
    }

    fn name(&self) -> &'static str {
        "confidence"
    }
}

pub fn rule_from_config(config: &DecisionConfig) -> Box<dyn DecisionRule> {
    match config.kind {
        DecisionKind::Majority => Box::new(MajorityRule {
            alpha_percent: config.alpha_percent,
        }),
        DecisionKind::Confidence => Box::new(ConfidenceRule {
            alpha_percent: config.alpha_percent,
            beta: config.beta,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(yes_weight: u64, sampled_weight: u64) -> Poll {
        Poll {
            sample: vec![],
            yes: 0,
            yes_weight,
            sampled_weight,
        }
    }

    #[test]
    fn test_majority_threshold() {
        let rule = MajorityRule { alpha_percent: 67 };

        assert_eq!(rule.decide(&[poll(67, 100)]), Decision::Accept);
        assert_eq!(rule.decide(&[poll(66, 100)]), Decision::Reject);
        assert_eq!(rule.decide(&[]), Decision::Reject);
    }

    #[test]
    fn test_empty_sample_never_succeeds() {
        let rule = MajorityRule { alpha_percent: 1 };
        assert_eq!(rule.decide(&[poll(0, 0)]), Decision::Reject);
    }

    #[test]
    fn test_confidence_needs_beta_rounds() {
        let rule = ConfidenceRule {
            alpha_percent: 50,
            beta: 3,
        };

        assert_eq!(rule.rounds(), 3);
        assert_eq!(
            rule.decide(&[poll(9, 10), poll(9, 10), poll(9, 10)]),
            Decision::Accept
        );
        assert_eq!(rule.decide(&[poll(9, 10), poll(9, 10)]), Decision::Reject);
        assert_eq!(
            rule.decide(&[poll(9, 10), poll(1, 10), poll(9, 10)]),
            Decision::Reject
        );
    }

    #[test]
    fn test_rule_from_config() {
        let majority = rule_from_config(&DecisionConfig::default());
        assert_eq!(majority.name(), "majority");
        assert_eq!(majority.rounds(), 1);

        let confidence = rule_from_config(&DecisionConfig {
            kind: DecisionKind::Confidence,
            alpha_percent: 80,
            beta: 5,
        });
        assert_eq!(confidence.name(), "confidence");
        assert_eq!(confidence.rounds(), 5);
    }
}
