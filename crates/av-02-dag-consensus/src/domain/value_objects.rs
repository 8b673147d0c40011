//! Value objects for DAG Consensus

use crate::domain::errors::{DagError, DagResult};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Type aliases for clarity
pub type Hash = H256;
pub type TxId = H256;
pub type VertexId = H256;

/// Participant (validator) identifier: 32-byte public key hash
pub type ParticipantId = [u8; 32];

/// Lifecycle status shared by transactions and vertices.
///
/// `Processing` is the only non-terminal state. `Accepted` and `Rejected`
/// are terminal and mutually exclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    #[default]
    Processing,
    Accepted,
    Rejected,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Processing)
    }

    pub fn is_accepted(self) -> bool {
        matches!(self, Status::Accepted)
    }

    pub fn is_rejected(self) -> bool {
        matches!(self, Status::Rejected)
    }

    /// Check a transition of entity `id` from `self` to `target`.
    ///
    /// Returns `Ok(true)` when the status must change, `Ok(false)` when it is
    /// already `target` (idempotent no-op).
    pub fn check_transition(self, id: Hash, target: Status) -> DagResult<bool> {
        match (self, target) {
            (from, to) if from == to => Ok(false),
            (Status::Processing, _) => Ok(true),
            (from, to) => Err(DagError::InvalidStateTransition { id, from, to }),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Processing => "Processing",
            Status::Accepted => "Accepted",
            Status::Rejected => "Rejected",
        };
        f.write_str(name)
    }
}

/// Consensus verdict for one vertex.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Accept,
    Reject,
}

impl Decision {
    pub fn status(self) -> Status {
        match self {
            Decision::Accept => Status::Accepted,
            Decision::Reject => Status::Rejected,
        }
    }
}

/// Result of running the pipeline on one vertex.
///
/// `Pending` is the "not yet decided" outcome: dependencies are unresolved
/// and the vertex stays `Processing`. It is not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Accepted,
    Rejected(RejectReason),
    Pending { missing: usize },
}

impl Outcome {
    pub fn status(&self) -> Status {
        match self {
            Outcome::Accepted => Status::Accepted,
            Outcome::Rejected(_) => Status::Rejected,
            Outcome::Pending { .. } => Status::Processing,
        }
    }
}

/// Why a vertex was rejected.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RejectReason {
    /// Verification of the vertex or one of its transactions failed
    Invalid(String),
    /// A parent or transaction dependency was rejected
    RejectedDependency(Hash),
    /// The quorum voted against it
    Voted,
    /// Already rejected before this call
    Previously,
}

impl RejectReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            RejectReason::Invalid(_) => "invalid",
            RejectReason::RejectedDependency(_) => "rejected_dependency",
            RejectReason::Voted => "voted",
            RejectReason::Previously => "previously",
        }
    }
}

/// Summary of one `batch_process_vertices` call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Decided `Accepted` by this call, in decision order
    pub accepted: Vec<VertexId>,
    /// Decided `Rejected` by this call, in decision order
    pub rejected: Vec<(VertexId, RejectReason)>,
    /// Still `Processing` when the batch ended
    pub pending: Vec<VertexId>,
    /// Waves evaluated across all passes
    pub waves: usize,
    pub passes: usize,
}

impl BatchReport {
    pub fn decided(&self) -> usize {
        self.accepted.len() + self.rejected.len()
    }
}
