//! Domain layer for DAG Consensus
//!
//! Entities, the lifecycle state machine, the frontier and the synchronized
//! store. No I/O.

pub mod capabilities;
pub mod errors;
pub mod frontier;
pub mod quorum;
pub mod store;
pub mod transaction;
pub mod value_objects;
pub mod vertex;

pub use capabilities::{Decidable, StatusLookup, TransactionLike, VertexLike};
pub use errors::{DagError, DagResult, StorageError, VerificationError};
pub use frontier::FrontierManager;
pub use quorum::{Participant, Poll, Quorum, SamplingMode};
pub use store::{DagState, DagStore, DecisionRecord};
pub use transaction::Transaction;
pub use value_objects::{
    BatchReport, Decision, Hash, Outcome, ParticipantId, RejectReason, Status, TxId, VertexId,
};
pub use vertex::Vertex;
