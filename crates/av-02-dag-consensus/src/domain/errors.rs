//! Error types for DAG Consensus
//!
//! Three layers:
//! - `VerificationError`: input validation, rejects only the offending entity
//! - `DagError`: structural misuse, capacity and engine-level failures
//! - `StorageError`: failures reported by the persistence port

use super::value_objects::{Hash, Status, TxId, VertexId};
use av_01_sampling::SamplingError;
use thiserror::Error;

/// Verification failures of a single transaction or vertex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("Invalid sender or recipient")]
    InvalidSenderOrRecipient,

    #[error("Zero amount")]
    ZeroAmount,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid transaction {tx:?}: {source}")]
    InvalidTransaction {
        tx: TxId,
        #[source]
        source: Box<VerificationError>,
    },

    #[error("Invalid height {height} for vertex with {parents} parents")]
    InvalidHeight { height: u64, parents: usize },

    #[error("Duplicate parent: {0:?}")]
    DuplicateParent(VertexId),

    #[error("Transaction listed twice: {0:?}")]
    DuplicateTransaction(TxId),
}

/// Persistence port failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Empty key")]
    EmptyKey,

    #[error("Backend error: {0}")]
    Backend(String),
}

/// All errors surfaced by the DAG consensus core.
#[derive(Debug, Error)]
pub enum DagError {
    #[error("Parent {parent:?} of vertex {vertex:?} not found")]
    ParentNotFound { vertex: VertexId, parent: VertexId },

    #[error("Not found: {0:?}")]
    NotFound(Hash),

    #[error("Vertex already submitted: {0:?}")]
    DuplicateVertex(VertexId),

    #[error("Transaction {tx:?} already carried by vertex {vertex:?}")]
    DuplicateTransaction { tx: TxId, vertex: VertexId },

    #[error("Invalid height for {vertex:?}: expected {expected}, got {actual}")]
    InvalidHeight {
        vertex: VertexId,
        expected: u64,
        actual: u64,
    },

    #[error("Invalid state transition for {id:?}: {from} -> {to}")]
    InvalidStateTransition { id: Hash, from: Status, to: Status },

    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("Sampling error: {0}")]
    Sampling(#[from] SamplingError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Unknown participant: {0:?}")]
    UnknownParticipant([u8; 32]),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Processing cancelled")]
    Cancelled,
}

impl DagError {
    /// Engine-level errors abort the whole batch. Everything else is scoped
    /// to a single entity or a single caller mistake.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DagError::Sampling(_) | DagError::Storage(_) | DagError::ThreadPool(_)
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, DagError::Cancelled)
    }
}

/// Result type for DAG consensus operations
pub type DagResult<T> = Result<T, DagError>;
