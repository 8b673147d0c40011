//! Outbound Ports (Driven Ports / SPI)
//!
//! Everything the engine needs from the outside world: persistence, votes
//! from remote participants and signature checks.

use crate::domain::errors::{StorageError, VerificationError};
use crate::domain::transaction::Transaction;
use crate::domain::value_objects::{ParticipantId, TxId, VertexId};
use crate::domain::vertex::Vertex;

/// Persistence of decided entities, keyed by identifier.
pub trait DagStorage: Send + Sync {
    fn put_vertex(&self, vertex: &Vertex) -> Result<(), StorageError>;

    fn get_vertex(&self, id: &VertexId) -> Result<Option<Vertex>, StorageError>;

    fn put_transaction(&self, tx: &Transaction) -> Result<(), StorageError>;

    fn get_transaction(&self, id: &TxId) -> Result<Option<Transaction>, StorageError>;
}

/// Vote of one sampled participant.
///
/// Must not block on the network inside the engine's worker pool; a remote
/// implementation answers from votes it has already collected.
pub trait VoteSource: Send + Sync {
    fn vote(&self, participant: &ParticipantId, vertex: &Vertex) -> bool;
}

/// Cryptographic signature check for a transaction.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, tx: &Transaction) -> Result<(), VerificationError>;
}
