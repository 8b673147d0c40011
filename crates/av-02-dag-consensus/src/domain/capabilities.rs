//! Capability traits for consensus entities
//!
//! These are the only contracts a producer, storage or network collaborator
//! must satisfy to plug entities into the core. `Transaction` and `Vertex`
//! are the in-crate implementations.

use super::errors::{DagResult, VerificationError};
use super::transaction::Transaction;
use super::value_objects::{Hash, Status, TxId, VertexId};
use std::collections::HashSet;

/// Read access to the current status of known entities.
pub trait StatusLookup {
    fn transaction_status(&self, id: &TxId) -> Option<Status>;

    fn vertex_status(&self, id: &VertexId) -> Option<Status>;
}

/// Anything that moves through `Processing -> Accepted | Rejected`.
pub trait Decidable {
    fn id(&self) -> Hash;

    fn status(&self) -> Status;

    /// Idempotent; fails when the entity is already `Rejected`.
    fn accept(&mut self) -> DagResult<()>;

    /// Idempotent; fails when the entity is already `Accepted`.
    fn reject(&mut self) -> DagResult<()>;

    fn verify(&self) -> Result<(), VerificationError>;

    /// Cached byte encoding.
    fn bytes(&self) -> &[u8];
}

pub trait TransactionLike: Decidable {
    /// Declared dependency identifiers, in insertion order.
    fn dependencies(&self) -> &[TxId];

    /// Identifiers for external conflict-set computation.
    fn input_ids(&self) -> Vec<Hash>;

    /// Declared dependencies not yet `Accepted`.
    fn missing_dependencies(&self, lookup: &dyn StatusLookup) -> HashSet<TxId>;
}

pub trait VertexLike: Decidable {
    fn parent_ids(&self) -> &[VertexId];

    fn height(&self) -> u64;

    fn transactions(&self) -> &[Transaction];
}
