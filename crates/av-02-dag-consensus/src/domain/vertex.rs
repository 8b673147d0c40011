//! Vertex entity
//!
//! A block-like DAG node: ordered parent references plus an ordered list of
//! transactions. Deciding a vertex decides every transaction it contains.

use super::capabilities::{Decidable, VertexLike};
use super::errors::{DagResult, VerificationError};
use super::transaction::Transaction;
use super::value_objects::{Hash, Status, TxId, VertexId};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Canonical header encoding used when the caller supplies no bytes.
#[derive(Serialize)]
struct VertexHeader<'a> {
    parents: &'a [VertexId],
    height: u64,
    timestamp: u64,
    transactions: Vec<TxId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vertex {
    id: VertexId,
    parents: Vec<VertexId>,
    height: u64,
    /// Creation time, unix millis
    timestamp: u64,
    transactions: Vec<Transaction>,
    status: Status,
    bytes: Vec<u8>,
}

impl Vertex {
    pub fn new(
        parents: Vec<VertexId>,
        height: u64,
        timestamp: u64,
        transactions: Vec<Transaction>,
    ) -> Self {
        let tx_ids: Vec<TxId> = transactions.iter().map(|tx| tx.id()).collect();
        let id = Self::compute_id(height, &parents, &tx_ids, timestamp);
        let bytes = bincode::serialize(&VertexHeader {
            parents: &parents,
            height,
            timestamp,
            transactions: tx_ids,
        })
        // Integers and id slices into a Vec: encoding cannot fail.
        .expect("vertex header encoding is infallible");

        Self {
            id,
            parents,
            height,
            timestamp,
            transactions,
            status: Status::Processing,
            bytes,
        }
    }

    /// Vertex with no parents at height 0.
    pub fn genesis(timestamp: u64, transactions: Vec<Transaction>) -> Self {
        Self::new(Vec::new(), 0, timestamp, transactions)
    }

    /// Vertex referencing `parents`, at `max(parent heights) + 1`.
    pub fn child_of(parents: &[&Vertex], timestamp: u64, transactions: Vec<Transaction>) -> Self {
        let height = parents.iter().map(|p| p.height).max().map_or(0, |h| h + 1);
        let parent_ids = parents.iter().map(|p| p.id).collect();
        Self::new(parent_ids, height, timestamp, transactions)
    }

    /// Hash of height, parents and transaction count.
    ///
    /// The transaction identifiers and timestamp are folded in as well so two
    /// siblings with the same number of transactions never collide.
    pub fn compute_id(height: u64, parents: &[VertexId], tx_ids: &[TxId], timestamp: u64) -> VertexId {
        let mut hasher = Sha256::new();
        hasher.update(b"av.vertex");
        hasher.update(height.to_le_bytes());
        hasher.update((parents.len() as u64).to_le_bytes());
        for parent in parents {
            hasher.update(parent.as_bytes());
        }
        hasher.update((tx_ids.len() as u64).to_le_bytes());
        for tx in tx_ids {
            hasher.update(tx.as_bytes());
        }
        hasher.update(timestamp.to_le_bytes());
        H256::from_slice(&hasher.finalize())
    }

    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = bytes;
        self
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn is_genesis(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn transaction_ids(&self) -> Vec<TxId> {
        self.transactions.iter().map(|tx| tx.id()).collect()
    }

    /// Move the vertex and all its transactions to `target`.
    ///
    /// Every transition is checked before anything changes, so a failure
    /// leaves the vertex untouched. Returns the transactions whose status
    /// changed, in vertex order.
    pub(crate) fn decide(&mut self, target: Status) -> DagResult<Vec<TxId>> {
        if !self.status.check_transition(self.id, target)? {
            return Ok(Vec::new());
        }
        for tx in &self.transactions {
            tx.status().check_transition(tx.id(), target)?;
        }

        let mut changed = Vec::with_capacity(self.transactions.len());
        for tx in &mut self.transactions {
            if tx.transition(target)? {
                changed.push(tx.id());
            }
        }
        self.status = target;
        Ok(changed)
    }

    /// Accept the vertex, returning transactions accepted by this call in
    /// vertex order.
    pub fn accept_in_order(&mut self) -> DagResult<Vec<TxId>> {
        self.decide(Status::Accepted)
    }

    pub fn reject_all(&mut self) -> DagResult<Vec<TxId>> {
        self.decide(Status::Rejected)
    }
}

impl Decidable for Vertex {
    fn id(&self) -> Hash {
        self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn accept(&mut self) -> DagResult<()> {
        self.accept_in_order().map(|_| ())
    }

    fn reject(&mut self) -> DagResult<()> {
        self.reject_all().map(|_| ())
    }

    fn verify(&self) -> Result<(), VerificationError> {
        if self.parents.is_empty() != (self.height == 0) {
            return Err(VerificationError::InvalidHeight {
                height: self.height,
                parents: self.parents.len(),
            });
        }

        let mut seen = HashSet::with_capacity(self.parents.len());
        for parent in &self.parents {
            if !seen.insert(parent) {
                return Err(VerificationError::DuplicateParent(*parent));
            }
        }

        let mut carried = HashSet::with_capacity(self.transactions.len());
        for tx in &self.transactions {
            if !carried.insert(tx.id()) {
                return Err(VerificationError::DuplicateTransaction(tx.id()));
            }
        }

        for tx in &self.transactions {
            tx.verify()
                .map_err(|source| VerificationError::InvalidTransaction {
                    tx: tx.id(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl VertexLike for Vertex {
    fn parent_ids(&self) -> &[VertexId] {
        &self.parents
    }

    fn height(&self) -> u64 {
        self.height
    }

    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
