//! Transaction entity
//!
//! A transfer of `amount` from `sender` to `recipient`, ordered per sender by
//! `nonce`. The identifier is a SHA-256 over the header fields. Declared
//! dependencies are edges, not content, so adding one never changes the
//! identifier.

use super::capabilities::{Decidable, StatusLookup, TransactionLike};
use super::errors::{DagResult, VerificationError};
use super::value_objects::{Hash, Status, TxId};
use primitive_types::H256;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

/// Canonical header encoding used when the caller supplies no bytes.
#[derive(Serialize)]
struct TransactionHeader<'a> {
    sender: &'a str,
    recipient: &'a str,
    amount: u64,
    nonce: u64,
    signature: &'a [u8],
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    id: TxId,
    sender: String,
    recipient: String,
    amount: u64,
    nonce: u64,
    signature: Vec<u8>,
    status: Status,
    dependencies: Vec<TxId>,
    bytes: Vec<u8>,
}

impl Transaction {
    pub fn new(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
        nonce: u64,
        signature: Vec<u8>,
    ) -> Self {
        let sender = sender.into();
        let recipient = recipient.into();
        let id = Self::compute_id(&sender, &recipient, amount, nonce, &signature);
        let bytes = bincode::serialize(&TransactionHeader {
            sender: &sender,
            recipient: &recipient,
            amount,
            nonce,
            signature: &signature,
        })
        // Strings, bytes and integers into a Vec: encoding cannot fail.
        .expect("transaction header encoding is infallible");

        Self {
            id,
            sender,
            recipient,
            amount,
            nonce,
            signature,
            status: Status::Processing,
            dependencies: Vec::new(),
            bytes,
        }
    }

    /// Content address over the header fields.
    pub fn compute_id(
        sender: &str,
        recipient: &str,
        amount: u64,
        nonce: u64,
        signature: &[u8],
    ) -> TxId {
        let mut hasher = Sha256::new();
        hasher.update(b"av.tx");
        hasher.update((sender.len() as u64).to_le_bytes());
        hasher.update(sender.as_bytes());
        hasher.update((recipient.len() as u64).to_le_bytes());
        hasher.update(recipient.as_bytes());
        hasher.update(amount.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        hasher.update(signature);
        H256::from_slice(&hasher.finalize())
    }

    /// Spend input consumed by a transaction: one per (sender, nonce).
    ///
    /// Two transactions sharing a spend input are double-spend candidates.
    pub fn spend_input(sender: &str, nonce: u64) -> Hash {
        let mut hasher = Sha256::new();
        hasher.update(b"av.input");
        hasher.update((sender.len() as u64).to_le_bytes());
        hasher.update(sender.as_bytes());
        hasher.update(nonce.to_le_bytes());
        H256::from_slice(&hasher.finalize())
    }

    /// Replace the cached encoding with the caller's own bytes.
    pub fn with_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.bytes = bytes;
        self
    }

    pub fn with_dependencies(mut self, dependencies: impl IntoIterator<Item = TxId>) -> Self {
        for dependency in dependencies {
            self.add_dependency(dependency);
        }
        self
    }

    /// Append a dependency edge.
    ///
    /// Returns `false` for self-edges and edges already present.
    pub fn add_dependency(&mut self, dependency: TxId) -> bool {
        if dependency == self.id || self.dependencies.contains(&dependency) {
            return false;
        }
        self.dependencies.push(dependency);
        true
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Move to `target`, returning whether the status changed.
    pub(crate) fn transition(&mut self, target: Status) -> DagResult<bool> {
        let changed = self.status.check_transition(self.id, target)?;
        if changed {
            self.status = target;
        }
        Ok(changed)
    }
}

impl Decidable for Transaction {
    fn id(&self) -> Hash {
        self.id
    }

    fn status(&self) -> Status {
        self.status
    }

    fn accept(&mut self) -> DagResult<()> {
        self.transition(Status::Accepted).map(|_| ())
    }

    fn reject(&mut self) -> DagResult<()> {
        self.transition(Status::Rejected).map(|_| ())
    }

    fn verify(&self) -> Result<(), VerificationError> {
        if self.sender.is_empty() || self.recipient.is_empty() {
            return Err(VerificationError::InvalidSenderOrRecipient);
        }
        if self.amount == 0 {
            return Err(VerificationError::ZeroAmount);
        }
        if self.signature.is_empty() {
            return Err(VerificationError::InvalidSignature);
        }
        Ok(())
    }

    fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl TransactionLike for Transaction {
    fn dependencies(&self) -> &[TxId] {
        &self.dependencies
    }

    fn input_ids(&self) -> Vec<Hash> {
        std::iter::once(Self::spend_input(&self.sender, self.nonce))
            .chain(self.dependencies.iter().copied())
            .collect()
    }

    fn missing_dependencies(&self, lookup: &dyn StatusLookup) -> HashSet<TxId> {
        self.dependencies
            .iter()
            .filter(|id| lookup.transaction_status(id) != Some(Status::Accepted))
            .copied()
            .collect()
    }
}
