//! Dependency Resolver
//!
//! Decides whether a vertex may go to a vote. A vertex depends on its parents
//! and on the declared dependencies of its transactions. Transactions earlier
//! in the same vertex do not count: they are accepted together, in order.

use crate::domain::capabilities::{Decidable, StatusLookup, TransactionLike, VertexLike};
use crate::domain::transaction::Transaction;
use crate::domain::value_objects::{Hash, Status};
use std::collections::{HashMap, HashSet};

/// Readiness of one vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// Every dependency is accepted
    Ready,
    /// Some dependencies are unknown or still processing
    Pending(HashSet<Hash>),
    /// A dependency was rejected, so this vertex must be rejected too
    Doomed(Hash),
}

/// Dependencies of `vertex` that are not yet accepted.
pub fn missing_dependencies<V: VertexLike + ?Sized>(
    vertex: &V,
    lookup: &dyn StatusLookup,
) -> HashSet<Hash> {
    let mut missing: HashSet<Hash> = vertex
        .parent_ids()
        .iter()
        .filter(|parent| lookup.vertex_status(parent) != Some(Status::Accepted))
        .copied()
        .collect();

    let mut earlier = HashSet::new();
    for tx in vertex.transactions() {
        missing.extend(
            tx.missing_dependencies(lookup)
                .into_iter()
                .filter(|dep| !earlier.contains(dep)),
        );
        earlier.insert(tx.id());
    }
    missing
}

/// Classify `vertex` as ready, pending or doomed.
///
/// A rejected dependency wins over any pending one.
pub fn resolve<V: VertexLike + ?Sized>(vertex: &V, lookup: &dyn StatusLookup) -> Resolution {
    for parent in vertex.parent_ids() {
        if lookup.vertex_status(parent) == Some(Status::Rejected) {
            return Resolution::Doomed(*parent);
        }
    }

    let missing = missing_dependencies(vertex, lookup);
    if missing.is_empty() {
        return Resolution::Ready;
    }

    let mut ordered: Vec<_> = missing.iter().copied().collect();
    ordered.sort();
    for dep in ordered {
        if lookup.transaction_status(&dep) == Some(Status::Rejected) {
            return Resolution::Doomed(dep);
        }
    }
    Resolution::Pending(missing)
}

/// Link each transaction to its sender's previous nonce.
///
/// Returns the number of edges added.
pub fn link_nonce_dependencies(transactions: &mut [Transaction]) -> usize {
    let mut by_sender: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, tx) in transactions.iter().enumerate() {
        by_sender.entry(tx.sender().to_string()).or_default().push(idx);
    }

    let mut added = 0;
    for indices in by_sender.values_mut() {
        indices.sort_by_key(|&idx| transactions[idx].nonce());

        for window in indices.windows(2) {
            let (prev, next) = (window[0], window[1]);
            if transactions[prev].nonce() == transactions[next].nonce() {
                continue;
            }
            let prev_id = transactions[prev].id();
            if transactions[next].add_dependency(prev_id) {
                added += 1;
            }
        }
    }
    added
}
