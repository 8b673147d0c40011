//! # DAG Store
//!
//! The single piece of shared mutable state in the engine: the frontier
//! manager plus a transaction index, guarded by one `RwLock`. Workers read
//! concurrently; every accept/reject is one write critical section, so a
//! decision is fully visible before any dependent vertex is evaluated.

use super::capabilities::{Decidable, StatusLookup, VertexLike};
use super::errors::{DagError, DagResult};
use super::frontier::FrontierManager;
use super::value_objects::{Status, TxId, VertexId};
use super::vertex::Vertex;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Locked contents of the store.
#[derive(Debug, Default)]
pub struct DagState {
    frontier: FrontierManager,
    /// tx id -> (containing vertex, position in that vertex)
    tx_index: HashMap<TxId, (VertexId, usize)>,
}

impl DagState {
    pub fn frontier_manager(&self) -> &FrontierManager {
        &self.frontier
    }

    /// Vertex containing `tx`.
    pub fn containing_vertex(&self, tx: &TxId) -> Option<VertexId> {
        self.tx_index.get(tx).map(|(vertex, _)| *vertex)
    }
}

impl DagState {
    fn insert(&mut self, vertex: Vertex) -> DagResult<()> {
        let id = vertex.id();
        let tx_ids = vertex.transaction_ids();
        self.frontier.submit(vertex)?;
        for (position, tx) in tx_ids.into_iter().enumerate() {
            self.tx_index.entry(tx).or_insert((id, position));
        }
        Ok(())
    }
}

impl StatusLookup for DagState {
    fn transaction_status(&self, id: &TxId) -> Option<Status> {
        let (vertex, position) = self.tx_index.get(id)?;
        self.frontier
            .get(vertex)
            .ok()
            .and_then(|v| v.transactions().get(*position))
            .map(|tx| tx.status())
    }

    fn vertex_status(&self, id: &VertexId) -> Option<Status> {
        self.frontier.status_of(id)
    }
}

/// What one decision changed.
#[derive(Clone, Debug)]
pub struct DecisionRecord {
    /// Snapshot of the vertex after the decision
    pub vertex: Vertex,
    /// Transactions whose status changed, in vertex order
    pub transactions: Vec<TxId>,
    /// False when the vertex already had the target status
    pub changed: bool,
}

#[derive(Debug, Default)]
pub struct DagStore {
    state: RwLock<DagState>,
}

impl DagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a vertex.
    ///
    /// A transaction may be carried by at most one vertex; a second vertex
    /// carrying a known transaction fails with `DuplicateTransaction`.
    pub fn submit(&self, vertex: Vertex) -> DagResult<()> {
        let mut state = self.state.write();
        if state.frontier.contains(&vertex.id()) {
            return Err(DagError::DuplicateVertex(vertex.id()));
        }
        for tx in vertex.transactions() {
            if let Some(existing) = state.containing_vertex(&tx.id()) {
                return Err(DagError::DuplicateTransaction {
                    tx: tx.id(),
                    vertex: existing,
                });
            }
        }
        state.insert(vertex)
    }

    /// Record a batch, all or nothing.
    ///
    /// `vertices` must be ordered parents first. Every member is checked
    /// (parents, height, transaction ownership) under the write lock before
    /// the first one is recorded, so a failing batch leaves the store as it
    /// was. Members already known are skipped. Returns the batch ids in
    /// order, without repeats.
    pub fn submit_all(&self, vertices: Vec<Vertex>) -> DagResult<Vec<VertexId>> {
        let mut state = self.state.write();

        let declared: HashMap<VertexId, u64> =
            vertices.iter().map(|v| (v.id(), v.height())).collect();
        let mut seen = HashSet::with_capacity(vertices.len());
        let mut claimed: HashMap<TxId, VertexId> = HashMap::new();
        let mut ids = Vec::with_capacity(vertices.len());
        let mut fresh = Vec::with_capacity(vertices.len());

        for vertex in vertices {
            let id = vertex.id();
            if !seen.insert(id) {
                continue;
            }
            ids.push(id);
            if state.frontier.contains(&id) {
                continue;
            }

            let mut expected = 0;
            for parent in vertex.parent_ids() {
                let height = match declared.get(parent) {
                    Some(height) => *height,
                    None => state
                        .frontier
                        .get(parent)
                        .map_err(|_| DagError::ParentNotFound {
                            vertex: id,
                            parent: *parent,
                        })?
                        .height(),
                };
                expected = expected.max(height + 1);
            }
            if vertex.height() != expected {
                return Err(DagError::InvalidHeight {
                    vertex: id,
                    expected,
                    actual: vertex.height(),
                });
            }

            for tx in vertex.transactions() {
                let tx_id = tx.id();
                let owner = state
                    .containing_vertex(&tx_id)
                    .or_else(|| claimed.get(&tx_id).copied().filter(|owner| *owner != id));
                if let Some(owner) = owner {
                    return Err(DagError::DuplicateTransaction {
                        tx: tx_id,
                        vertex: owner,
                    });
                }
                claimed.insert(tx_id, id);
            }
            fresh.push(vertex);
        }

        for vertex in fresh {
            state.insert(vertex)?;
        }
        Ok(ids)
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.state.read().frontier.contains(id)
    }

    /// Clone of the vertex.
    pub fn get(&self, id: &VertexId) -> DagResult<Vertex> {
        self.state.read().frontier.get(id).cloned()
    }

    pub fn status(&self, id: &VertexId) -> Option<Status> {
        self.state.read().frontier.status_of(id)
    }

    pub fn transaction_status(&self, id: &TxId) -> Option<Status> {
        self.state.read().transaction_status(id)
    }

    pub fn frontier(&self) -> Vec<VertexId> {
        self.state.read().frontier.frontier()
    }

    pub fn by_height(&self, height: u64) -> Vec<VertexId> {
        self.state.read().frontier.by_height(height)
    }

    pub fn height_of(&self, id: &VertexId) -> DagResult<u64> {
        self.state.read().frontier.get(id).map(|v| v.height())
    }

    pub fn len(&self) -> usize {
        self.state.read().frontier.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `f` against a vertex and a status view under the read lock.
    pub fn with_vertex<R>(
        &self,
        id: &VertexId,
        f: impl FnOnce(&Vertex, &dyn StatusLookup) -> R,
    ) -> DagResult<R> {
        let state = self.state.read();
        let vertex = state.frontier.get(id)?;
        Ok(f(vertex, &*state))
    }

    /// Run `f` against the whole state under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&DagState) -> R) -> R {
        f(&*self.state.read())
    }

    /// Accept `id` and its transactions, in one write critical section.
    pub fn accept(&self, id: &VertexId) -> DagResult<DecisionRecord> {
        self.decide(id, Status::Accepted)
    }

    /// Reject `id` and its transactions, in one write critical section.
    pub fn reject(&self, id: &VertexId) -> DagResult<DecisionRecord> {
        self.decide(id, Status::Rejected)
    }

    /// A vertex decided earlier keeps its status: the record carries that
    /// status with `changed == false`, whichever target was asked for.
    fn decide(&self, id: &VertexId, target: Status) -> DagResult<DecisionRecord> {
        let mut state = self.state.write();
        let vertex = state.frontier.get_mut(id)?;
        if vertex.status().is_terminal() {
            return Ok(DecisionRecord {
                vertex: vertex.clone(),
                transactions: Vec::new(),
                changed: false,
            });
        }
        let transactions = match target {
            Status::Accepted => vertex.accept_in_order()?,
            Status::Rejected => vertex.reject_all()?,
            Status::Processing => {
                return Err(DagError::InvalidStateTransition {
                    id: *id,
                    from: vertex.status(),
                    to: target,
                })
            }
        };
        let snapshot = vertex.clone();

        if target == Status::Rejected {
            state.frontier.mark_rejected(id)?;
        }

        Ok(DecisionRecord {
            vertex: snapshot,
            transactions,
            changed: true,
        })
    }
}
