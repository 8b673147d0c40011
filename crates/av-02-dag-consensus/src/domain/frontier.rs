//! # DAG Frontier Manager
//!
//! Owns every known vertex and maintains:
//!
//! - the frontier (DAG tips), in submission order
//! - a height index, each level in submission order
//! - reverse (child) edges
//!
//! Callers submit parents before children. Topological order is a
//! precondition here, not something this type reconstructs.

use super::capabilities::{Decidable, VertexLike};
use super::errors::{DagError, DagResult};
use super::value_objects::{Status, VertexId};
use super::vertex::Vertex;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct FrontierManager {
    vertices: HashMap<VertexId, Vertex>,
    /// Submission sequence number of each vertex
    sequence: HashMap<VertexId, u64>,
    next_sequence: u64,
    by_height: BTreeMap<u64, Vec<VertexId>>,
    children: HashMap<VertexId, Vec<VertexId>>,
    /// sequence -> id, so iteration follows submission order
    tips: BTreeMap<u64, VertexId>,
}

impl FrontierManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `vertex` and make it a tip in place of its parents.
    pub fn submit(&mut self, vertex: Vertex) -> DagResult<()> {
        let id = vertex.id();
        if self.vertices.contains_key(&id) {
            return Err(DagError::DuplicateVertex(id));
        }

        let mut expected_height = 0;
        for parent in vertex.parent_ids() {
            let parent_vertex = self
                .vertices
                .get(parent)
                .ok_or(DagError::ParentNotFound {
                    vertex: id,
                    parent: *parent,
                })?;
            expected_height = expected_height.max(parent_vertex.height() + 1);
        }
        if vertex.height() != expected_height {
            return Err(DagError::InvalidHeight {
                vertex: id,
                expected: expected_height,
                actual: vertex.height(),
            });
        }

        for parent in vertex.parent_ids() {
            if let Some(seq) = self.sequence.get(parent) {
                self.tips.remove(seq);
            }
            self.children.entry(*parent).or_default().push(id);
        }

        let seq = self.next_sequence;
        self.next_sequence += 1;
        self.sequence.insert(id, seq);
        self.by_height.entry(vertex.height()).or_default().push(id);
        if !vertex.status().is_rejected() {
            self.tips.insert(seq, id);
        }
        self.vertices.insert(id, vertex);
        Ok(())
    }

    /// Current tips, in submission order.
    pub fn frontier(&self) -> Vec<VertexId> {
        self.tips.values().copied().collect()
    }

    /// All known vertices at `height`, in submission order.
    pub fn by_height(&self, height: u64) -> Vec<VertexId> {
        self.by_height.get(&height).cloned().unwrap_or_default()
    }

    pub fn get(&self, id: &VertexId) -> DagResult<&Vertex> {
        self.vertices.get(id).ok_or(DagError::NotFound(*id))
    }

    pub(crate) fn get_mut(&mut self, id: &VertexId) -> DagResult<&mut Vertex> {
        self.vertices.get_mut(id).ok_or(DagError::NotFound(*id))
    }

    pub fn contains(&self, id: &VertexId) -> bool {
        self.vertices.contains_key(id)
    }

    pub fn is_tip(&self, id: &VertexId) -> bool {
        self.sequence
            .get(id)
            .is_some_and(|seq| self.tips.contains_key(seq))
    }

    pub fn children(&self, id: &VertexId) -> &[VertexId] {
        self.children.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Submission sequence number of `id`.
    pub fn sequence_of(&self, id: &VertexId) -> Option<u64> {
        self.sequence.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn max_height(&self) -> Option<u64> {
        self.by_height.keys().next_back().copied()
    }

    /// Drop a rejected vertex from the tips.
    ///
    /// Each live parent left without a live child becomes a tip again, so the
    /// frontier never collapses because of a rejected branch.
    pub(crate) fn mark_rejected(&mut self, id: &VertexId) -> DagResult<()> {
        let parents = self.get(id)?.parent_ids().to_vec();
        if let Some(seq) = self.sequence.get(id) {
            self.tips.remove(seq);
        }

        for parent in parents {
            if self.status_of(&parent) == Some(Status::Rejected) {
                continue;
            }
            let has_live_child = self
                .children(&parent)
                .iter()
                .any(|child| self.status_of(child) != Some(Status::Rejected));
            if !has_live_child {
                if let Some(&seq) = self.sequence.get(&parent) {
                    self.tips.insert(seq, parent);
                }
            }
        }
        Ok(())
    }

    pub fn status_of(&self, id: &VertexId) -> Option<Status> {
        self.vertices.get(id).map(|v| v.status())
    }
}
