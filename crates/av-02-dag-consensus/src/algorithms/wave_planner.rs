//! Wave Planner
//!
//! Groups vertices into waves that can be evaluated concurrently. Heights
//! strictly increase along every parent edge, so all vertices of one height
//! are mutually independent: a wave is one height level. Waves run in
//! non-decreasing height order; inside a wave, vertices keep submission
//! order so decisions are deterministic.

use crate::domain::capabilities::VertexLike;
use crate::domain::value_objects::VertexId;
use std::collections::BTreeMap;

/// A vertex waiting for a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingVertex {
    pub id: VertexId,
    pub height: u64,
    /// Submission sequence number
    pub sequence: u64,
}

/// Vertices of one height, evaluated together.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Wave {
    pub wave_id: usize,
    pub height: u64,
    pub vertices: Vec<VertexId>,
}

impl Wave {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Plan waves for `pending`.
pub fn plan_waves(pending: &[PendingVertex]) -> Vec<Wave> {
    let mut levels: BTreeMap<u64, Vec<&PendingVertex>> = BTreeMap::new();
    for vertex in pending {
        levels.entry(vertex.height).or_default().push(vertex);
    }

    levels
        .into_iter()
        .enumerate()
        .map(|(wave_id, (height, mut level))| {
            level.sort_by_key(|v| v.sequence);
            Wave {
                wave_id,
                height,
                vertices: level.into_iter().map(|v| v.id).collect(),
            }
        })
        .collect()
}

/// Indices of `vertices` sorted by height, ties kept in input order.
///
/// Submitting in this order guarantees every in-batch parent is known
/// before its children.
pub fn submission_order<V: VertexLike>(vertices: &[V]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..vertices.len()).collect();
    order.sort_by_key(|&idx| vertices[idx].height());
    order
}
