//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::DagResult;
use crate::domain::value_objects::{BatchReport, Outcome, Status, VertexId};
use crate::domain::vertex::Vertex;
use tokio_util::sync::CancellationToken;

/// Primary DAG consensus API.
pub trait DagConsensusApi: Send + Sync {
    /// Run one vertex through verification, dependency resolution, voting
    /// and decision.
    ///
    /// Unresolved dependencies yield `Outcome::Pending`, not an error.
    fn process_vertex(&self, vertex: Vertex, cancel: &CancellationToken) -> DagResult<Outcome>;

    /// Process a batch in parallel waves, parents before children.
    ///
    /// Returns `Cancelled` once `cancel` fires; decisions already applied
    /// stay applied.
    fn batch_process_vertices(
        &self,
        vertices: Vec<Vertex>,
        cancel: &CancellationToken,
    ) -> DagResult<BatchReport>;

    /// Current DAG tips, in submission order.
    fn frontier(&self) -> Vec<VertexId>;

    /// Known vertices at `height`, in submission order.
    fn by_height(&self, height: u64) -> Vec<VertexId>;

    /// Vertex by identifier, falling back to storage.
    fn get(&self, id: &VertexId) -> DagResult<Vertex>;

    fn status(&self, id: &VertexId) -> Option<Status>;
}
