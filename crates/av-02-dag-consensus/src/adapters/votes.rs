use crate::domain::value_objects::ParticipantId;
use crate::domain::vertex::Vertex;
use crate::ports::VoteSource;

/// Votes the local node's own preference for every sampled participant.
///
/// A vertex only reaches a poll after it verified and all its dependencies
/// were accepted, so the local preference is always yes. Single-node
/// deployments and tests use this in place of network polling.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalPreference;

impl VoteSource for LocalPreference {
    fn vote(&self, _participant: &ParticipantId, _vertex: &Vertex) -> bool {
        true
    }
}
