//! Ports module for DAG Consensus
//!
//! Defines inbound (API) and outbound (SPI) port traits.

pub mod inbound;
pub mod outbound;

pub use inbound::DagConsensusApi;
pub use outbound::{DagStorage, SignatureVerifier, VoteSource};
