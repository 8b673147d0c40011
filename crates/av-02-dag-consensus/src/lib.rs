//! # AV-02: DAG Consensus
//!
//! Parallel Avalanche-style consensus over a DAG of vertices, each carrying
//! an ordered list of transactions.
//!
//! ## Architecture
//!
//! - **Domain** (`domain/`): `Transaction` and `Vertex` with their shared
//!   `Processing -> Accepted | Rejected` state machine, the frontier
//!   manager, the `DagStore` (one `RwLock` over all mutable DAG state) and
//!   the quorum sampler wrapper
//! - **Algorithms** (`algorithms/`): dependency resolution, conflict
//!   detection, wave planning, decision rules
//! - **Ports** (`ports/`): `DagConsensusApi` inbound; `DagStorage`,
//!   `VoteSource`, `SignatureVerifier` outbound
//! - **Adapters** (`adapters/`): in-memory storage, local vote preference,
//!   structural signature checks
//! - **Service** (`service/`): the parallel vertex processor
//!
//! ## Decisions
//!
//! ```text
//! submit ──→ evaluate (parallel) ──→ poll quorum ──→ decision rule ──→ apply
//!              │  verify                (weighted      (majority or      │ write lock
//!              │  resolve deps           sample)        confidence)      │ persist
//!              ├─ pending ─→ retried next pass                           ↓
//!              └─ invalid / doomed ─→ reject                          frontier
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use av_02_dag_consensus::{
//!     DagConsensusApi, DagConsensusDependencies, DagConsensusService, EngineConfig,
//!     InMemoryDagStorage, LocalPreference, Participant, StructuralSignatureVerifier, Vertex,
//!     Decidable,
//! };
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let service = DagConsensusService::new(DagConsensusDependencies {
//!     storage: Arc::new(InMemoryDagStorage::new()),
//!     votes: Arc::new(LocalPreference),
//!     sig_verifier: Arc::new(StructuralSignatureVerifier::default()),
//!     participants: vec![Participant::new([1; 32], 100), Participant::new([2; 32], 50)],
//!     config: EngineConfig::default(),
//! })
//! .unwrap();
//!
//! let genesis = Vertex::genesis(0, vec![]);
//! let id = genesis.id();
//! let report = service
//!     .batch_process_vertices(vec![genesis], &CancellationToken::new())
//!     .unwrap();
//! assert_eq!(report.accepted, vec![id]);
//! assert_eq!(service.frontier(), vec![id]);
//! ```

pub mod adapters;
pub mod algorithms;
pub mod config;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryDagStorage, LocalPreference, StructuralSignatureVerifier};
pub use algorithms::{
    detect_conflicts, link_nonce_dependencies, resolve, Conflict, DecisionRule, Resolution,
};
pub use config::{DecisionConfig, DecisionKind, EngineConfig};
pub use domain::*;
pub use ports::{DagConsensusApi, DagStorage, SignatureVerifier, VoteSource};
pub use service::{DagConsensusDependencies, DagConsensusService};
