//! DAG Consensus Service - Parallel Vertex Processor
//!
//! # Pipeline
//!
//! Each vertex goes through two phases:
//!
//! 1. **Evaluate** (parallel, read lock): verification, signature checks and
//!    dependency resolution. Pure reads of the store.
//! 2. **Decide** (serialized): quorum polls, the decision rule, then one
//!    write critical section applying the verdict, then persistence.
//!
//! A batch is recorded in the store all or nothing, then split into height
//! waves. Vertices of one height never depend on each other through parent
//! edges, so a whole wave is evaluated on the worker pool at once; its
//! decisions are applied in submission order before the next wave starts.
//! Vertices still waiting on dependencies are retried on the next pass,
//! never blocked on.

use crate::algorithms::decision::{rule_from_config, DecisionRule};
use crate::algorithms::dependency_resolver::{resolve, Resolution};
use crate::algorithms::wave_planner::{plan_waves, submission_order, PendingVertex};
use crate::config::EngineConfig;
use crate::domain::capabilities::{Decidable, VertexLike};
use crate::domain::errors::{DagError, DagResult, VerificationError};
use crate::domain::quorum::{Participant, Quorum};
use crate::domain::store::{DagStore, DecisionRecord};
use crate::domain::value_objects::{
    BatchReport, Decision, Hash, Outcome, ParticipantId, RejectReason, Status, TxId, VertexId,
};
use crate::domain::vertex::Vertex;
use crate::metrics;
use crate::ports::{DagConsensusApi, DagStorage, SignatureVerifier, VoteSource};
use parking_lot::Mutex;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};


/// Result of the evaluate phase for one vertex.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Evaluation {
    /// Already decided before this call
    Terminal(Status),
    /// Verification failed
    Invalid(String),
    /// A dependency was rejected
    Doomed(Hash),
    Pending(usize),
    Ready,
}

/// Outcome plus whether this call changed anything.
struct Verdict {
    outcome: Outcome,
    changed: bool,
}

/// Dependencies for DagConsensusService
pub struct DagConsensusDependencies<S, V, G> {
    pub storage: Arc<S>,
    pub votes: Arc<V>,
    pub sig_verifier: Arc<G>,
    pub participants: Vec<Participant>,
    pub config: EngineConfig,
}

pub struct DagConsensusService<S, V, G>
where
    S: DagStorage,
    V: VoteSource,
    G: SignatureVerifier,
{
    store: DagStore,
    quorum: Mutex<Quorum>,
    rule: Box<dyn DecisionRule>,
    storage: Arc<S>,
    votes: Arc<V>,
    sig_verifier: Arc<G>,
    pool: rayon::ThreadPool,
    config: EngineConfig,
}

impl<S, V, G> DagConsensusService<S, V, G>
where
    S: DagStorage,
    V: VoteSource,
    G: SignatureVerifier,
{
    pub fn new(deps: DagConsensusDependencies<S, V, G>) -> DagResult<Self> {
        deps.config.validate()?;

        let mut quorum = Quorum::new(deps.participants, deps.config.sampling_mode)?;
        if let Some(seed) = deps.config.seed {
            quorum.set_seed(seed);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(deps.config.max_parallelism)
            .thread_name(|idx| format!("dag-worker-{idx}"))
            .build()
            .map_err(|e| DagError::ThreadPool(e.to_string()))?;

        info!(
            participants = quorum.len(),
            total_weight = quorum.total_weight(),
            max_parallelism = deps.config.max_parallelism,
            sampling_mode = ?deps.config.sampling_mode,
            "DAG consensus engine started"
        );

        Ok(Self {
            store: DagStore::new(),
            quorum: Mutex::new(quorum),
            rule: rule_from_config(&deps.config.decision),
            storage: deps.storage,
            votes: deps.votes,
            sig_verifier: deps.sig_verifier,
            pool,
            config: deps.config,
        })
    }

    /// Replace the decision rule built from the config.
    pub fn with_decision_rule(mut self, rule: Box<dyn DecisionRule>) -> Self {
        self.rule = rule;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transaction_status(&self, id: &TxId) -> Option<Status> {
        self.store.transaction_status(id)
    }

    pub fn update_weight(&self, participant: &ParticipantId, weight: u64) -> DagResult<u64> {
        self.quorum.lock().update_weight(participant, weight)
    }

    pub fn remove_participant(&self, participant: &ParticipantId) -> DagResult<()> {
        self.quorum.lock().remove(participant)
    }

    /// Make committee draws reproducible.
    pub fn set_seed(&self, seed: u64) {
        self.quorum.lock().set_seed(seed);
    }

    fn evaluate(&self, id: &VertexId) -> DagResult<Evaluation> {
        self.store.with_vertex(id, |vertex, lookup| {
            if vertex.status().is_terminal() {
                return Evaluation::Terminal(vertex.status());
            }
            if let Err(e) = vertex.verify() {
                return Evaluation::Invalid(e.to_string());
            }
            for tx in vertex.transactions() {
                if let Err(e) = self.sig_verifier.verify(tx) {
                    let err = VerificationError::InvalidTransaction {
                        tx: tx.id(),
                        source: Box::new(e),
                    };
                    return Evaluation::Invalid(err.to_string());
                }
            }
            match resolve(vertex, lookup) {
                Resolution::Ready => Evaluation::Ready,
                Resolution::Pending(missing) => Evaluation::Pending(missing.len()),
                Resolution::Doomed(dependency) => Evaluation::Doomed(dependency),
            }
        })
    }

    fn decide(&self, id: &VertexId, evaluation: Evaluation) -> DagResult<Verdict> {
        let started = Instant::now();
        let verdict = match evaluation {
            Evaluation::Terminal(Status::Rejected) => Verdict {
                outcome: Outcome::Rejected(RejectReason::Previously),
                changed: false,
            },
            Evaluation::Terminal(_) => Verdict {
                outcome: Outcome::Accepted,
                changed: false,
            },
            Evaluation::Pending(missing) => Verdict {
                outcome: Outcome::Pending { missing },
                changed: false,
            },
            Evaluation::Invalid(reason) => {
                warn!(vertex = ?id, %reason, "Vertex failed verification");
                self.apply(id, Decision::Reject, RejectReason::Invalid(reason))?
            }
            Evaluation::Doomed(dependency) => {
                debug!(vertex = ?id, dependency = ?dependency, "Dependency rejected");
                self.apply(id, Decision::Reject, RejectReason::RejectedDependency(dependency))?
            }
            Evaluation::Ready => {
                let decision = self.poll(id)?;
                self.apply(id, decision, RejectReason::Voted)?
            }
        };
        if verdict.changed {
            metrics::record_decision_latency(started.elapsed().as_secs_f64());
        }
        Ok(verdict)
    }

    /// Run the rule's rounds against fresh committees.
    fn poll(&self, id: &VertexId) -> DagResult<Decision> {
        let vertex = self.store.get(id)?;
        let rounds = self.rule.rounds();
        let mut polls = Vec::with_capacity(rounds);
        {
            let mut quorum = self.quorum.lock();
            for _ in 0..rounds {
                let poll = quorum.poll(self.config.sample_size, |participant| {
                    self.votes.vote(participant, &vertex)
                })?;
                polls.push(poll);
            }
        }

        let decision = self.rule.decide(&polls);
        debug!(
            vertex = ?id,
            rule = self.rule.name(),
            rounds,
            yes_weight = polls.last().map_or(0, |p| p.yes_weight),
            sampled_weight = polls.last().map_or(0, |p| p.sampled_weight),
            ?decision,
            "Polled quorum"
        );
        Ok(decision)
    }

    fn apply(&self, id: &VertexId, decision: Decision, reason: RejectReason) -> DagResult<Verdict> {
        let record = match decision {
            Decision::Accept => self.store.accept(id)?,
            Decision::Reject => self.store.reject(id)?,
        };
        if record.changed {
            self.persist(&record)?;
        }

        let outcome = match (record.vertex.status(), record.changed) {
            (Status::Accepted, changed) => {
                if changed {
                    metrics::record_vertex_accepted();
                }
                Outcome::Accepted
            }
            (Status::Rejected, true) => {
                metrics::record_vertex_rejected(reason.label());
                Outcome::Rejected(reason)
            }
            (Status::Rejected, false) => Outcome::Rejected(RejectReason::Previously),
            (Status::Processing, _) => {
                return Err(DagError::InvalidStateTransition {
                    id: *id,
                    from: Status::Processing,
                    to: decision.status(),
                })
            }
        };
        if !record.changed && record.vertex.status() != decision.status() {
            debug!(
                vertex = ?id,
                ?decision,
                status = %record.vertex.status(),
                "Vertex already decided by another caller"
            );
        }
        debug!(
            vertex = ?id,
            height = record.vertex.height(),
            transactions = record.transactions.len(),
            status = %record.vertex.status(),
            "Vertex decided"
        );
        Ok(Verdict {
            outcome,
            changed: record.changed,
        })
    }

    fn persist(&self, record: &DecisionRecord) -> DagResult<()> {
        for tx in record.vertex.transactions() {
            self.storage.put_transaction(tx)?;
        }
        self.storage.put_vertex(&record.vertex)?;
        Ok(())
    }

    fn pending_vertices(&self, ids: &[VertexId]) -> Vec<PendingVertex> {
        self.store.read(|state| {
            let dag = state.frontier_manager();
            ids.iter()
                .filter_map(|id| {
                    Some(PendingVertex {
                        id: *id,
                        height: dag.get(id).ok()?.height(),
                        sequence: dag.sequence_of(id)?,
                    })
                })
                .collect()
        })
    }

    fn record_verdict(report: &mut BatchReport, id: VertexId, verdict: Verdict) -> bool {
        if !verdict.changed {
            return false;
        }
        match verdict.outcome {
            Outcome::Accepted => report.accepted.push(id),
            Outcome::Rejected(reason) => report.rejected.push((id, reason)),
            Outcome::Pending { .. } => return false,
        }
        true
    }
}

impl<S, V, G> DagConsensusApi for DagConsensusService<S, V, G>
where
    S: DagStorage,
    V: VoteSource,
    G: SignatureVerifier,
{
    fn process_vertex(&self, vertex: Vertex, cancel: &CancellationToken) -> DagResult<Outcome> {
        if cancel.is_cancelled() {
            return Err(DagError::Cancelled);
        }

        let id = vertex.id();
        match self.store.submit(vertex) {
            Ok(()) | Err(DagError::DuplicateVertex(_)) => {}
            Err(e) => return Err(e),
        }

        let evaluation = self.evaluate(&id)?;
        let verdict = self.decide(&id, evaluation)?;
        Ok(verdict.outcome)
    }

    fn batch_process_vertices(
        &self,
        vertices: Vec<Vertex>,
        cancel: &CancellationToken,
    ) -> DagResult<BatchReport> {
        if cancel.is_cancelled() {
            return Err(DagError::Cancelled);
        }

        let started = Instant::now();
        let batch_size = vertices.len();
        let order = submission_order(&vertices);
        let mut slots: Vec<Option<Vertex>> = vertices.into_iter().map(Some).collect();
        let ordered: Vec<Vertex> = order.into_iter().filter_map(|idx| slots[idx].take()).collect();
        let mut pending = self.store.submit_all(ordered)?;

        info!(vertices = batch_size, "Processing vertex batch");

        let mut report = BatchReport::default();
        while report.passes < self.config.max_passes && !pending.is_empty() {
            report.passes += 1;
            let mut progressed = false;
            let mut still_pending = Vec::new();

            for wave in plan_waves(&self.pending_vertices(&pending)) {
                if cancel.is_cancelled() {
                    info!(passes = report.passes, decided = report.decided(), "Batch cancelled");
                    return Err(DagError::Cancelled);
                }
                report.waves += 1;
                metrics::record_wave();

                let evaluations: Vec<(VertexId, Option<DagResult<Evaluation>>)> =
                    self.pool.install(|| {
                        wave.vertices
                            .par_iter()
                            .map(|id| {
                                if cancel.is_cancelled() {
                                    return (*id, None);
                                }
                                (*id, Some(self.evaluate(id)))
                            })
                            .collect()
                    });

                for (id, evaluation) in evaluations {
                    let Some(evaluation) = evaluation else {
                        still_pending.push(id);
                        continue;
                    };
                    let verdict = self.decide(&id, evaluation?)?;
                    if matches!(verdict.outcome, Outcome::Pending { .. }) {
                        still_pending.push(id);
                    }
                    progressed |= Self::record_verdict(&mut report, id, verdict);
                }

                debug!(
                    wave = wave.wave_id,
                    height = wave.height,
                    size = wave.len(),
                    "Wave complete"
                );
            }

            if cancel.is_cancelled() {
                info!(passes = report.passes, decided = report.decided(), "Batch cancelled");
                return Err(DagError::Cancelled);
            }

            pending = still_pending;
            if !progressed {
                break;
            }
        }
        report.pending = pending;

        info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            pending = report.pending.len(),
            waves = report.waves,
            passes = report.passes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Vertex batch complete"
        );
        Ok(report)
    }

    fn frontier(&self) -> Vec<VertexId> {
        self.store.frontier()
    }

    fn by_height(&self, height: u64) -> Vec<VertexId> {
        self.store.by_height(height)
    }

    fn get(&self, id: &VertexId) -> DagResult<Vertex> {
        match self.store.get(id) {
            Err(DagError::NotFound(_)) => self
                .storage
                .get_vertex(id)?
                .ok_or(DagError::NotFound(*id)),
            other => other,
        }
    }

    fn status(&self, id: &VertexId) -> Option<Status> {
        self.store.status(id)
    }
}
