//! # Integration Test Flows
//!
//! End-to-end vertex processing through `DagConsensusApi`, with real
//! samplers from av-01-sampling and the default adapters.
//!
//! ## Flows Tested:
//!
//! 1. **Genesis → child**: sequential processing extends the frontier
//! 2. **Out-of-order batch**: parents decided before children
//! 3. **Rejection cascade**: a rejected vertex dooms its descendants
//! 4. **Cancellation**: a fired token stops the batch between waves
//! 5. **Wide DAG**: many same-height vertices evaluated on the worker pool

#[cfg(test)]
mod tests {
    use crate::init_tracing;
    use av_02_dag_consensus::{
        link_nonce_dependencies, DagConsensusApi, DagConsensusDependencies, DagConsensusService,
        DagError, DagStorage, Decidable, DecisionConfig, DecisionKind, EngineConfig,
        InMemoryDagStorage, LocalPreference, Outcome, Participant, ParticipantId, RejectReason,
        SamplingMode, Status, StructuralSignatureVerifier, Transaction, TransactionLike,
        VerificationError, Vertex, VertexId, VertexLike, VoteSource,
    };
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    type Engine<V> = DagConsensusService<InMemoryDagStorage, V, StructuralSignatureVerifier>;

    fn validators(count: u8) -> Vec<Participant> {
        (1..=count)
            .map(|i| Participant::new([i; 32], 100 * u64::from(i)))
            .collect()
    }

    fn engine_with<V: VoteSource>(votes: Arc<V>, config: EngineConfig) -> (Engine<V>, Arc<InMemoryDagStorage>) {
        init_tracing();
        let storage = Arc::new(InMemoryDagStorage::new());
        let engine = DagConsensusService::new(DagConsensusDependencies {
            storage: Arc::clone(&storage),
            votes,
            sig_verifier: Arc::new(StructuralSignatureVerifier::default()),
            participants: validators(10),
            config,
        })
        .expect("engine should start");
        (engine, storage)
    }

    fn engine() -> (Engine<LocalPreference>, Arc<InMemoryDagStorage>) {
        engine_with(
            Arc::new(LocalPreference),
            EngineConfig {
                seed: Some(7),
                ..Default::default()
            },
        )
    }

    fn transfer(sender: &str, nonce: u64) -> Transaction {
        Transaction::new(sender, "merchant", 25, nonce, vec![0x5A; 64])
    }

    /// Votes no on a vertex once it is listed; counts every vote cast.
    #[derive(Default)]
    struct Referendum {
        against: Mutex<HashSet<VertexId>>,
        cast: Mutex<usize>,
    }

    impl VoteSource for Referendum {
        fn vote(&self, _participant: &ParticipantId, vertex: &Vertex) -> bool {
            *self.cast.lock() += 1;
            !self.against.lock().contains(&vertex.id())
        }
    }

    // =============================================================================
    // SEQUENTIAL PROCESSING
    // =============================================================================

    #[test]
    fn test_genesis_then_v1_extends_frontier() {
        let (engine, storage) = engine();
        let token = CancellationToken::new();

        let genesis = Vertex::genesis(1_000, vec![transfer("alice", 0)]);
        let v1 = Vertex::child_of(&[&genesis], 2_000, vec![transfer("alice", 1)]);
        let (genesis_id, v1_id) = (genesis.id(), v1.id());

        assert_eq!(engine.process_vertex(genesis, &token).unwrap(), Outcome::Accepted);
        assert_eq!(engine.process_vertex(v1, &token).unwrap(), Outcome::Accepted);

        assert_eq!(engine.status(&v1_id), Some(Status::Accepted));
        assert_eq!(engine.get(&v1_id).unwrap().height(), 1);
        assert_eq!(engine.frontier(), vec![v1_id]);
        assert_eq!(engine.by_height(0), vec![genesis_id]);
        assert_eq!(storage.vertex_count(), 2);

        let persisted = storage.get_vertex(&v1_id).unwrap().unwrap();
        assert!(persisted
            .transactions()
            .iter()
            .all(|tx| tx.status() == Status::Accepted));
    }

    #[test]
    fn test_vertex_merging_two_tips() {
        let (engine, _) = engine();
        let token = CancellationToken::new();

        let genesis = Vertex::genesis(0, vec![]);
        let a = Vertex::child_of(&[&genesis], 1, vec![transfer("alice", 0)]);
        let b = Vertex::child_of(&[&genesis], 2, vec![transfer("bob", 0)]);
        let v = Vertex::child_of(&[&a, &b], 3, vec![]);
        let (a_id, b_id, v_id) = (a.id(), b.id(), v.id());

        for vertex in [genesis, a, b] {
            engine.process_vertex(vertex, &token).unwrap();
        }
        assert_eq!(engine.frontier(), vec![a_id, b_id]);

        engine.process_vertex(v, &token).unwrap();

        let frontier = engine.frontier();
        assert!(frontier.contains(&v_id));
        assert!(!frontier.contains(&a_id));
        assert!(!frontier.contains(&b_id));
    }

    #[test]
    fn test_empty_sender_rejected_with_reason() {
        let (engine, _) = engine();
        let bad = Transaction::new("", "merchant", 25, 0, vec![1; 64]);
        assert_eq!(bad.verify(), Err(VerificationError::InvalidSenderOrRecipient));

        let genesis = Vertex::genesis(0, vec![bad]);
        let id = genesis.id();

        let outcome = engine
            .process_vertex(genesis, &CancellationToken::new())
            .unwrap();

        assert!(matches!(outcome, Outcome::Rejected(RejectReason::Invalid(_))));
        assert_eq!(engine.status(&id), Some(Status::Rejected));
    }

    #[test]
    fn test_unknown_parent_is_an_error() {
        let (engine, _) = engine();
        let genesis = Vertex::genesis(0, vec![]);
        let orphan = Vertex::child_of(&[&genesis], 1, vec![]);

        let err = engine
            .process_vertex(orphan, &CancellationToken::new())
            .unwrap_err();

        assert!(matches!(err, DagError::ParentNotFound { parent, .. } if parent == genesis.id()));
    }

    // =============================================================================
    // BATCH PROCESSING
    // =============================================================================

    #[test]
    fn test_batch_child_before_parent() {
        let (engine, _) = engine();
        let genesis = Vertex::genesis(0, vec![]);
        let parent = Vertex::child_of(&[&genesis], 1, vec![transfer("alice", 0)]);
        let child = Vertex::child_of(&[&parent], 2, vec![transfer("alice", 1)]);
        let (parent_id, child_id) = (parent.id(), child.id());

        let report = engine
            .batch_process_vertices(vec![child, parent, genesis.clone()], &CancellationToken::new())
            .unwrap();

        assert_eq!(report.accepted, vec![genesis.id(), parent_id, child_id]);
        assert!(report.rejected.is_empty());
        assert!(report.pending.is_empty());
        assert_eq!(engine.frontier(), vec![child_id]);
    }

    #[test]
    fn test_nonce_chain_across_vertices() {
        let (engine, _) = engine();
        let mut txs: Vec<_> = (0..4).map(|nonce| transfer("alice", nonce)).collect();
        assert_eq!(link_nonce_dependencies(&mut txs), 3);
        let tx_ids: Vec<_> = txs.iter().map(|tx| tx.id()).collect();
        assert_eq!(txs[3].dependencies(), &[tx_ids[2]]);

        let genesis = Vertex::genesis(0, txs[..2].to_vec());
        let next = Vertex::child_of(&[&genesis], 1, txs[2..].to_vec());

        let report = engine
            .batch_process_vertices(vec![next, genesis], &CancellationToken::new())
            .unwrap();

        assert_eq!(report.decided(), 2);
        for id in tx_ids {
            assert_eq!(engine.transaction_status(&id), Some(Status::Accepted));
        }
    }

    #[test]
    fn test_rejection_cascade() {
        let votes = Arc::new(Referendum::default());
        let genesis = Vertex::genesis(0, vec![]);
        let good = Vertex::child_of(&[&genesis], 1, vec![transfer("alice", 0)]);
        let bad = Vertex::child_of(&[&genesis], 2, vec![transfer("mallory", 0)]);
        let tainted = Vertex::child_of(&[&good, &bad], 3, vec![]);
        let descendant = Vertex::child_of(&[&tainted], 4, vec![]);
        votes.against.lock().insert(bad.id());

        let (engine, _) = engine_with(
            Arc::clone(&votes),
            EngineConfig {
                seed: Some(3),
                ..Default::default()
            },
        );
        let ids = [genesis.id(), good.id(), bad.id(), tainted.id(), descendant.id()];

        let report = engine
            .batch_process_vertices(
                vec![descendant, tainted, bad, good, genesis],
                &CancellationToken::new(),
            )
            .unwrap();

        assert_eq!(report.accepted, vec![ids[0], ids[1]]);
        assert_eq!(
            report.rejected,
            vec![
                (ids[2], RejectReason::Voted),
                (ids[3], RejectReason::RejectedDependency(ids[2])),
                (ids[4], RejectReason::RejectedDependency(ids[3])),
            ]
        );
        // good lost its only live child, so it is a tip again
        assert_eq!(engine.frontier(), vec![ids[1]]);
    }

    #[test]
    fn test_confidence_rule_polls_beta_rounds() {
        let config = EngineConfig {
            sample_size: 4,
            decision: DecisionConfig {
                kind: DecisionKind::Confidence,
                alpha_percent: 80,
                beta: 3,
            },
            seed: Some(9),
            ..Default::default()
        };
        let votes = Arc::new(Referendum::default());
        let (engine, _) = engine_with(Arc::clone(&votes), config);

        let outcome = engine
            .process_vertex(Vertex::genesis(0, vec![]), &CancellationToken::new())
            .unwrap();

        assert_eq!(outcome, Outcome::Accepted);
        // three rounds of four sampled validators each
        assert_eq!(*votes.cast.lock(), 12);
    }

    #[test]
    fn test_uniform_sampling_mode() {
        let config = EngineConfig {
            sampling_mode: SamplingMode::Uniform,
            sample_size: 3,
            seed: Some(5),
            ..Default::default()
        };
        let (engine, _) = engine_with(Arc::new(LocalPreference), config);
        let genesis = Vertex::genesis(0, vec![]);
        let child = Vertex::child_of(&[&genesis], 1, vec![]);

        let report = engine
            .batch_process_vertices(vec![genesis, child], &CancellationToken::new())
            .unwrap();

        assert_eq!(report.accepted.len(), 2);
    }

    #[test]
    fn test_cancelled_batch_returns_cancelled() {
        let (engine, _) = engine();
        let token = CancellationToken::new();
        token.cancel();
        let genesis = Vertex::genesis(0, vec![]);

        let err = engine
            .batch_process_vertices(vec![genesis.clone()], &token)
            .unwrap_err();

        assert!(matches!(err, DagError::Cancelled));
        assert_eq!(engine.status(&genesis.id()), None);
    }

    #[test]
    fn test_cancel_from_vote_source_stops_after_current_wave() {
        struct CancelOnFirstVote(CancellationToken);

        impl VoteSource for CancelOnFirstVote {
            fn vote(&self, _participant: &ParticipantId, _vertex: &Vertex) -> bool {
                self.0.cancel();
                true
            }
        }

        let token = CancellationToken::new();
        let (engine, _) = engine_with(
            Arc::new(CancelOnFirstVote(token.clone())),
            EngineConfig {
                seed: Some(1),
                ..Default::default()
            },
        );
        let genesis = Vertex::genesis(0, vec![]);
        let child = Vertex::child_of(&[&genesis], 1, vec![]);
        let (genesis_id, child_id) = (genesis.id(), child.id());

        let err = engine
            .batch_process_vertices(vec![genesis, child], &token)
            .unwrap_err();

        assert!(err.is_cancelled());
        // the in-flight wave was applied, the next one never started
        assert_eq!(engine.status(&genesis_id), Some(Status::Accepted));
        assert_eq!(engine.status(&child_id), Some(Status::Processing));
    }

    #[test]
    fn test_wide_dag_on_worker_pool() {
        let (engine, storage) = engine_with(
            Arc::new(LocalPreference),
            EngineConfig {
                max_parallelism: 4,
                seed: Some(21),
                ..Default::default()
            },
        );
        let genesis = Vertex::genesis(0, vec![]);
        let layer: Vec<Vertex> = (0..64)
            .map(|i| {
                Vertex::child_of(
                    &[&genesis],
                    i + 1,
                    vec![transfer(&format!("sender-{i}"), 0)],
                )
            })
            .collect();
        let refs: Vec<&Vertex> = layer.iter().collect();
        let merge = Vertex::child_of(&refs, 100, vec![]);
        let merge_id = merge.id();

        let mut batch = vec![merge, genesis];
        batch.extend(layer);
        let report = engine
            .batch_process_vertices(batch, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.accepted.len(), 66);
        assert_eq!(report.waves, 3);
        assert_eq!(engine.frontier(), vec![merge_id]);
        assert_eq!(storage.transaction_count(), 64);
    }
}
