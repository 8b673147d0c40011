//! # Sampler Integration
//!
//! Statistical checks of the av-01 samplers through their ports, and of the
//! quorum built on top of them.

#[cfg(test)]
mod tests {
    use av_01_sampling::{
        LazyUniformSampler, SamplingError, UniformSamplerApi, WeightedHeapSampler,
        WeightedSamplerApi,
    };
    use av_02_dag_consensus::{Participant, Quorum, SamplingMode};
    use std::collections::HashSet;

    #[test]
    fn test_single_draw_frequency_tracks_weight() {
        let weights = [10u64, 20, 30, 40];
        let total: u64 = weights.iter().sum();
        let mut sampler = WeightedHeapSampler::new();
        sampler.set_seed(2024);
        sampler.initialize(&weights).unwrap();

        let trials = 40_000;
        let mut hits = [0usize; 4];
        for _ in 0..trials {
            hits[sampler.sample(1).unwrap()[0]] += 1;
        }

        for (idx, &weight) in weights.iter().enumerate() {
            let expected = weight as f64 / total as f64;
            let observed = hits[idx] as f64 / trials as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "index {idx}: observed {observed:.3}, expected {expected:.3}"
            );
        }
    }

    #[test]
    fn test_weighted_sample_all_three() {
        let mut sampler = WeightedHeapSampler::new();
        sampler.initialize(&[10, 20, 30]).unwrap();

        let drawn: HashSet<_> = sampler.sample(3).unwrap().into_iter().collect();

        assert_eq!(drawn, HashSet::from([0, 1, 2]));
        assert!(matches!(
            sampler.sample(4),
            Err(SamplingError::OutOfRange { requested: 4, available: 3 })
        ));
    }

    #[test]
    fn test_uniform_drain_is_permutation() {
        let mut sampler = LazyUniformSampler::new();
        sampler.set_seed(99);
        sampler.initialize(1_000).unwrap();

        let mut drawn = sampler.sample(600).unwrap();
        drawn.extend(sampler.sample(400).unwrap());
        drawn.sort_unstable();

        assert_eq!(drawn, (0..1_000).collect::<Vec<u64>>());
        assert!(sampler.sample(1).is_err());

        sampler.reset();
        assert_eq!(sampler.remaining(), 1_000);
    }

    #[test]
    fn test_quorum_removal_shifts_draws() {
        let participants = (0..5u8)
            .map(|i| Participant::new([i; 32], 1_000))
            .collect();
        let mut quorum = Quorum::new(participants, SamplingMode::StakeWeighted).unwrap();
        quorum.set_seed(17);
        quorum.remove(&[0; 32]).unwrap();
        quorum.update_weight(&[1; 32], 0).unwrap();

        for _ in 0..50 {
            let drawn = quorum.draw(5).unwrap();
            assert_eq!(drawn.len(), 3);
            assert!(!drawn.contains(&0));
            assert!(!drawn.contains(&1));
        }
    }
}
