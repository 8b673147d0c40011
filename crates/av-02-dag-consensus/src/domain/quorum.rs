//! Quorum sampling
//!
//! The participant set and the samplers that draw voting committees from it.
//! In stake-weighted mode a participant is drawn with probability
//! proportional to its weight; in uniform mode every live participant is
//! equally likely and counts as one vote.

use super::errors::{DagError, DagResult};
use super::value_objects::ParticipantId;
use av_01_sampling::{
    LazyUniformSampler, SamplingError, UniformSamplerApi, WeightedHeapSampler, WeightedSamplerApi,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How committees are drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    #[default]
    StakeWeighted,
    Uniform,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub weight: u64,
}

impl Participant {
    pub fn new(id: ParticipantId, weight: u64) -> Self {
        Self { id, weight }
    }
}

/// One voting round.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Poll {
    pub sample: Vec<ParticipantId>,
    pub yes: usize,
    pub yes_weight: u64,
    pub sampled_weight: u64,
}

impl Poll {
    /// Whether the yes share reaches `alpha_percent` of the sampled weight.
    pub fn succeeded(&self, alpha_percent: u8) -> bool {
        if self.sampled_weight == 0 {
            return false;
        }
        u128::from(self.yes_weight) * 100
            >= u128::from(alpha_percent) * u128::from(self.sampled_weight)
    }
}

pub struct Quorum {
    participants: Vec<Participant>,
    removed: Vec<bool>,
    index: HashMap<ParticipantId, usize>,
    mode: SamplingMode,
    weighted: Box<dyn WeightedSamplerApi>,
    uniform: Box<dyn UniformSamplerApi>,
    /// Live participant indices drawn from in uniform mode
    live: Vec<usize>,
}

impl std::fmt::Debug for Quorum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Quorum")
            .field("participants", &self.participants.len())
            .field("mode", &self.mode)
            .field("eligible", &self.eligible())
            .finish()
    }
}

impl Quorum {
    pub fn new(participants: Vec<Participant>, mode: SamplingMode) -> DagResult<Self> {
        Self::with_samplers(
            participants,
            mode,
            Box::new(WeightedHeapSampler::new()),
            Box::new(LazyUniformSampler::new()),
        )
    }

    pub fn with_samplers(
        participants: Vec<Participant>,
        mode: SamplingMode,
        mut weighted: Box<dyn WeightedSamplerApi>,
        uniform: Box<dyn UniformSamplerApi>,
    ) -> DagResult<Self> {
        let mut index = HashMap::with_capacity(participants.len());
        for (idx, participant) in participants.iter().enumerate() {
            if index.insert(participant.id, idx).is_some() {
                return Err(DagError::InvalidConfig(format!(
                    "duplicate participant {:?}",
                    participant.id
                )));
            }
        }

        let weights: Vec<u64> = participants.iter().map(|p| p.weight).collect();
        weighted.initialize(&weights)?;

        let mut quorum = Self {
            removed: vec![false; participants.len()],
            participants,
            index,
            mode,
            weighted,
            uniform,
            live: Vec::new(),
        };
        quorum.rebuild_live()?;
        Ok(quorum)
    }

    pub fn mode(&self) -> SamplingMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Participants that can currently be drawn.
    pub fn eligible(&self) -> usize {
        match self.mode {
            SamplingMode::StakeWeighted => self.weighted.eligible(),
            SamplingMode::Uniform => self.live.len(),
        }
    }

    pub fn total_weight(&self) -> u64 {
        self.weighted.total_weight()
    }

    pub fn weight_of(&self, id: &ParticipantId) -> DagResult<u64> {
        let idx = self.position(id)?;
        Ok(self.participants[idx].weight)
    }

    /// Draw a committee of up to `k` distinct participants.
    ///
    /// `k` is capped at the eligible population; an empty population fails
    /// with `NoEligibleSamples`.
    pub fn draw(&mut self, k: usize) -> DagResult<Vec<usize>> {
        let available = self.eligible();
        if available == 0 {
            return Err(SamplingError::NoEligibleSamples.into());
        }
        let k = k.min(available);

        match self.mode {
            SamplingMode::StakeWeighted => Ok(self.weighted.sample(k)?),
            SamplingMode::Uniform => {
                let positions = self.uniform.sample(k);
                self.uniform.reset();
                Ok(positions?
                    .into_iter()
                    .map(|pos| self.live[pos as usize])
                    .collect())
            }
        }
    }

    /// Draw a committee and tally its votes.
    pub fn poll(&mut self, k: usize, mut vote: impl FnMut(&ParticipantId) -> bool) -> DagResult<Poll> {
        let drawn = self.draw(k)?;
        let mut poll = Poll {
            sample: Vec::with_capacity(drawn.len()),
            ..Poll::default()
        };

        for idx in drawn {
            let participant = &self.participants[idx];
            let weight = match self.mode {
                SamplingMode::StakeWeighted => participant.weight,
                SamplingMode::Uniform => 1,
            };
            poll.sampled_weight = poll.sampled_weight.saturating_add(weight);
            if vote(&participant.id) {
                poll.yes += 1;
                poll.yes_weight = poll.yes_weight.saturating_add(weight);
            }
            poll.sample.push(participant.id);
        }
        Ok(poll)
    }

    /// Change a participant's stake, returning the previous one.
    pub fn update_weight(&mut self, id: &ParticipantId, weight: u64) -> DagResult<u64> {
        let idx = self.position(id)?;
        let old = self.weighted.update(idx, weight)?;
        self.participants[idx].weight = weight;
        self.rebuild_live()?;
        Ok(old)
    }

    pub fn remove(&mut self, id: &ParticipantId) -> DagResult<()> {
        let idx = self.position(id)?;
        self.weighted.remove(idx)?;
        self.removed[idx] = true;
        self.rebuild_live()
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.weighted.set_seed(seed);
        self.uniform.set_seed(seed);
    }

    fn position(&self, id: &ParticipantId) -> DagResult<usize> {
        match self.index.get(id) {
            Some(&idx) if !self.removed[idx] => Ok(idx),
            _ => Err(DagError::UnknownParticipant(*id)),
        }
    }

    fn rebuild_live(&mut self) -> DagResult<()> {
        self.live = (0..self.participants.len())
            .filter(|&idx| !self.removed[idx] && self.participants[idx].weight > 0)
            .collect();
        if !self.live.is_empty() {
            self.uniform.initialize(self.live.len() as u64)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn pid(val: u8) -> ParticipantId {
        [val; 32]
    }

    fn quorum(weights: &[u64], mode: SamplingMode) -> Quorum {
        let participants = weights
            .iter()
            .enumerate()
            .map(|(i, &w)| Participant::new(pid(i as u8), w))
            .collect();
        let mut quorum = Quorum::new(participants, mode).unwrap();
        quorum.set_seed(11);
        quorum
    }

    #[test]
    fn test_draw_is_capped_at_population() {
        let mut q = quorum(&[10, 20, 30], SamplingMode::StakeWeighted);

        let drawn = q.draw(20).unwrap();

        assert_eq!(drawn.iter().copied().collect::<HashSet<_>>(), HashSet::from([0, 1, 2]));
    }

    #[test]
    fn test_empty_participant_set_fails() {
        let err = Quorum::new(vec![], SamplingMode::StakeWeighted).unwrap_err();
        assert!(matches!(err, DagError::Sampling(SamplingError::NoEligibleSamples)));
    }

    #[test]
    fn test_duplicate_participant_fails() {
        let participants = vec![Participant::new(pid(1), 1), Participant::new(pid(1), 2)];
        assert!(matches!(
            Quorum::new(participants, SamplingMode::StakeWeighted),
            Err(DagError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_all_removed_fails_draw() {
        let mut q = quorum(&[5], SamplingMode::StakeWeighted);
        q.remove(&pid(0)).unwrap();

        assert!(matches!(
            q.draw(1),
            Err(DagError::Sampling(SamplingError::NoEligibleSamples))
        ));
    }

    #[test]
    fn test_poll_tallies_weight() {
        let mut q = quorum(&[10, 30], SamplingMode::StakeWeighted);

        let poll = q.poll(2, |id| *id == pid(1)).unwrap();

        assert_eq!(poll.sample.len(), 2);
        assert_eq!(poll.yes, 1);
        assert_eq!(poll.yes_weight, 30);
        assert_eq!(poll.sampled_weight, 40);
        assert!(poll.succeeded(67));
        assert!(poll.succeeded(75));
        assert!(!poll.succeeded(76));
    }

    #[test]
    fn test_uniform_mode_counts_heads() {
        let mut q = quorum(&[1, 1000, 0], SamplingMode::Uniform);

        let poll = q.poll(5, |id| *id == pid(0)).unwrap();

        // zero-weight participant is not live
        assert_eq!(poll.sample.len(), 2);
        assert_eq!(poll.yes_weight, 1);
        assert_eq!(poll.sampled_weight, 2);
    }

    #[test]
    fn test_uniform_draws_are_independent_rounds() {
        let mut q = quorum(&[1, 1, 1], SamplingMode::Uniform);

        for _ in 0..5 {
            assert_eq!(q.draw(3).unwrap().len(), 3);
        }
    }

    #[test]
    fn test_update_weight_returns_old() {
        let mut q = quorum(&[10, 20], SamplingMode::StakeWeighted);

        assert_eq!(q.update_weight(&pid(1), 50).unwrap(), 20);
        assert_eq!(q.weight_of(&pid(1)).unwrap(), 50);
        assert_eq!(q.total_weight(), 60);
    }

    #[test]
    fn test_unknown_participant() {
        let mut q = quorum(&[10], SamplingMode::StakeWeighted);

        assert!(matches!(
            q.update_weight(&pid(9), 1),
            Err(DagError::UnknownParticipant(_))
        ));
        q.remove(&pid(0)).unwrap();
        assert!(matches!(q.remove(&pid(0)), Err(DagError::UnknownParticipant(_))));
    }

    #[test]
    fn test_seeded_draws_repeat() {
        let mut a = quorum(&[1, 2, 3, 4, 5, 6], SamplingMode::StakeWeighted);
        let mut b = quorum(&[1, 2, 3, 4, 5, 6], SamplingMode::StakeWeighted);

        assert_eq!(a.draw(3).unwrap(), b.draw(3).unwrap());
    }
}
