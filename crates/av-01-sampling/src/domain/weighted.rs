//! # Weighted Heap Sampler
//!
//! Stake-weighted sampling without replacement.
//!
//! ## Algorithm: Exponential Race
//!
//! Every eligible element `i` with weight `w_i` receives the priority
//! `-ln(U_i) / w_i` with `U_i ~ Uniform(0, 1]`. The element holding the
//! minimum priority wins a draw. Repeatedly taking the minimum yields exactly
//! the distribution of sequential weight-proportional sampling without
//! replacement (the min-key form of Efraimidis–Spirakis `U^(1/w)`).
//!
//! Elements live in a flat arena. A binary min-heap of arena indices plus a
//! reverse position table gives:
//!
//! - O(n) `initialize` and `reset` (bottom-up heapify)
//! - O(log n) per draw (winner is pushed to `+inf` and sifted down)
//! - O(log n) `update` / `remove` (percolate at the affected slot only)
//!
//! Zero-weight and removed elements carry `+inf` and are never drawn.

use super::error::{SamplingError, SamplingResult};
use super::rng::SamplerRng;
use crate::ports::inbound::WeightedSamplerApi;
use std::cmp::Ordering;
use tracing::trace;

/// One arena slot.
#[derive(Clone, Debug)]
struct Element {
    /// Original index in the initialization sequence
    index: usize,
    weight: u64,
    priority: f64,
    /// Already drawn in the current round
    drawn: bool,
    removed: bool,
}

impl Element {
    fn is_eligible(&self) -> bool {
        !self.removed && self.weight > 0
    }
}

/// Weighted sampler backed by a binary min-heap over priorities.
#[derive(Debug, Clone)]
pub struct WeightedHeapSampler {
    elements: Vec<Element>,
    /// Min-heap of arena indices keyed by `elements[i].priority`
    heap: Vec<usize>,
    /// `position[i]` is the heap slot holding arena index `i`
    position: Vec<usize>,
    total_weight: u64,
    eligible: usize,
    rng: SamplerRng,
}

impl WeightedHeapSampler {
    /// Create an empty sampler seeded from entropy.
    pub fn new() -> Self {
        Self::with_rng(SamplerRng::from_entropy())
    }

    /// Create an empty sampler in deterministic mode.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(SamplerRng::seeded(seed))
    }

    fn with_rng(rng: SamplerRng) -> Self {
        Self {
            elements: Vec::new(),
            heap: Vec::new(),
            position: Vec::new(),
            total_weight: 0,
            eligible: 0,
            rng,
        }
    }

    /// Population size including removed elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Whether `index` has been removed.
    pub fn is_removed(&self, index: usize) -> SamplingResult<bool> {
        self.element(index).map(|e| e.removed)
    }

    fn element(&self, index: usize) -> SamplingResult<&Element> {
        self.elements.get(index).ok_or(SamplingError::IndexOutOfRange {
            index,
            len: self.elements.len(),
        })
    }

    fn live_element(&self, index: usize) -> SamplingResult<&Element> {
        let element = self.element(index)?;
        if element.removed {
            return Err(SamplingError::ElementRemoved(index));
        }
        Ok(element)
    }

    fn fresh_priority(rng: &mut SamplerRng, element: &Element) -> f64 {
        if !element.is_eligible() || element.drawn {
            return f64::INFINITY;
        }
        -rng.open_unit().ln() / element.weight as f64
    }

    // === HEAP PRIMITIVES ===

    fn less(&self, a: usize, b: usize) -> bool {
        let ea = &self.elements[self.heap[a]];
        let eb = &self.elements[self.heap[b]];
        match ea.priority.total_cmp(&eb.priority) {
            Ordering::Less => true,
            Ordering::Greater => false,
            // Ties resolve by original index so seeded runs are reproducible
            Ordering::Equal => ea.index < eb.index,
        }
    }

    fn swap_slots(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.position[self.heap[a]] = a;
        self.position[self.heap[b]] = b;
    }

    fn sift_up(&mut self, mut slot: usize) -> usize {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap_slots(slot, parent);
            slot = parent;
        }
        slot
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;

            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                return;
            }
            self.swap_slots(slot, smallest);
            slot = smallest;
        }
    }

    /// Restore heap order around one changed slot.
    fn rebalance(&mut self, arena_index: usize) {
        let slot = self.sift_up(self.position[arena_index]);
        self.sift_down(slot);
    }

    fn heapify(&mut self) {
        for slot in (0..self.heap.len() / 2).rev() {
            self.sift_down(slot);
        }
    }

    #[cfg(test)]
    fn heap_is_valid(&self) -> bool {
        (1..self.heap.len()).all(|slot| !self.less(slot, (slot - 1) / 2))
            && self
                .heap
                .iter()
                .enumerate()
                .all(|(slot, &arena)| self.position[arena] == slot)
    }
}

impl Default for WeightedHeapSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightedSamplerApi for WeightedHeapSampler {
    fn initialize(&mut self, weights: &[u64]) -> SamplingResult<()> {
        if weights.is_empty() {
            return Err(SamplingError::NoEligibleSamples);
        }

        let mut total: u64 = 0;
        for &weight in weights {
            total = total
                .checked_add(weight)
                .ok_or(SamplingError::WeightOverflow)?;
        }

        let mut elements = Vec::with_capacity(weights.len());
        for (index, &weight) in weights.iter().enumerate() {
            let mut element = Element {
                index,
                weight,
                priority: f64::INFINITY,
                drawn: false,
                removed: false,
            };
            element.priority = Self::fresh_priority(&mut self.rng, &element);
            elements.push(element);
        }

        self.eligible = elements.iter().filter(|e| e.is_eligible()).count();
        self.elements = elements;
        self.heap = (0..weights.len()).collect();
        self.position = (0..weights.len()).collect();
        self.total_weight = total;
        self.heapify();

        trace!(
            population = weights.len(),
            eligible = self.eligible,
            total_weight = total,
            "Weighted sampler initialized"
        );
        Ok(())
    }

    fn sample(&mut self, k: usize) -> SamplingResult<Vec<usize>> {
        if k > self.eligible {
            return Err(SamplingError::OutOfRange {
                requested: k,
                available: self.eligible,
            });
        }

        let mut drawn = Vec::with_capacity(k);
        for _ in 0..k {
            let top = self.heap[0];
            if !self.elements[top].priority.is_finite() {
                // Eligible count and heap contents disagree
                self.reset();
                return Err(SamplingError::NoEligibleSamples);
            }

            let element = &mut self.elements[top];
            element.drawn = true;
            element.priority = f64::INFINITY;
            drawn.push(element.index);
            self.sift_down(0);
        }

        self.reset();
        Ok(drawn)
    }

    fn update(&mut self, index: usize, weight: u64) -> SamplingResult<u64> {
        let old = self.live_element(index)?.weight;
        let total = (self.total_weight - old)
            .checked_add(weight)
            .ok_or(SamplingError::WeightOverflow)?;

        self.total_weight = total;
        match (old > 0, weight > 0) {
            (false, true) => self.eligible += 1,
            (true, false) => self.eligible -= 1,
            _ => {}
        }

        let element = &mut self.elements[index];
        element.weight = weight;
        element.priority = Self::fresh_priority(&mut self.rng, element);
        self.rebalance(index);

        Ok(old)
    }

    fn remove(&mut self, index: usize) -> SamplingResult<()> {
        let weight = self.live_element(index)?.weight;

        self.total_weight -= weight;
        if weight > 0 {
            self.eligible -= 1;
        }

        let element = &mut self.elements[index];
        element.removed = true;
        element.priority = f64::INFINITY;
        self.rebalance(index);

        Ok(())
    }

    fn reset(&mut self) {
        for element in &mut self.elements {
            element.drawn = false;
            element.priority = Self::fresh_priority(&mut self.rng, element);
        }
        self.heapify();
    }

    fn set_seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
        self.reset();
    }

    fn eligible(&self) -> usize {
        self.eligible
    }

    fn total_weight(&self) -> u64 {
        self.total_weight
    }

    fn weight(&self, index: usize) -> SamplingResult<u64> {
        self.element(index).map(|e| e.weight)
    }
}
