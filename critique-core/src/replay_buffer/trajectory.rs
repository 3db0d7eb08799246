//! Replay buffer of whole trajectories.
use super::TrajectoryBufferConfig;
use crate::{
    base::{RolloutBatch, Trajectory, Transition, TransitionBatch},
    error::CritiqueError,
};
use log::trace;
use rand::{rngs::StdRng, SeedableRng};
use std::collections::VecDeque;

/// Stores trajectories as a sequence of transitions, keeping the boundaries.
///
/// Once more than `capacity` transitions are stored, the oldest transitions are
/// dropped. A trajectory whose head was dropped still serves transition
/// sampling but is no longer returned as a rollout.
pub struct TrajectoryBuffer {
    capacity: usize,
    transitions: VecDeque<Transition>,
    lengths: VecDeque<usize>,
    head_truncated: bool,
    rng: StdRng,
}

impl TrajectoryBuffer {
    /// Builds an empty buffer.
    pub fn build(config: &TrajectoryBufferConfig) -> Self {
        Self {
            capacity: config.capacity,
            transitions: VecDeque::new(),
            lengths: VecDeque::new(),
            head_truncated: false,
            rng: StdRng::seed_from_u64(config.seed),
        }
    }

    /// Number of stored transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Number of stored trajectories.
    pub fn n_trajectories(&self) -> usize {
        self.lengths.len()
    }

    /// Appends trajectories, dropping the oldest transitions over capacity.
    pub fn add_rollouts(&mut self, paths: Vec<Trajectory>) {
        for path in paths.into_iter().filter(|p| !p.is_empty()) {
            self.lengths.push_back(path.len());
            self.transitions.extend(path.transitions);
        }

        while self.transitions.len() > self.capacity {
            self.transitions.pop_front();
            match self.lengths.front_mut() {
                Some(l) if *l > 1 => {
                    *l -= 1;
                    self.head_truncated = true;
                }
                _ => {
                    self.lengths.pop_front();
                    self.head_truncated = false;
                }
            }
        }
        trace!(
            "{} transitions in {} trajectories",
            self.transitions.len(),
            self.lengths.len()
        );
    }

    /// Samples `batch_size` distinct transitions uniformly at random.
    pub fn sample_random(&mut self, batch_size: usize) -> Result<TransitionBatch, CritiqueError> {
        if batch_size > self.len() {
            return Err(CritiqueError::InsufficientSamples {
                requested: batch_size,
                available: self.len(),
            });
        }
        let n = self.len();
        let ixs = rand::seq::index::sample(&mut self.rng, n, batch_size);
        Ok(ixs
            .iter()
            .map(|ix| self.transitions[ix].clone())
            .collect())
    }

    /// The `batch_size` most recent transitions, or all of them if fewer are stored.
    pub fn sample_recent(&self, batch_size: usize) -> TransitionBatch {
        let start = self.len().saturating_sub(batch_size);
        self.transitions.range(start..).cloned().collect()
    }

    /// The most recent whole trajectories holding at least `batch_size`
    /// transitions, or all whole trajectories if fewer transitions are stored.
    ///
    /// Rewards are kept per trajectory. A trajectory whose head was evicted is
    /// never returned.
    pub fn sample_recent_rollouts(&self, batch_size: usize) -> RolloutBatch {
        let n_whole = self.lengths.len() - usize::from(self.head_truncated);
        let mut n_transitions = 0;
        let mut n_paths = 0;
        for l in self.lengths.iter().rev().take(n_whole) {
            if n_transitions >= batch_size {
                break;
            }
            n_transitions += l;
            n_paths += 1;
        }

        let start = self.len() - n_transitions;
        let transitions = self
            .transitions
            .range(start..)
            .cloned()
            .collect::<TransitionBatch>();
        let mut offset = 0;
        let rewards = self
            .lengths
            .iter()
            .skip(self.lengths.len() - n_paths)
            .map(|l| {
                let rs = transitions.reward[offset..offset + l].to_vec();
                offset += l;
                rs
            })
            .collect();

        RolloutBatch {
            transitions,
            rewards,
        }
    }
}
