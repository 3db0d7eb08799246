//! Transitions, trajectories and batches of them.
use super::{Act, Obs};
use std::iter::FromIterator;

/// A single step of interaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    /// Observation the action was taken on.
    pub obs: Obs,

    /// Action taken.
    pub act: Act,

    /// Reward received.
    pub reward: f32,

    /// Observation after the action.
    pub next_obs: Obs,

    /// `true` on the last transition of a trajectory.
    pub terminal: bool,
}

/// Ordered transitions of one episode, possibly cut at a maximum length.
///
/// The last transition of a collected trajectory has `terminal == true`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    /// Transitions in time order.
    pub transitions: Vec<Transition>,
}

impl Trajectory {
    /// Creates an empty trajectory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a transition.
    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if there is no transition.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Rewards in time order.
    pub fn rewards(&self) -> Vec<f32> {
        self.transitions.iter().map(|t| t.reward).collect()
    }

    /// Undiscounted sum of rewards.
    pub fn total_reward(&self) -> f32 {
        self.transitions.iter().map(|t| t.reward).sum()
    }
}

impl FromIterator<Transition> for Trajectory {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        Self {
            transitions: iter.into_iter().collect(),
        }
    }
}

/// Transitions laid out column-wise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransitionBatch {
    /// Observations.
    pub obs: Vec<Obs>,

    /// Actions.
    pub act: Vec<Act>,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Next observations.
    pub next_obs: Vec<Obs>,

    /// Terminal flags.
    pub terminal: Vec<bool>,
}

impl TransitionBatch {
    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.reward.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.reward.is_empty()
    }

    /// Appends a transition.
    pub fn push(&mut self, t: Transition) {
        self.obs.push(t.obs);
        self.act.push(t.act);
        self.reward.push(t.reward);
        self.next_obs.push(t.next_obs);
        self.terminal.push(t.terminal);
    }
}

impl FromIterator<Transition> for TransitionBatch {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        let mut batch = Self::default();
        iter.into_iter().for_each(|t| batch.push(t));
        batch
    }
}

/// Whole trajectories collected under one policy snapshot.
///
/// `rewards` keeps the trajectory boundaries needed by return estimation, while
/// `transitions` holds the same data flattened in trajectory order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloutBatch {
    /// Flattened transitions.
    pub transitions: TransitionBatch,

    /// Rewards of each trajectory.
    pub rewards: Vec<Vec<f32>>,
}

impl RolloutBatch {
    /// Builds a batch from trajectories.
    pub fn from_trajectories<'a>(paths: impl IntoIterator<Item = &'a Trajectory>) -> Self {
        let mut batch = Self::default();
        for path in paths {
            batch.rewards.push(path.rewards());
            path.transitions
                .iter()
                .for_each(|t| batch.transitions.push(t.clone()));
        }
        batch
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
