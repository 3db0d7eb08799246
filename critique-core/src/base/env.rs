//! Environment.
use super::{Act, ActionSpace, Obs};
use crate::record::Record;
use anyhow::Result;

/// Result of [`Env::step`].
#[derive(Debug, Clone)]
pub struct Step {
    /// Observation after the action.
    pub obs: Obs,

    /// Reward of the action.
    pub reward: f32,

    /// `true` when the episode has ended.
    pub is_done: bool,

    /// Extra information from the environment.
    pub info: Record,
}

/// Represents an environment, typically an MDP.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: u64) -> Result<Self>
    where
        Self: Sized;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Obs>;

    /// Performs an environment step.
    fn step(&mut self, act: &Act) -> Result<Step>;

    /// Valid actions.
    fn action_space(&self) -> &ActionSpace;

    /// Length of observation vectors.
    fn obs_dim(&self) -> usize;
}
