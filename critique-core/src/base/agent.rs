//! Agent.
use super::{Env, Policy, Trajectory};
use crate::{
    record::Record,
    rollout::{sample_trajectories, CollectInfo, RolloutConfig},
};
use anyhow::Result;
use std::path::Path;

/// A trainable policy with its own experience store.
///
/// Every algorithm family implements the same capability set: data enters through
/// [`Agent::add_to_replay_buffer`] (or [`Agent::collect`], which interacts with the
/// environment), training batches come out of [`Agent::sample`], and
/// [`Agent::train`] performs one update on such a batch.
pub trait Agent<E: Env>: Policy {
    /// Batch consumed by [`Agent::train`].
    type Batch;

    /// Performs one training step and returns its scalar logs.
    fn train(&mut self, batch: Self::Batch) -> Result<Record>;

    /// Draws a training batch, or `None` while not enough data is stored.
    fn sample(&mut self, batch_size: usize) -> Result<Option<Self::Batch>>;

    /// Stores collected trajectories.
    fn add_to_replay_buffer(&mut self, paths: Vec<Trajectory>) -> Result<()>;

    /// Interacts with the environment and stores the experience.
    ///
    /// The default collects whole trajectories with the current policy until
    /// `config.min_timesteps` transitions are gathered.
    fn collect(&mut self, env: &mut E, config: &RolloutConfig) -> Result<CollectInfo> {
        let paths = sample_trajectories(
            env,
            self,
            config.min_timesteps,
            config.max_path_length,
        )?;
        let info = CollectInfo {
            env_steps: paths.iter().map(|p| p.len()).sum(),
            episode_returns: paths.iter().map(|p| p.total_reward()).collect(),
        };
        self.add_to_replay_buffer(paths)?;
        Ok(info)
    }

    /// Returns `true` in training mode, switched by [`Policy::set_train`].
    fn is_train(&self) -> bool;

    /// Saves the parameters of the agent into a directory.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Loads the parameters of the agent from a directory.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
