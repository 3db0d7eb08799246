//! Configuration of the policy-gradient agent.
use crate::{estimator::ReturnEstimator, replay_buffer::TrajectoryBufferConfig};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Pg`](super::Pg).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PgConfig {
    /// Discount factor.
    pub gamma: f32,

    /// Q-value estimation from rewards.
    pub return_estimator: ReturnEstimator,

    /// `Some(lambda)` enables generalized advantage estimation, which requires a
    /// policy with a value baseline.
    pub gae_lambda: Option<f32>,

    /// Standardize advantages over the batch.
    pub standardize_advantages: bool,

    /// Replay buffer.
    pub replay_buffer: TrajectoryBufferConfig,
}

impl Default for PgConfig {
    fn default() -> Self {
        Self {
            gamma: 1.0,
            return_estimator: ReturnEstimator::RewardToGo,
            gae_lambda: None,
            standardize_advantages: true,
            replay_buffer: TrajectoryBufferConfig::default(),
        }
    }
}

impl PgConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the Q-value estimator.
    pub fn return_estimator(mut self, v: ReturnEstimator) -> Self {
        self.return_estimator = v;
        self
    }

    /// Sets lambda of generalized advantage estimation.
    pub fn gae_lambda(mut self, v: Option<f32>) -> Self {
        self.gae_lambda = v;
        self
    }

    /// Enables advantage standardization.
    pub fn standardize_advantages(mut self, v: bool) -> Self {
        self.standardize_advantages = v;
        self
    }

    /// Sets the replay buffer configuration.
    pub fn replay_buffer(mut self, v: TrajectoryBufferConfig) -> Self {
        self.replay_buffer = v;
        self
    }

    /// Loads the configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves the configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
