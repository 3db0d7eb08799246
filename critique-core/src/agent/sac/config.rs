//! Configuration of the SAC agent.
use crate::{replay_buffer::TrajectoryBufferConfig, target::TargetSync};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Sac`](super::Sac).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SacConfig {
    /// Discount factor.
    pub gamma: f32,

    /// Synchronization of the target critics, counted in training steps.
    pub critic_target_sync: TargetSync,

    /// Critic gradient steps per training step.
    pub num_critic_updates_per_agent_update: usize,

    /// Actor gradient steps per training step in which the actor is updated.
    pub num_actor_updates_per_agent_update: usize,

    /// The actor is updated every `actor_update_frequency` training steps.
    pub actor_update_frequency: usize,

    /// Rewards are multiplied by this factor in the critic target.
    pub reward_scale: f32,

    /// Replay buffer.
    pub replay_buffer: TrajectoryBufferConfig,
}

impl Default for SacConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            critic_target_sync: TargetSync::soft(1, 0.005),
            num_critic_updates_per_agent_update: 1,
            num_actor_updates_per_agent_update: 1,
            actor_update_frequency: 1,
            reward_scale: 1.0,
            replay_buffer: TrajectoryBufferConfig::default(),
        }
    }
}

impl SacConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the synchronization of the target critics.
    pub fn critic_target_sync(mut self, v: TargetSync) -> Self {
        self.critic_target_sync = v;
        self
    }

    /// Sets the number of critic updates per training step.
    pub fn num_critic_updates_per_agent_update(mut self, v: usize) -> Self {
        self.num_critic_updates_per_agent_update = v;
        self
    }

    /// Sets the number of actor updates per training step.
    pub fn num_actor_updates_per_agent_update(mut self, v: usize) -> Self {
        self.num_actor_updates_per_agent_update = v;
        self
    }

    /// Sets the interval of actor updates.
    pub fn actor_update_frequency(mut self, v: usize) -> Self {
        self.actor_update_frequency = v;
        self
    }

    /// Sets the reward scale.
    pub fn reward_scale(mut self, v: f32) -> Self {
        self.reward_scale = v;
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
