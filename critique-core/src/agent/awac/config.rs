//! Configuration of the AWAC agent.
use crate::{
    replay_buffer::FrameBufferConfig,
    schedule::Schedule,
    target::{AwacWeighting, TargetSync},
};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Awac`](super::Awac).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AwacConfig {
    /// Discount factor of both critics.
    pub gamma: f32,

    /// Temperature of the advantage weights.
    pub awac_lambda: f32,

    /// How advantages are turned into weights.
    pub weighting: AwacWeighting,

    /// Number of sampled actions in the value estimate over a continuous action
    /// space.
    pub n_value_samples: usize,

    /// Probability of a uniformly random action during collection.
    pub eps: f32,

    /// Actions are random and no update is made before this many environment steps.
    pub learning_starts: usize,

    /// Updates are made every `learning_freq` environment steps.
    pub learning_freq: usize,

    /// Synchronization of the target critics, counted in parameter updates.
    pub target_sync: TargetSync,

    /// Greedy collection follows the exploration critic for this many
    /// environment steps and the exploitation critic afterwards.
    pub num_exploration_steps: usize,

    /// Stop storing transitions after `num_exploration_steps`.
    pub offline_exploitation: bool,

    /// Weight of the novelty bonus in the exploration critic's reward.
    pub explore_weight: Schedule,

    /// Weight of the environment reward in the exploration critic's reward.
    pub exploit_weight: Schedule,

    /// Shift of the exploitation critic's reward.
    pub exploit_rew_shift: f32,

    /// Scale of the exploitation critic's reward, applied after the shift.
    pub exploit_rew_scale: f32,

    /// Select next actions with the live critic and evaluate them with the target.
    pub double_q: bool,

    /// Normalize the novelty bonus by a running standard deviation.
    pub normalize_bonus: bool,

    /// Decay of the running standard deviation of the novelty bonus.
    pub bonus_std_decay: f32,

    /// Frame buffer.
    pub replay_buffer: FrameBufferConfig,

    /// Seed of epsilon-greedy exploration.
    pub seed: u64,
}

impl Default for AwacConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            awac_lambda: 1.0,
            weighting: AwacWeighting::default(),
            n_value_samples: 10,
            eps: 0.2,
            learning_starts: 2000,
            learning_freq: 1,
            target_sync: TargetSync::hard(3000),
            num_exploration_steps: 10000,
            offline_exploitation: false,
            explore_weight: Schedule::Constant(1.0),
            exploit_weight: Schedule::Constant(0.0),
            exploit_rew_shift: 0.0,
            exploit_rew_scale: 1.0,
            double_q: true,
            normalize_bonus: true,
            bonus_std_decay: 0.99,
            replay_buffer: FrameBufferConfig::default(),
            seed: 42,
        }
    }
}

impl AwacConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the temperature of the advantage weights.
    pub fn awac_lambda(mut self, v: f32) -> Self {
        self.awac_lambda = v;
        self
    }

    /// Sets the weighting of advantages.
    pub fn weighting(mut self, v: AwacWeighting) -> Self {
        self.weighting = v;
        self
    }

    /// Sets the number of sampled actions of the continuous value estimate.
    pub fn n_value_samples(mut self, v: usize) -> Self {
        self.n_value_samples = v;
        self
    }

    /// Sets the probability of random actions.
    pub fn eps(mut self, v: f32) -> Self {
        self.eps = v;
        self
    }

    /// Sets the number of environment steps before learning starts.
    pub fn learning_starts(mut self, v: usize) -> Self {
        self.learning_starts = v;
        self
    }

    /// Sets the interval of updates in environment steps.
    pub fn learning_freq(mut self, v: usize) -> Self {
        self.learning_freq = v;
        self
    }

    /// Sets the synchronization of the target critics.
    pub fn target_sync(mut self, v: TargetSync) -> Self {
        self.target_sync = v;
        self
    }

    /// Sets the length of the exploration phase.
    pub fn num_exploration_steps(mut self, v: usize) -> Self {
        self.num_exploration_steps = v;
        self
    }

    /// Stops storing transitions after the exploration phase.
    pub fn offline_exploitation(mut self, v: bool) -> Self {
        self.offline_exploitation = v;
        self
    }

    /// Sets the schedule of the bonus weight.
    pub fn explore_weight(mut self, v: Schedule) -> Self {
        self.explore_weight = v;
        self
    }

    /// Sets the schedule of the environment reward weight.
    pub fn exploit_weight(mut self, v: Schedule) -> Self {
        self.exploit_weight = v;
        self
    }

    /// Sets the shift of the exploitation reward.
    pub fn exploit_rew_shift(mut self, v: f32) -> Self {
        self.exploit_rew_shift = v;
        self
    }

    /// Sets the scale of the exploitation reward.
    pub fn exploit_rew_scale(mut self, v: f32) -> Self {
        self.exploit_rew_scale = v;
        self
    }

    /// Enables double Q-learning targets.
    pub fn double_q(mut self, v: bool) -> Self {
        self.double_q = v;
        self
    }

    /// Enables normalization of the novelty bonus.
    pub fn normalize_bonus(mut self, v: bool) -> Self {
        self.normalize_bonus = v;
        self
    }

    /// Sets the decay of the running standard deviation of the novelty bonus.
    pub fn bonus_std_decay(mut self, v: f32) -> Self {
        self.bonus_std_decay = v;
        self
    }

    /// Sets the frame buffer configuration.
    pub fn replay_buffer(mut self, v: FrameBufferConfig) -> Self {
        self.replay_buffer = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
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
