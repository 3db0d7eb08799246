//! A small deterministic environment and a fixed policy, used in tests.
use crate::{
    base::{Act, ActionSpace, Env, Obs, Policy, Step},
    record::Record,
};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Configuration of [`DummyEnv`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DummyEnvConfig {
    /// Length of observation vectors.
    pub obs_dim: usize,

    /// Action space.
    pub action_space: ActionSpace,

    /// Number of steps of an episode.
    pub episode_len: usize,
}

impl Default for DummyEnvConfig {
    fn default() -> Self {
        Self {
            obs_dim: 2,
            action_space: ActionSpace::Discrete(2),
            episode_len: 5,
        }
    }
}

impl DummyEnvConfig {
    /// Sets the observation dimension.
    pub fn obs_dim(mut self, v: usize) -> Self {
        self.obs_dim = v;
        self
    }

    /// Sets the action space.
    pub fn action_space(mut self, v: ActionSpace) -> Self {
        self.action_space = v;
        self
    }

    /// Sets the episode length.
    pub fn episode_len(mut self, v: usize) -> Self {
        self.episode_len = v;
        self
    }
}

/// Episodic environment whose observation encodes the elapsed time.
///
/// With a discrete action space the reward is 1 when the action equals
/// `t % n` and 0 otherwise. With a continuous one the reward is
/// `-sum((a - 0.5)^2)`. Episodes end after `episode_len` steps. The first feature
/// of each observation is `t / episode_len`; the rest is a small noise fixed at
/// reset.
pub struct DummyEnv {
    config: DummyEnvConfig,
    rng: fastrand::Rng,
    t: usize,
    noise: Vec<f32>,
}

impl DummyEnv {
    fn obs(&self) -> Obs {
        let mut obs = vec![self.t as f32 / self.config.episode_len as f32];
        obs.extend(self.noise.iter());
        obs
    }

    fn reward(&self, act: &Act) -> Result<f32> {
        match &self.config.action_space {
            ActionSpace::Discrete(n) => {
                let a = act.discrete()?;
                Ok(if a == self.t % n { 1.0 } else { 0.0 })
            }
            ActionSpace::Continuous { .. } => Ok(-act
                .continuous()?
                .iter()
                .map(|a| (a - 0.5) * (a - 0.5))
                .sum::<f32>()),
        }
    }
}

impl Env for DummyEnv {
    type Config = DummyEnvConfig;

    fn build(config: &Self::Config, seed: u64) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            rng: fastrand::Rng::with_seed(seed),
            t: 0,
            noise: vec![0.0; config.obs_dim.saturating_sub(1)],
        })
    }

    fn reset(&mut self) -> Result<Obs> {
        self.t = 0;
        let rng = &self.rng;
        self.noise
            .iter_mut()
            .for_each(|v| *v = 0.01 * (rng.f32() - 0.5));
        Ok(self.obs())
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        let reward = self.reward(act)?;
        self.t += 1;
        Ok(Step {
            obs: self.obs(),
            reward,
            is_done: self.t >= self.config.episode_len,
            info: Record::empty(),
        })
    }

    fn action_space(&self) -> &ActionSpace {
        &self.config.action_space
    }

    fn obs_dim(&self) -> usize {
        self.config.obs_dim
    }
}

/// Policy returning the same action for every observation.
pub struct FixedPolicy {
    act: Act,
}

impl FixedPolicy {
    /// Creates a policy always taking `act`.
    pub fn new(act: Act) -> Self {
        Self { act }
    }
}

impl Policy for FixedPolicy {
    fn sample_action(&mut self, _obs: &Obs) -> Result<Act> {
        Ok(self.act.clone())
    }
}
