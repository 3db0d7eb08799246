use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use critique_core::ActionSpace;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`MlpPolicy`](super::MlpPolicy).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct MlpPolicyConfig {
    /// Dimension of observations.
    pub obs_dim: usize,

    /// Action space. A discrete space gives a categorical policy, a continuous
    /// one a diagonal Gaussian policy with a learned log standard deviation.
    pub action_space: ActionSpace,

    /// Hidden layer sizes of the policy and of the baseline.
    pub units: Vec<usize>,

    /// Adds a state-value baseline trained on standardized Q-values.
    pub nn_baseline: bool,

    /// Optimizer of the policy.
    pub opt_config: OptimizerConfig,

    /// Optimizer of the baseline.
    pub baseline_opt_config: OptimizerConfig,

    /// Seed of categorical sampling.
    pub seed: u64,

    /// Device.
    pub device: Device,
}

impl Default for MlpPolicyConfig {
    fn default() -> Self {
        Self {
            obs_dim: 1,
            action_space: ActionSpace::Discrete(2),
            units: vec![64, 64],
            nn_baseline: false,
            opt_config: OptimizerConfig::Adam { lr: 5e-3 },
            baseline_opt_config: OptimizerConfig::Adam { lr: 5e-3 },
            seed: 42,
            device: Device::Cpu,
        }
    }
}

impl MlpPolicyConfig {
    /// Sets the dimension of observations.
    pub fn obs_dim(mut self, v: usize) -> Self {
        self.obs_dim = v;
        self
    }

    /// Sets the action space.
    pub fn action_space(mut self, v: ActionSpace) -> Self {
        self.action_space = v;
        self
    }

    /// Sets the hidden layer sizes.
    pub fn units(mut self, v: Vec<usize>) -> Self {
        self.units = v;
        self
    }

    /// Enables the value baseline.
    pub fn nn_baseline(mut self, v: bool) -> Self {
        self.nn_baseline = v;
        self
    }

    /// Sets the optimizer of the policy.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the optimizer of the baseline.
    pub fn baseline_opt_config(mut self, v: OptimizerConfig) -> Self {
        self.baseline_opt_config = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`MlpPolicyConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`MlpPolicyConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
