use crate::{opt::OptimizerConfig, util::CriticLoss, Device};
use anyhow::Result;
use critique_core::ActionSpace;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`QNetwork`](super::QNetwork).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QNetworkConfig {
    /// Dimension of observations.
    pub obs_dim: usize,

    /// Action space. A discrete space gives one output per action, a continuous
    /// one a single output over the concatenated observation and action.
    pub action_space: ActionSpace,

    /// Hidden layer sizes.
    pub units: Vec<usize>,

    /// Optimizer.
    pub opt_config: OptimizerConfig,

    /// Regression loss.
    pub critic_loss: CriticLoss,

    /// Device.
    pub device: Device,
}

impl Default for QNetworkConfig {
    fn default() -> Self {
        Self {
            obs_dim: 1,
            action_space: ActionSpace::Discrete(2),
            units: vec![64, 64],
            opt_config: OptimizerConfig::default(),
            critic_loss: CriticLoss::Mse,
            device: Device::Cpu,
        }
    }
}

impl QNetworkConfig {
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

    /// Sets the optimizer.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the regression loss.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`QNetworkConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QNetworkConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
