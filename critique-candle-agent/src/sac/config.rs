use super::TemperatureMode;
use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use critique_core::ActionSpace;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`SacActor`](super::SacActor).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SacActorConfig {
    /// Dimension of observations.
    pub obs_dim: usize,

    /// Continuous action space the squashed actions are scaled to.
    pub action_space: ActionSpace,

    /// Hidden layer sizes.
    pub units: Vec<usize>,

    /// Optimizer of the actor.
    pub opt_config: OptimizerConfig,

    /// Temperature.
    pub temperature: TemperatureMode,

    /// Lower bound of the log standard deviation.
    pub min_log_std: f64,

    /// Upper bound of the log standard deviation.
    pub max_log_std: f64,

    /// Added inside the logarithm of the tanh correction.
    pub epsilon: f64,

    /// Device.
    pub device: Device,
}

impl Default for SacActorConfig {
    fn default() -> Self {
        Self {
            obs_dim: 1,
            action_space: ActionSpace::continuous(1, -1.0, 1.0),
            units: vec![256, 256],
            opt_config: OptimizerConfig::default(),
            temperature: TemperatureMode::default(),
            min_log_std: -20.0,
            max_log_std: 2.0,
            epsilon: 1e-6,
            device: Device::Cpu,
        }
    }
}

impl SacActorConfig {
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

    /// Sets the optimizer of the actor.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the temperature.
    pub fn temperature(mut self, v: TemperatureMode) -> Self {
        self.temperature = v;
        self
    }

    /// Sets the bounds of the log standard deviation.
    pub fn log_std_bounds(mut self, min: f64, max: f64) -> Self {
        self.min_log_std = min;
        self.max_log_std = max;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`SacActorConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SacActorConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_sac_actor_config() -> Result<()> {
        let config = SacActorConfig::default()
            .obs_dim(3)
            .action_space(ActionSpace::continuous(2, -2.0, 2.0))
            .temperature(TemperatureMode::Fixed(0.1))
            .log_std_bounds(-5.0, 2.0);

        let dir = TempDir::new("sac_actor_config")?;
        let path = dir.path().join("sac_actor_config.yaml");
        config.save(&path)?;
        let config_ = SacActorConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
