use crate::{opt::OptimizerConfig, Device};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`RndModel`](super::RndModel).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RndConfig {
    /// Dimension of observations.
    pub obs_dim: usize,

    /// Hidden layer sizes of both networks.
    pub units: Vec<usize>,

    /// Dimension of the random features.
    pub out_dim: usize,

    /// Optimizer of the predictor.
    pub opt_config: OptimizerConfig,

    /// Device.
    pub device: Device,
}

impl Default for RndConfig {
    fn default() -> Self {
        Self {
            obs_dim: 1,
            units: vec![400, 400],
            out_dim: 5,
            opt_config: OptimizerConfig::Adam { lr: 1e-3 },
            device: Device::Cpu,
        }
    }
}

impl RndConfig {
    /// Sets the dimension of observations.
    pub fn obs_dim(mut self, v: usize) -> Self {
        self.obs_dim = v;
        self
    }

    /// Sets the hidden layer sizes.
    pub fn units(mut self, v: Vec<usize>) -> Self {
        self.units = v;
        self
    }

    /// Sets the dimension of the random features.
    pub fn out_dim(mut self, v: usize) -> Self {
        self.out_dim = v;
        self
    }

    /// Sets the optimizer of the predictor.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = v;
        self
    }

    /// Constructs [`RndConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RndConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
