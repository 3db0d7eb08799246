//! Configuration of [`Trainer`](super::Trainer).
use crate::rollout::RolloutConfig;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// The number of training iterations.
    pub n_iter: usize,

    /// Experience collected per iteration.
    pub rollout: RolloutConfig,

    /// Batch size of each training step.
    pub train_batch_size: usize,

    /// Training steps per iteration.
    pub n_train_steps_per_iter: usize,

    /// Interval of evaluation in iterations, `0` disables evaluation.
    pub eval_interval: usize,

    /// Interval of flushing records in iterations.
    pub flush_interval: usize,

    /// Interval of saving parameters in iterations, `0` disables saving.
    pub save_interval: usize,

    /// Where to save parameters.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            n_iter: 0,
            rollout: RolloutConfig::default(),
            train_batch_size: 1000,
            n_train_steps_per_iter: 1,
            eval_interval: 0,
            flush_interval: 1,
            save_interval: 0,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of iterations.
    pub fn n_iter(mut self, v: usize) -> Self {
        self.n_iter = v;
        self
    }

    /// Sets the experience collected per iteration.
    pub fn rollout(mut self, v: RolloutConfig) -> Self {
        self.rollout = v;
        self
    }

    /// Sets the training batch size.
    pub fn train_batch_size(mut self, v: usize) -> Self {
        self.train_batch_size = v;
        self
    }

    /// Sets the number of training steps per iteration.
    pub fn n_train_steps_per_iter(mut self, v: usize) -> Self {
        self.n_train_steps_per_iter = v;
        self
    }

    /// Sets the interval of evaluation in iterations.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the interval of flushing records in iterations.
    pub fn flush_interval(mut self, v: usize) -> Self {
        self.flush_interval = v;
        self
    }

    /// Sets the interval of saving in iterations.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the directory where parameters are saved.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .n_iter(100)
            .eval_interval(10)
            .train_batch_size(64)
            .model_dir("some/directory");

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");
        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
