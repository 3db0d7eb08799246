//! Configuration of replay buffers.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`TrajectoryBuffer`](super::TrajectoryBuffer).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TrajectoryBufferConfig {
    /// Maximum number of stored transitions.
    pub capacity: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,
}

impl Default for TrajectoryBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 1_000_000,
            seed: 42,
        }
    }
}

impl TrajectoryBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Configuration of [`FrameBuffer`](super::FrameBuffer).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FrameBufferConfig {
    /// Maximum number of stored frames.
    pub capacity: usize,

    /// Number of frames stacked into an observation.
    pub frame_history_len: usize,

    /// Seed of the random number generator used for sampling.
    pub seed: u64,
}

impl Default for FrameBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 100_000,
            frame_history_len: 1,
            seed: 42,
        }
    }
}

impl FrameBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the number of stacked frames.
    pub fn frame_history_len(mut self, v: usize) -> Self {
        self.frame_history_len = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
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
