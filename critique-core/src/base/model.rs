//! Value functions and novelty models.
use super::{Act, Obs};
use crate::{error::CritiqueError, target::SyncMode};
use anyhow::Result;
use std::path::Path;

/// Parameters that can be written to and read from a file.
pub trait Persistent {
    /// Saves parameters to `path`.
    fn save(&self, path: &Path) -> Result<()>;

    /// Loads parameters from `path`.
    fn load(&mut self, path: &Path) -> Result<()>;
}

/// Action-value function with a target copy.
///
/// The target copy is never trained by gradient; it only follows the live
/// network through [`ActionValueFunction::sync_target`].
pub trait ActionValueFunction: Persistent {
    /// `Q(s, a)` of the live network.
    fn q_values(&self, obs: &[Obs], act: &[Act]) -> Result<Vec<f32>>;

    /// `Q(s, a)` of the target network.
    fn target_q_values(&self, obs: &[Obs], act: &[Act]) -> Result<Vec<f32>>;

    /// `Q(s, a)` for every discrete action `a`, one row per observation.
    ///
    /// Only available for discrete action spaces.
    fn all_q_values(&self, obs: &[Obs], target: bool) -> Result<Vec<Vec<f32>>> {
        let _ = (obs, target);
        Err(CritiqueError::NotImplemented(
            "action values over a continuous action space".into(),
        )
        .into())
    }

    /// Regresses `Q(s, a)` of the live network toward `target` with one gradient
    /// step and returns the loss.
    fn fit(&mut self, obs: &[Obs], act: &[Act], target: &[f32]) -> Result<f32>;

    /// Moves the target network toward the live network.
    fn sync_target(&mut self, mode: &SyncMode) -> Result<()>;
}

/// Model giving a novelty bonus for observations, e.g. random network distillation.
pub trait NoveltyModel: Persistent {
    /// Unnormalized novelty of each observation.
    fn bonus(&self, obs: &[Obs]) -> Result<Vec<f32>>;

    /// Trains the model on the observations and returns the loss.
    fn update(&mut self, obs: &[Obs]) -> Result<f32>;
}
