//! Policies.
use super::{Act, ActionValueFunction, Obs, Persistent};
use crate::{error::CritiqueError, record::Record};
use anyhow::Result;

/// A policy on an environment.
pub trait Policy {
    /// Samples an action given an observation.
    fn sample_action(&mut self, obs: &Obs) -> Result<Act>;

    /// Switches between stochastic (training) and deterministic (evaluation)
    /// action selection. The default ignores the mode.
    fn set_train(&mut self, train: bool) {
        let _ = train;
    }
}

/// Stochastic policy trained by the policy gradient.
pub trait PgPolicy: Policy + Persistent {
    /// Takes a gradient step raising the log-probability of `act` weighted by
    /// `advantages`.
    ///
    /// A policy carrying a value baseline also fits it to the standardized
    /// `q_values` in the same call. The returned record holds `"actor_loss"` and,
    /// with a baseline, `"baseline_loss"`.
    fn update(
        &mut self,
        obs: &[Obs],
        act: &[Act],
        advantages: &[f32],
        q_values: &[f32],
    ) -> Result<Record>;

    /// Baseline predictions in the standardized scale they were trained on, or
    /// `None` if the policy has no baseline.
    fn baseline(&self, obs: &[Obs]) -> Result<Option<Vec<f32>>>;
}

/// Reparameterizable policy with a learned temperature.
pub trait SacPolicy: Policy + Persistent {
    /// Critic the policy is trained against.
    type Critic: ActionValueFunction;

    /// Samples actions with the reparameterization trick together with their
    /// log-probabilities.
    fn sample_with_log_prob(&mut self, obs: &[Obs]) -> Result<(Vec<Act>, Vec<f32>)>;

    /// Current temperature.
    fn alpha(&self) -> Result<f32>;

    /// Minimizes `E[alpha * log_prob - min_i Q_i]` over reparameterized actions,
    /// then moves the temperature toward the target entropy.
    ///
    /// Returns the actor loss and the temperature loss.
    fn update(&mut self, obs: &[Obs], critics: &[Self::Critic]) -> Result<(f32, f32)>;
}

/// Policy trained by advantage-weighted regression.
pub trait AwacPolicy: Policy + Persistent {
    /// Probabilities of every discrete action, one row per observation.
    fn action_probs(&self, obs: &[Obs]) -> Result<Vec<Vec<f32>>> {
        let _ = obs;
        Err(CritiqueError::NotImplemented(
            "action probabilities over a continuous action space".into(),
        )
        .into())
    }

    /// Samples one action per observation.
    fn sample_actions(&mut self, obs: &[Obs]) -> Result<Vec<Act>>;

    /// Minimizes `-mean(weights * log_prob(act))` and returns the loss.
    fn update(&mut self, obs: &[Obs], act: &[Act], weights: &[f32]) -> Result<f32>;
}
