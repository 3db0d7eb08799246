//! Regression targets, advantage weights and target-network synchronization.
//!
//! Functions in this module work on flattened batches and fail with
//! [`CritiqueError::ShapeMismatch`] when their inputs are not aligned.
use crate::error::{check_len, CritiqueError};
use serde::{Deserialize, Serialize};

/// How a target network follows its live network.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum SyncMode {
    /// Copy the live parameters.
    Hard,

    /// `theta_tgt <- tau * theta + (1 - tau) * theta_tgt`.
    Soft {
        /// Interpolation factor.
        tau: f64,
    },
}

/// Schedule of target-network synchronization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct TargetSync {
    /// Synchronize every `interval` steps.
    pub interval: usize,

    /// How to synchronize.
    pub mode: SyncMode,
}

impl Default for TargetSync {
    fn default() -> Self {
        Self {
            interval: 1,
            mode: SyncMode::Soft { tau: 0.005 },
        }
    }
}

impl TargetSync {
    /// Soft synchronization every `interval` steps.
    pub fn soft(interval: usize, tau: f64) -> Self {
        Self {
            interval,
            mode: SyncMode::Soft { tau },
        }
    }

    /// Hard copy every `interval` steps.
    pub fn hard(interval: usize) -> Self {
        Self {
            interval,
            mode: SyncMode::Hard,
        }
    }

    /// Returns `true` if the target should be synchronized at `step`.
    pub fn is_due(&self, step: usize) -> bool {
        self.interval > 0 && step % self.interval == 0
    }
}

fn not_done(terminal: bool) -> f32 {
    if terminal {
        0.0
    } else {
        1.0
    }
}

/// Elementwise minimum of two Q-value estimates.
pub fn min_q(q1: &[f32], q2: &[f32]) -> Result<Vec<f32>, CritiqueError> {
    check_len("q2", q1.len(), q2.len())?;
    Ok(q1.iter().zip(q2.iter()).map(|(a, b)| a.min(*b)).collect())
}

/// One-step TD target `r + gamma * (1 - d) * Q'`.
pub fn td_target(
    reward: &[f32],
    terminal: &[bool],
    next_q: &[f32],
    gamma: f32,
) -> Result<Vec<f32>, CritiqueError> {
    let n = reward.len();
    check_len("terminal", n, terminal.len())?;
    check_len("next_q", n, next_q.len())?;
    Ok(reward
        .iter()
        .zip(terminal.iter())
        .zip(next_q.iter())
        .map(|((r, d), q)| r + gamma * not_done(*d) * q)
        .collect())
}

/// Entropy-regularized double-Q target
/// `r + gamma * (1 - d) * (min(Q1', Q2') - alpha * log_prob')`.
///
/// `q1` and `q2` are the target networks' values at the next observation and an
/// action sampled from the current policy, whose log-probability is
/// `next_log_prob`. The result is symmetric in `q1` and `q2`.
pub fn entropy_regularized_target(
    reward: &[f32],
    terminal: &[bool],
    q1: &[f32],
    q2: &[f32],
    next_log_prob: &[f32],
    alpha: f32,
    gamma: f32,
) -> Result<Vec<f32>, CritiqueError> {
    check_len("q1", reward.len(), q1.len())?;
    check_len("next_log_prob", reward.len(), next_log_prob.len())?;
    let soft_q = min_q(q1, q2)?
        .iter()
        .zip(next_log_prob.iter())
        .map(|(q, logp)| q - alpha * logp)
        .collect::<Vec<_>>();
    td_target(reward, terminal, &soft_q, gamma)
}

/// How advantages are turned into regression weights.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum AwacWeighting {
    /// `exp(adv / lambda)` clipped to `[0, max_weight]`.
    Exp {
        /// Upper bound of the weights.
        max_weight: f32,
    },

    /// Softmax of `adv / lambda` over the batch.
    Softmax,
}

impl Default for AwacWeighting {
    fn default() -> Self {
        Self::Exp { max_weight: 100.0 }
    }
}

/// Weights of advantage-weighted regression.
///
/// For `lambda > 0` the weights are non-decreasing in the advantage.
pub fn awac_weights(
    advantages: &[f32],
    lambda: f32,
    weighting: &AwacWeighting,
) -> Result<Vec<f32>, CritiqueError> {
    if lambda <= 0.0 {
        return Err(CritiqueError::InvalidConfig(format!(
            "lambda must be positive, got {}",
            lambda
        )));
    }
    let scaled = advantages.iter().map(|a| a / lambda);

    Ok(match weighting {
        AwacWeighting::Exp { max_weight } => {
            scaled.map(|x| x.exp().clamp(0.0, *max_weight)).collect()
        }
        AwacWeighting::Softmax => {
            let xs = scaled.collect::<Vec<_>>();
            let m = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let es = xs.iter().map(|x| (x - m).exp()).collect::<Vec<_>>();
            let z = es.iter().sum::<f32>();
            es.iter().map(|e| e / z).collect()
        }
    })
}

/// `explore_weight * bonus + exploit_weight * reward`.
pub fn mixed_reward(
    bonus: &[f32],
    reward: &[f32],
    explore_weight: f32,
    exploit_weight: f32,
) -> Result<Vec<f32>, CritiqueError> {
    check_len("reward", bonus.len(), reward.len())?;
    Ok(bonus
        .iter()
        .zip(reward.iter())
        .map(|(b, r)| explore_weight * b + exploit_weight * r)
        .collect())
}

/// `(reward + shift) * scale`.
pub fn shift_scale(reward: &[f32], shift: f32, scale: f32) -> Vec<f32> {
    reward.iter().map(|r| (r + shift) * scale).collect()
}

/// `V(s) = sum_a pi(a|s) Q(s, a)` for each row.
pub fn expected_value(probs: &[Vec<f32>], q: &[Vec<f32>]) -> Result<Vec<f32>, CritiqueError> {
    check_len("q", probs.len(), q.len())?;
    probs
        .iter()
        .zip(q.iter())
        .map(|(p, q)| {
            check_len("action values", p.len(), q.len())?;
            Ok(p.iter().zip(q.iter()).map(|(p, q)| p * q).sum())
        })
        .collect()
}

/// Mean over samples of `Q(s, a_i)`, where `samples[i][j]` is the value of the
/// `i`-th sampled action at the `j`-th observation.
pub fn sampled_value(samples: &[Vec<f32>]) -> Result<Vec<f32>, CritiqueError> {
    let n = match samples.first() {
        Some(s) => s.len(),
        None => {
            return Err(CritiqueError::InvalidConfig(
                "at least one sampled action is required".into(),
            ))
        }
    };
    let mut sum = vec![0f32; n];
    for s in samples {
        check_len("sampled values", n, s.len())?;
        sum.iter_mut().zip(s.iter()).for_each(|(acc, v)| *acc += v);
    }
    Ok(sum.iter().map(|v| v / samples.len() as f32).collect())
}

/// Index of the largest value of each row.
pub fn argmax(rows: &[Vec<f32>]) -> Vec<usize> {
    rows.iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f32::NEG_INFINITY), |(i_max, v_max), (i, v)| {
                    if *v > v_max {
                        (i, *v)
                    } else {
                        (i_max, v_max)
                    }
                })
                .0
        })
        .collect()
}
