use crate::{
    error::{check_len, CritiqueError},
    stats,
};
use serde::{Deserialize, Serialize};

/// Configuration of [`AdvantageEstimator`].
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct AdvantageConfig {
    /// Discount factor.
    pub gamma: f32,

    /// `Some(lambda)` enables generalized advantage estimation.
    pub gae_lambda: Option<f32>,

    /// Standardize advantages to zero mean and unit variance.
    pub standardize: bool,
}

impl Default for AdvantageConfig {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            gae_lambda: None,
            standardize: true,
        }
    }
}

impl AdvantageConfig {
    /// Sets the discount factor.
    pub fn gamma(mut self, v: f32) -> Self {
        self.gamma = v;
        self
    }

    /// Sets lambda of generalized advantage estimation.
    pub fn gae_lambda(mut self, v: Option<f32>) -> Self {
        self.gae_lambda = v;
        self
    }

    /// Enables standardization.
    pub fn standardize(mut self, v: bool) -> Self {
        self.standardize = v;
        self
    }
}

/// Computes advantages from Q-values and an optional value baseline.
///
/// * Without a baseline the advantage is the Q-value itself.
/// * With a baseline, whose predictions live in the standardized scale it was
///   trained on, the predictions are first rescaled to the mean and standard
///   deviation of the batch Q-values. The advantage is then `Q - V`, or the
///   generalized advantage estimate when `gae_lambda` is set.
/// * Standardization, if enabled, is applied last.
#[derive(Debug, Clone)]
pub struct AdvantageEstimator {
    config: AdvantageConfig,
}

impl AdvantageEstimator {
    /// Creates an estimator.
    pub fn new(config: AdvantageConfig) -> Self {
        Self { config }
    }

    /// Estimates the advantage of each transition.
    ///
    /// `q_values`, `rewards`, `terminals` and `baseline` are flattened over the
    /// batch and must have the same length.
    pub fn estimate(
        &self,
        q_values: &[f32],
        rewards: &[f32],
        terminals: &[bool],
        baseline: Option<&[f32]>,
    ) -> Result<Vec<f32>, CritiqueError> {
        let n = q_values.len();
        check_len("rewards", n, rewards.len())?;
        check_len("terminals", n, terminals.len())?;

        let advantages = match baseline {
            None => match self.config.gae_lambda {
                None => q_values.to_vec(),
                Some(_) => {
                    return Err(CritiqueError::NotImplemented(
                        "generalized advantage estimation without a value baseline".into(),
                    ))
                }
            },
            Some(baseline) => {
                check_len("baseline", n, baseline.len())?;
                let values =
                    stats::unnormalize(baseline, stats::mean(q_values), stats::std(q_values));
                match self.config.gae_lambda {
                    None => q_values.iter().zip(values.iter()).map(|(q, v)| q - v).collect(),
                    Some(lambda) => gae(rewards, &values, terminals, self.config.gamma, lambda)?,
                }
            }
        };

        if self.config.standardize {
            Ok(stats::standardize(&advantages))
        } else {
            Ok(advantages)
        }
    }
}

/// Generalized advantage estimation over a flattened batch of trajectories.
///
/// With `V(s_{t+1})` taken as 0 after the last transition,
/// `delta_t = r_t + gamma * V(s_{t+1}) * (1 - d_t) - V(s_t)` and
/// `A_t = delta_t + gamma * lambda * (1 - d_t) * A_{t+1}`, computed from the
/// end. A terminal flag `d_t` stops both bootstrapping and the recursion, so
/// trajectory boundaries are respected.
pub fn gae(
    rewards: &[f32],
    values: &[f32],
    terminals: &[bool],
    gamma: f32,
    lambda: f32,
) -> Result<Vec<f32>, CritiqueError> {
    let n = rewards.len();
    check_len("values", n, values.len())?;
    check_len("terminals", n, terminals.len())?;

    let next_values = values
        .iter()
        .skip(1)
        .copied()
        .chain(std::iter::once(0f32))
        .collect::<Vec<_>>();
    let (_, mut advantages) = rewards
        .iter()
        .zip(values.iter())
        .zip(next_values.iter())
        .zip(terminals.iter())
        .rev()
        .fold(
            (0f32, Vec::with_capacity(n)),
            |(next_adv, mut acc), (((r, v), v_next), done)| {
                let not_done = if *done { 0f32 } else { 1f32 };
                let delta = r + gamma * v_next * not_done - v;
                let adv = delta + gamma * lambda * not_done * next_adv;
                acc.push(adv);
                (adv, acc)
            },
        );
    advantages.reverse();

    Ok(advantages)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::estimator::discounted_cumsum;

    fn assert_close(xs: &[f32], ys: &[f32]) {
        assert_eq!(xs.len(), ys.len());
        xs.iter()
            .zip(ys.iter())
            .for_each(|(x, y)| assert!((x - y).abs() < 1e-5, "{:?} != {:?}", xs, ys));
    }

    #[test]
    fn test_no_baseline_copies_q_values() -> Result<(), CritiqueError> {
        let est = AdvantageEstimator::new(AdvantageConfig::default().standardize(false));
        let q = [1.0, -2.0, 3.0];
        let adv = est.estimate(&q, &[0.0; 3], &[false, false, true], None)?;
        assert_eq!(adv, q.to_vec());
        Ok(())
    }

    #[test]
    fn test_baseline_is_rescaled_to_q_statistics() -> Result<(), CritiqueError> {
        let est = AdvantageEstimator::new(AdvantageConfig::default().standardize(false));
        let q = [1.0, 3.0];
        // mean 2, std 1; standardized predictions [-1, 1] map to [1, 3]
        let adv = est.estimate(&q, &[0.0; 2], &[false, true], Some(&[-1.0, 1.0]))?;
        assert_close(&adv, &[0.0, 0.0]);
        Ok(())
    }

    #[test]
    fn test_gae_lambda_one_is_reward_to_go_minus_baseline() -> Result<(), CritiqueError> {
        let rewards = [1.0, 0.5, -0.3, 2.0];
        let values = [0.2, 0.4, -0.1, 0.7];
        let terminals = [false, false, false, true];
        let gamma = 0.9;

        let adv = gae(&rewards, &values, &terminals, gamma, 1.0)?;
        let expected = discounted_cumsum(&rewards, gamma)
            .iter()
            .zip(values.iter())
            .map(|(q, v)| q - v)
            .collect::<Vec<_>>();
        assert_close(&adv, &expected);
        Ok(())
    }

    #[test]
    fn test_gae_lambda_zero_is_td_residual() -> Result<(), CritiqueError> {
        let rewards = [1.0, 0.5, -0.3];
        let values = [0.2, 0.4, -0.1];
        let terminals = [false, false, true];
        let gamma = 0.9;

        let adv = gae(&rewards, &values, &terminals, gamma, 0.0)?;
        let expected = [
            1.0 + gamma * 0.4 - 0.2,
            0.5 + gamma * -0.1 - 0.4,
            -0.3 - -0.1,
        ];
        assert_close(&adv, &expected);
        Ok(())
    }

    #[test]
    fn test_gae_respects_trajectory_boundaries() -> Result<(), CritiqueError> {
        let (r1, v1, d1) = ([1.0, 2.0], [0.5, 0.1], [false, true]);
        let (r2, v2, d2) = ([-1.0, 0.0, 3.0], [0.3, 0.2, 0.9], [false, false, true]);
        let joined = gae(
            &[&r1[..], &r2[..]].concat(),
            &[&v1[..], &v2[..]].concat(),
            &[&d1[..], &d2[..]].concat(),
            0.95,
            0.9,
        )?;
        let separate = [
            gae(&r1, &v1, &d1, 0.95, 0.9)?,
            gae(&r2, &v2, &d2, 0.95, 0.9)?,
        ]
        .concat();
        assert_close(&joined, &separate);
        Ok(())
    }

    #[test]
    fn test_standardized_advantages() -> Result<(), CritiqueError> {
        let est = AdvantageEstimator::new(AdvantageConfig::default());
        let q = [1.0, 5.0, -2.0, 0.5, 3.0];
        let adv = est.estimate(&q, &[0.0; 5], &[false, false, false, false, true], None)?;
        assert!(stats::mean(&adv).abs() < 1e-5);
        assert!((stats::std(&adv) - 1.0).abs() < 1e-5);
        Ok(())
    }

    #[test]
    fn test_gae_without_baseline_is_not_implemented() {
        let est = AdvantageEstimator::new(AdvantageConfig::default().gae_lambda(Some(0.95)));
        let res = est.estimate(&[1.0], &[1.0], &[true], None);
        assert!(matches!(res, Err(CritiqueError::NotImplemented(_))));
    }

    #[test]
    fn test_shape_mismatch() {
        let est = AdvantageEstimator::new(AdvantageConfig::default());
        let res = est.estimate(&[1.0, 2.0], &[1.0], &[true, true], None);
        assert!(matches!(res, Err(CritiqueError::ShapeMismatch { .. })));
        let res = est.estimate(&[1.0, 2.0], &[1.0, 1.0], &[false, true], Some(&[0.0]));
        assert!(matches!(res, Err(CritiqueError::ShapeMismatch { .. })));
    }
}
