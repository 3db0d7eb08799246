use serde::{Deserialize, Serialize};

/// How the Q-value of a timestep is estimated from the rewards of its trajectory.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum ReturnEstimator {
    /// Every timestep receives the discounted return of the whole trajectory.
    TrajectoryReturn,

    /// Timestep `t` receives the discounted sum of rewards from `t` on.
    RewardToGo,
}

impl Default for ReturnEstimator {
    fn default() -> Self {
        Self::RewardToGo
    }
}

impl ReturnEstimator {
    /// Q-values of all trajectories, concatenated in trajectory order.
    pub fn q_values(&self, rewards: &[Vec<f32>], gamma: f32) -> Vec<f32> {
        rewards
            .iter()
            .flat_map(|rs| match self {
                Self::TrajectoryReturn => discounted_return(rs, gamma),
                Self::RewardToGo => discounted_cumsum(rs, gamma),
            })
            .collect()
    }
}

/// `sum_t gamma^t r_t`, repeated for every timestep.
pub fn discounted_return(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let ret = rewards
        .iter()
        .rev()
        .fold(0f32, |acc, r| r + gamma * acc);
    vec![ret; rewards.len()]
}

/// `sum_{t' >= t} gamma^{t' - t} r_{t'}` for every timestep `t`.
pub fn discounted_cumsum(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut out = rewards
        .iter()
        .rev()
        .scan(0f32, |acc, r| {
            *acc = r + gamma * *acc;
            Some(*acc)
        })
        .collect::<Vec<_>>();
    out.reverse();
    out
}
