//! Collection of trajectories with a policy.
use crate::base::{Env, Policy, Trajectory, Transition};
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// How much experience is collected per training iteration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RolloutConfig {
    /// Trajectories are collected until this many transitions are gathered.
    pub min_timesteps: usize,

    /// Trajectories are cut at this length.
    pub max_path_length: usize,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            min_timesteps: 1000,
            max_path_length: 1000,
        }
    }
}

/// Summary of one collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectInfo {
    /// Number of environment steps taken.
    pub env_steps: usize,

    /// Undiscounted returns of the episodes finished during the collection.
    pub episode_returns: Vec<f32>,
}

/// Runs one episode, cut at `max_path_length` steps.
///
/// The last transition is flagged terminal whether the episode ended or was cut.
pub fn sample_trajectory<E, P>(
    env: &mut E,
    policy: &mut P,
    max_path_length: usize,
) -> Result<Trajectory>
where
    E: Env,
    P: Policy + ?Sized,
{
    let mut obs = env.reset()?;
    let mut path = Trajectory::new();

    loop {
        let act = policy.sample_action(&obs)?;
        let step = env.step(&act)?;
        let terminal = step.is_done || path.len() + 1 >= max_path_length;
        path.push(Transition {
            obs,
            act,
            reward: step.reward,
            next_obs: step.obs.clone(),
            terminal,
        });
        if terminal {
            break;
        }
        obs = step.obs;
    }

    Ok(path)
}

/// Collects whole trajectories until at least `min_timesteps` transitions.
pub fn sample_trajectories<E, P>(
    env: &mut E,
    policy: &mut P,
    min_timesteps: usize,
    max_path_length: usize,
) -> Result<Vec<Trajectory>>
where
    E: Env,
    P: Policy + ?Sized,
{
    let mut paths = vec![];
    let mut timesteps = 0;

    while timesteps < min_timesteps {
        let path = sample_trajectory(env, policy, max_path_length)?;
        timesteps += path.len();
        paths.push(path);
    }

    Ok(paths)
}

/// Collects exactly `n` trajectories.
pub fn sample_n_trajectories<E, P>(
    env: &mut E,
    policy: &mut P,
    n: usize,
    max_path_length: usize,
) -> Result<Vec<Trajectory>>
where
    E: Env,
    P: Policy + ?Sized,
{
    (0..n)
        .map(|_| sample_trajectory(env, policy, max_path_length))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dummy::{DummyEnv, DummyEnvConfig, FixedPolicy};
    use crate::Act;

    #[test]
    fn test_trajectory_cut_at_max_length() -> Result<()> {
        let config = DummyEnvConfig::default().episode_len(10);
        let mut env = DummyEnv::build(&config, 0)?;
        let mut policy = FixedPolicy::new(Act::Discrete(0));

        let path = sample_trajectory(&mut env, &mut policy, 4)?;
        assert_eq!(path.len(), 4);
        assert!(path.transitions[3].terminal);
        assert!(path.transitions[..3].iter().all(|t| !t.terminal));
        Ok(())
    }

    #[test]
    fn test_trajectories_cover_min_timesteps() -> Result<()> {
        let config = DummyEnvConfig::default().episode_len(3);
        let mut env = DummyEnv::build(&config, 0)?;
        let mut policy = FixedPolicy::new(Act::Discrete(1));

        let paths = sample_trajectories(&mut env, &mut policy, 7, 100)?;
        assert_eq!(paths.len(), 3);
        assert!(paths.iter().all(|p| p.len() == 3));
        assert_eq!(paths[0].transitions[0].next_obs, paths[0].transitions[1].obs);
        Ok(())
    }
}
