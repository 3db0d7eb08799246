use super::Evaluator;
use crate::{base::Env, record::Record, rollout::sample_n_trajectories, stats, Agent};
use anyhow::Result;
use log::info;

/// Runs a fixed number of episodes and reports the mean undiscounted return as
/// `"eval_return"`.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    max_path_length: usize,
    env: E,
}

impl<E: Env> DefaultEvaluator<E> {
    /// Builds the evaluation environment.
    pub fn new(
        config: &E::Config,
        seed: u64,
        n_episodes: usize,
        max_path_length: usize,
    ) -> Result<Self> {
        Ok(Self {
            n_episodes,
            max_path_length,
            env: E::build(config, seed)?,
        })
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator<E> {
    fn evaluate<A: Agent<E>>(&mut self, agent: &mut A) -> Result<Record> {
        let paths = sample_n_trajectories(
            &mut self.env,
            agent,
            self.n_episodes,
            self.max_path_length,
        )?;
        let returns = paths.iter().map(|p| p.total_reward()).collect::<Vec<_>>();
        let eval_return = stats::mean(&returns);
        info!("Evaluation return over {} episodes: {}", self.n_episodes, eval_return);
        Ok(Record::from_scalar("eval_return", eval_return))
    }
}
