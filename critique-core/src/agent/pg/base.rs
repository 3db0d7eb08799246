use super::PgConfig;
use crate::{
    base::{Act, Agent, Env, Obs, PgPolicy, Policy, RolloutBatch, Trajectory},
    estimator::{AdvantageConfig, AdvantageEstimator, ReturnEstimator},
    record::{Record, RecordValue},
    replay_buffer::TrajectoryBuffer,
};
use anyhow::Result;
use log::{info, trace};
use std::{fs, path::Path};

/// Policy-gradient agent.
///
/// Trains on the most recent whole trajectories. Q-values come from the
/// configured [`ReturnEstimator`], advantages from [`AdvantageEstimator`] using
/// the policy's baseline when it has one.
pub struct Pg<P> {
    policy: P,
    buffer: TrajectoryBuffer,
    return_estimator: ReturnEstimator,
    advantage: AdvantageEstimator,
    gamma: f32,
    train: bool,
}

impl<P: PgPolicy> Pg<P> {
    /// Creates an agent around a policy.
    pub fn new(config: PgConfig, policy: P) -> Self {
        let advantage = AdvantageEstimator::new(
            AdvantageConfig::default()
                .gamma(config.gamma)
                .gae_lambda(config.gae_lambda)
                .standardize(config.standardize_advantages),
        );
        Self {
            policy,
            buffer: TrajectoryBuffer::build(&config.replay_buffer),
            return_estimator: config.return_estimator,
            advantage,
            gamma: config.gamma,
            train: true,
        }
    }

    /// The policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Q-values and advantages of a batch.
    pub fn estimate(&self, batch: &RolloutBatch) -> Result<(Vec<f32>, Vec<f32>)> {
        let q_values = self.return_estimator.q_values(&batch.rewards, self.gamma);
        let baseline = self.policy.baseline(&batch.transitions.obs)?;
        let advantages = self.advantage.estimate(
            &q_values,
            &batch.transitions.reward,
            &batch.transitions.terminal,
            baseline.as_deref(),
        )?;
        Ok((q_values, advantages))
    }
}

impl<P: PgPolicy> Policy for Pg<P> {
    fn sample_action(&mut self, obs: &Obs) -> Result<Act> {
        self.policy.sample_action(obs)
    }

    fn set_train(&mut self, train: bool) {
        self.train = train;
        self.policy.set_train(train);
    }
}

impl<E: Env, P: PgPolicy> Agent<E> for Pg<P> {
    type Batch = RolloutBatch;

    fn train(&mut self, batch: RolloutBatch) -> Result<Record> {
        trace!("Pg::train() on {} transitions", batch.len());
        let (q_values, advantages) = self.estimate(&batch)?;
        let mut record = self.policy.update(
            &batch.transitions.obs,
            &batch.transitions.act,
            &advantages,
            &q_values,
        )?;
        record.insert(
            "n_trajectories",
            RecordValue::Scalar(batch.rewards.len() as f32),
        );
        Ok(record)
    }

    fn sample(&mut self, batch_size: usize) -> Result<Option<RolloutBatch>> {
        let batch = self.buffer.sample_recent_rollouts(batch_size);
        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }

    fn add_to_replay_buffer(&mut self, paths: Vec<Trajectory>) -> Result<()> {
        self.buffer.add_rollouts(paths);
        Ok(())
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.policy.save(&path.join("policy.safetensors"))?;
        info!("Save policy-gradient agent to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.policy.load(&path.join("policy.safetensors"))?;
        info!("Load policy-gradient agent from {:?}", path);
        Ok(())
    }
}
