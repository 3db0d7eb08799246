use super::SacConfig;
use crate::{
    base::{
        Act, ActionValueFunction, Agent, Env, Obs, Persistent, Policy, SacPolicy, Trajectory,
        TransitionBatch,
    },
    record::{Record, RecordValue},
    replay_buffer::TrajectoryBuffer,
    stats,
    target::{entropy_regularized_target, SyncMode, TargetSync},
};
use anyhow::Result;
use log::{info, trace};
use std::{fs, path::Path};

/// Soft actor-critic agent.
///
/// Two critics are regressed toward the entropy-regularized double-Q target
/// computed with their target copies. The target copies are hard-copied once at
/// construction and follow the critics by [`SacConfig::critic_target_sync`]
/// afterwards.
pub struct Sac<P: SacPolicy> {
    actor: P,
    critics: [P::Critic; 2],
    buffer: TrajectoryBuffer,
    gamma: f32,
    critic_target_sync: TargetSync,
    num_critic_updates: usize,
    num_actor_updates: usize,
    actor_update_frequency: usize,
    reward_scale: f32,
    n_train_steps: usize,
    train: bool,
}

impl<P: SacPolicy> Sac<P> {
    /// Creates an agent and copies the critics into their targets.
    pub fn new(config: SacConfig, actor: P, mut critics: [P::Critic; 2]) -> Result<Self> {
        for critic in critics.iter_mut() {
            critic.sync_target(&SyncMode::Hard)?;
        }
        Ok(Self {
            actor,
            critics,
            buffer: TrajectoryBuffer::build(&config.replay_buffer),
            gamma: config.gamma,
            critic_target_sync: config.critic_target_sync,
            num_critic_updates: config.num_critic_updates_per_agent_update,
            num_actor_updates: config.num_actor_updates_per_agent_update,
            actor_update_frequency: config.actor_update_frequency,
            reward_scale: config.reward_scale,
            n_train_steps: 0,
            train: true,
        })
    }

    /// The actor.
    pub fn actor(&self) -> &P {
        &self.actor
    }

    /// The two critics.
    pub fn critics(&self) -> &[P::Critic; 2] {
        &self.critics
    }

    /// Number of completed training steps.
    pub fn n_train_steps(&self) -> usize {
        self.n_train_steps
    }

    fn update_critics(&mut self, batch: &TransitionBatch) -> Result<f32> {
        let reward = batch
            .reward
            .iter()
            .map(|r| r * self.reward_scale)
            .collect::<Vec<_>>();
        let mut loss = 0f32;
        for _ in 0..self.num_critic_updates {
            let (next_act, next_log_prob) = self.actor.sample_with_log_prob(&batch.next_obs)?;
            let q1 = self.critics[0].target_q_values(&batch.next_obs, &next_act)?;
            let q2 = self.critics[1].target_q_values(&batch.next_obs, &next_act)?;
            let target = entropy_regularized_target(
                &reward,
                &batch.terminal,
                &q1,
                &q2,
                &next_log_prob,
                self.actor.alpha()?,
                self.gamma,
            )?;

            for critic in self.critics.iter_mut() {
                loss += critic.fit(&batch.obs, &batch.act, &target)?;
            }
        }

        Ok(loss / self.num_critic_updates.max(1) as f32)
    }

    fn update_actor(&mut self, obs: &[Obs]) -> Result<Option<(f32, f32)>> {
        if self.actor_update_frequency == 0 || self.n_train_steps % self.actor_update_frequency != 0
        {
            return Ok(None);
        }
        let mut losses = Vec::with_capacity(self.num_actor_updates);
        for _ in 0..self.num_actor_updates {
            losses.push(self.actor.update(obs, &self.critics)?);
        }
        let actor_loss = losses.iter().map(|l| l.0).collect::<Vec<_>>();
        let alpha_loss = losses.iter().map(|l| l.1).collect::<Vec<_>>();
        Ok(Some((stats::mean(&actor_loss), stats::mean(&alpha_loss))))
    }
}

impl<P: SacPolicy> Policy for Sac<P> {
    fn sample_action(&mut self, obs: &Obs) -> Result<Act> {
        self.actor.sample_action(obs)
    }

    fn set_train(&mut self, train: bool) {
        self.train = train;
        self.actor.set_train(train);
    }
}

impl<E: Env, P: SacPolicy> Agent<E> for Sac<P> {
    type Batch = TransitionBatch;

    fn train(&mut self, batch: TransitionBatch) -> Result<Record> {
        trace!("Sac::train() step {}", self.n_train_steps);
        let critic_loss = self.update_critics(&batch)?;

        if self.critic_target_sync.is_due(self.n_train_steps) {
            for critic in self.critics.iter_mut() {
                critic.sync_target(&self.critic_target_sync.mode)?;
            }
        }

        let mut record = Record::from_scalar("critic_loss", critic_loss);
        if let Some((actor_loss, alpha_loss)) = self.update_actor(&batch.obs)? {
            record.insert("actor_loss", RecordValue::Scalar(actor_loss));
            record.insert("alpha_loss", RecordValue::Scalar(alpha_loss));
        }
        record.insert("temperature", RecordValue::Scalar(self.actor.alpha()?));

        self.n_train_steps += 1;
        Ok(record)
    }

    fn sample(&mut self, batch_size: usize) -> Result<Option<TransitionBatch>> {
        if self.buffer.len() < batch_size {
            return Ok(None);
        }
        Ok(Some(self.buffer.sample_random(batch_size)?))
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
        self.actor.save(&path.join("actor.safetensors"))?;
        self.critics[0].save(&path.join("critic_0.safetensors"))?;
        self.critics[1].save(&path.join("critic_1.safetensors"))?;
        info!("Save SAC agent to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.actor.load(&path.join("actor.safetensors"))?;
        self.critics[0].load(&path.join("critic_0.safetensors"))?;
        self.critics[1].load(&path.join("critic_1.safetensors"))?;
        info!("Load SAC agent from {:?}", path);
        Ok(())
    }
}
