use super::AwacConfig;
use crate::{
    base::{
        Act, ActionSpace, ActionValueFunction, Agent, AwacPolicy, Env, NoveltyModel, Obs, Policy,
        Trajectory, TransitionBatch,
    },
    error::{check_len, CritiqueError},
    record::{Record, RecordValue},
    replay_buffer::{to_obs, FrameBuffer},
    rollout::{CollectInfo, RolloutConfig},
    stats::RunningStd,
    target::{
        argmax, awac_weights, expected_value, mixed_reward, sampled_value, shift_scale, td_target,
        SyncMode,
    },
};
use anyhow::Result;
use log::{info, trace};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{fs, path::Path};

/// Advantage-weighted actor-critic agent with a novelty bonus.
///
/// Two DQN-style critics are trained on the same transitions: the exploration
/// critic on a mix of the normalized novelty bonus and the environment reward,
/// the exploitation critic on the shifted and scaled environment reward. The
/// actor regresses toward stored actions weighted by their advantage under the
/// exploitation critic.
///
/// Collection is epsilon-greedy with respect to the exploration critic during
/// the first `num_exploration_steps` environment steps and to the exploitation
/// critic afterwards. Over a continuous action space the greedy action is
/// sampled from the actor. The actor itself is the evaluation policy.
pub struct Awac<P, Q, M> {
    config: AwacConfig,
    action_space: ActionSpace,
    actor: P,
    exploration_critic: Q,
    exploitation_critic: Q,
    novelty: M,
    buffer: FrameBuffer<f32>,
    bonus_std: RunningStd,
    rng: StdRng,
    t: usize,
    num_param_updates: usize,
    last_obs: Option<Obs>,
    episode_return: f32,
    episode_len: usize,
    train: bool,
}

impl<P, Q, M> Awac<P, Q, M>
where
    P: AwacPolicy,
    Q: ActionValueFunction,
    M: NoveltyModel,
{
    /// Creates an agent and copies both critics into their targets.
    pub fn new(
        config: AwacConfig,
        action_space: ActionSpace,
        actor: P,
        mut exploration_critic: Q,
        mut exploitation_critic: Q,
        novelty: M,
    ) -> Result<Self> {
        exploration_critic.sync_target(&SyncMode::Hard)?;
        exploitation_critic.sync_target(&SyncMode::Hard)?;
        Ok(Self {
            buffer: FrameBuffer::build(&config.replay_buffer)?,
            bonus_std: RunningStd::new(config.bonus_std_decay),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            action_space,
            actor,
            exploration_critic,
            exploitation_critic,
            novelty,
            t: 0,
            num_param_updates: 0,
            last_obs: None,
            episode_return: 0.0,
            episode_len: 0,
            train: true,
        })
    }

    /// Number of environment steps taken.
    pub fn t(&self) -> usize {
        self.t
    }

    /// Number of parameter updates made.
    pub fn num_param_updates(&self) -> usize {
        self.num_param_updates
    }

    /// The actor.
    pub fn actor(&self) -> &P {
        &self.actor
    }

    /// Number of frames in the replay buffer.
    pub fn buffer_len(&self) -> usize {
        self.buffer.len()
    }

    fn is_storing(&self) -> bool {
        !self.config.offline_exploitation || self.t <= self.config.num_exploration_steps
    }

    fn greedy_critic(&self) -> &Q {
        if self.t > self.config.num_exploration_steps {
            &self.exploitation_critic
        } else {
            &self.exploration_critic
        }
    }

    /// Epsilon-greedy action during collection.
    fn explore_action(&mut self, obs: Obs) -> Result<Act> {
        let random =
            self.rng.gen::<f32>() < self.config.eps || self.t < self.config.learning_starts;
        if random {
            return Ok(self.action_space.sample(&mut self.rng));
        }

        let act = if self.action_space.is_discrete() {
            let q = self.greedy_critic().all_q_values(&[obs], false)?;
            argmax(&q).first().copied().map(Act::Discrete)
        } else {
            self.actor.sample_actions(&[obs])?.pop()
        };
        act.ok_or_else(|| {
            CritiqueError::ShapeMismatch {
                what: "greedy action".into(),
                expected: 1,
                actual: 0,
            }
            .into()
        })
    }

    /// `Q'(s', a')` of a critic's target network, with `a'` greedy for the
    /// live (double Q) or target network over a discrete action space and sampled
    /// from the actor over a continuous one.
    fn next_q(&mut self, exploration: bool, next_obs: &[Obs]) -> Result<Vec<f32>> {
        let critic = if exploration {
            &self.exploration_critic
        } else {
            &self.exploitation_critic
        };
        let next_act = if self.action_space.is_discrete() {
            argmax(&critic.all_q_values(next_obs, !self.config.double_q)?)
                .into_iter()
                .map(Act::Discrete)
                .collect::<Vec<_>>()
        } else {
            self.actor.sample_actions(next_obs)?
        };
        critic.target_q_values(next_obs, &next_act)
    }

    /// `Q(s, a) - V(s)` under the exploitation critic.
    ///
    /// `V(s)` is the expectation of `Q(s, .)` over the actor's action
    /// probabilities for a discrete action space, and the mean over
    /// `n_value_samples` sampled actions for a continuous one.
    pub fn estimate_advantage(&mut self, obs: &[Obs], act: &[Act]) -> Result<Vec<f32>> {
        let q = self.exploitation_critic.q_values(obs, act)?;
        let v = if self.action_space.is_discrete() {
            let probs = self.actor.action_probs(obs)?;
            let q_all = self.exploitation_critic.all_q_values(obs, false)?;
            expected_value(&probs, &q_all)?
        } else {
            let samples = (0..self.config.n_value_samples)
                .map(|_| {
                    let a = self.actor.sample_actions(obs)?;
                    self.exploitation_critic.q_values(obs, &a)
                })
                .collect::<Result<Vec<_>>>()?;
            sampled_value(&samples)?
        };
        check_len("value estimate", q.len(), v.len())?;
        Ok(q.iter().zip(v.iter()).map(|(q, v)| q - v).collect())
    }
}

impl<P, Q, M> Policy for Awac<P, Q, M>
where
    P: AwacPolicy,
    Q: ActionValueFunction,
    M: NoveltyModel,
{
    fn sample_action(&mut self, obs: &Obs) -> Result<Act> {
        self.actor.sample_action(obs)
    }

    fn set_train(&mut self, train: bool) {
        self.train = train;
        self.actor.set_train(train);
    }
}

impl<E, P, Q, M> Agent<E> for Awac<P, Q, M>
where
    E: Env,
    P: AwacPolicy,
    Q: ActionValueFunction,
    M: NoveltyModel,
{
    type Batch = TransitionBatch;

    fn train(&mut self, batch: TransitionBatch) -> Result<Record> {
        trace!("Awac::train() at t = {}", self.t);
        let explore_weight = self.config.explore_weight.value(self.t);
        let exploit_weight = self.config.exploit_weight.value(self.t);

        // Novelty of s'
        let bonus = self.novelty.bonus(&batch.next_obs)?;
        let bonus = if self.config.normalize_bonus {
            self.bonus_std.normalize(&bonus)
        } else {
            bonus
        };
        let mixed = mixed_reward(&bonus, &batch.reward, explore_weight, exploit_weight)?;
        let env_reward = shift_scale(
            &batch.reward,
            self.config.exploit_rew_shift,
            self.config.exploit_rew_scale,
        );

        let exploration_model_loss = self.novelty.update(&batch.next_obs)?;

        let next_q = self.next_q(true, &batch.next_obs)?;
        let target = td_target(&mixed, &batch.terminal, &next_q, self.config.gamma)?;
        let exploration_critic_loss =
            self.exploration_critic.fit(&batch.obs, &batch.act, &target)?;

        let next_q = self.next_q(false, &batch.next_obs)?;
        let target = td_target(&env_reward, &batch.terminal, &next_q, self.config.gamma)?;
        let exploitation_critic_loss =
            self.exploitation_critic.fit(&batch.obs, &batch.act, &target)?;

        let advantages = self.estimate_advantage(&batch.obs, &batch.act)?;
        let weights = awac_weights(
            &advantages,
            self.config.awac_lambda,
            &self.config.weighting,
        )?;
        let actor_loss = self.actor.update(&batch.obs, &batch.act, &weights)?;

        if self.config.target_sync.is_due(self.num_param_updates) {
            self.exploration_critic
                .sync_target(&self.config.target_sync.mode)?;
            self.exploitation_critic
                .sync_target(&self.config.target_sync.mode)?;
        }
        self.num_param_updates += 1;

        Ok(Record::from_slice(&[
            (
                "exploration_critic_loss",
                RecordValue::Scalar(exploration_critic_loss),
            ),
            (
                "exploitation_critic_loss",
                RecordValue::Scalar(exploitation_critic_loss),
            ),
            (
                "exploration_model_loss",
                RecordValue::Scalar(exploration_model_loss),
            ),
            ("actor_loss", RecordValue::Scalar(actor_loss)),
            ("explore_weight", RecordValue::Scalar(explore_weight)),
            ("exploit_weight", RecordValue::Scalar(exploit_weight)),
        ]))
    }

    /// A batch of stored transitions, or `None` unless learning has started, the
    /// current step is an update step and enough transitions are stored.
    fn sample(&mut self, batch_size: usize) -> Result<Option<TransitionBatch>> {
        let due = self.t > self.config.learning_starts
            && self.config.learning_freq > 0
            && self.t % self.config.learning_freq == 0;
        if !due || !self.buffer.can_sample(batch_size) {
            return Ok(None);
        }
        Ok(Some(self.buffer.sample(batch_size)?))
    }

    /// Stores each transition's observation as a frame, for offline data.
    fn add_to_replay_buffer(&mut self, paths: Vec<Trajectory>) -> Result<()> {
        for path in paths {
            for tr in path.transitions {
                let idx = self.buffer.store_frame(tr.obs)?;
                self.buffer
                    .store_effect(idx, tr.act, tr.reward, tr.terminal)?;
            }
        }
        Ok(())
    }

    /// Takes one epsilon-greedy environment step.
    fn collect(&mut self, env: &mut E, config: &RolloutConfig) -> Result<CollectInfo> {
        let obs = match self.last_obs.take() {
            Some(obs) => obs,
            None => {
                self.episode_return = 0.0;
                self.episode_len = 0;
                env.reset()?
            }
        };

        let idx = if self.is_storing() {
            Some(self.buffer.store_frame(obs.clone())?)
        } else {
            None
        };
        let processed = match idx {
            Some(_) => to_obs(&self.buffer.encode_recent_observation()?),
            None => obs,
        };
        let act = self.explore_action(processed)?;

        let step = env.step(&act)?;
        self.episode_return += step.reward;
        self.episode_len += 1;
        let done = step.is_done || self.episode_len >= config.max_path_length;
        if let Some(idx) = idx {
            self.buffer.store_effect(idx, act, step.reward, done)?;
        }
        self.t += 1;

        let mut info = CollectInfo {
            env_steps: 1,
            episode_returns: vec![],
        };
        if done {
            info.episode_returns.push(self.episode_return);
        } else {
            self.last_obs = Some(step.obs);
        }
        Ok(info)
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path)?;
        self.actor.save(&path.join("actor.safetensors"))?;
        self.exploration_critic
            .save(&path.join("exploration_critic.safetensors"))?;
        self.exploitation_critic
            .save(&path.join("exploitation_critic.safetensors"))?;
        self.novelty.save(&path.join("exploration_model.safetensors"))?;
        info!("Save AWAC agent to {:?}", path);
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.actor.load(&path.join("actor.safetensors"))?;
        self.exploration_critic
            .load(&path.join("exploration_critic.safetensors"))?;
        self.exploitation_critic
            .load(&path.join("exploitation_critic.safetensors"))?;
        self.novelty.load(&path.join("exploration_model.safetensors"))?;
        info!("Load AWAC agent from {:?}", path);
        Ok(())
    }
}
