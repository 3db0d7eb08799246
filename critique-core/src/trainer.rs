//! Train [`Agent`].
mod config;
use crate::{
    base::Env,
    record::{AggregateRecorder, Record, RecordValue::Scalar},
    rollout::RolloutConfig,
    stats, Agent, Evaluator,
};
use anyhow::Result;
pub use config::TrainerConfig;
use log::{info, warn};
use std::path::Path;

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// For each of the `n_iter` iterations:
///
/// 1. [`Agent::collect`] interacts with the environment and stores the
///    experience. `train_env_steps` accumulates the environment steps and
///    `train_return` is the mean return of the episodes finished in the
///    iteration.
/// 2. Up to `n_train_steps_per_iter` times, [`Agent::sample`] draws a batch of
///    `train_batch_size` and [`Agent::train`] performs a training step on it.
///    Training steps stop early as soon as the agent has no batch to give, for
///    example while its replay buffer is warming up.
/// 3. Every `eval_interval` iterations the agent is evaluated in evaluation mode
///    and `eval_return` is recorded. The parameters with the best evaluation
///    return so far are saved in `(model_dir)/best`.
/// 4. Every `save_interval` iterations the parameters are saved in
///    `(model_dir)/(iteration)`.
/// 5. Every `flush_interval` iterations the recorder is flushed.
///
/// ```mermaid
/// graph LR
///     A[Agent]-->|Act|B[Env]
///     B -->|Step|A
///     A -->|Batch|A
///     A -->|Record|C[AggregateRecorder]
///     D[Evaluator] -->|Record|C
/// ```
pub struct Trainer {
    n_iter: usize,
    rollout: RolloutConfig,
    train_batch_size: usize,
    n_train_steps_per_iter: usize,
    eval_interval: usize,
    flush_interval: usize,
    save_interval: usize,
    model_dir: Option<String>,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self {
            n_iter: config.n_iter,
            rollout: config.rollout,
            train_batch_size: config.train_batch_size,
            n_train_steps_per_iter: config.n_train_steps_per_iter,
            eval_interval: config.eval_interval,
            flush_interval: config.flush_interval,
            save_interval: config.save_interval,
            model_dir: config.model_dir,
        }
    }

    fn save_model<E: Env, A: Agent<E>>(agent: &A, model_dir: &Path) {
        match agent.save_params(model_dir) {
            Ok(()) => info!("Saved the model in {:?}.", model_dir),
            Err(e) => warn!("Failed to save model in {:?}: {}", model_dir, e),
        }
    }

    fn is_due(interval: usize, iter: usize) -> bool {
        interval > 0 && iter % interval == 0
    }

    /// Performs one iteration: collection followed by training steps.
    ///
    /// Records of the training steps are stored in `recorder`; the returned
    /// record holds the collection statistics.
    pub fn train_iter<E, A>(
        &self,
        agent: &mut A,
        env: &mut E,
        recorder: &mut dyn AggregateRecorder,
        env_steps: &mut usize,
    ) -> Result<Record>
    where
        E: Env,
        A: Agent<E>,
    {
        let info = agent.collect(env, &self.rollout)?;
        *env_steps += info.env_steps;

        let mut record = Record::from_scalar("train_env_steps", *env_steps as f32);
        if !info.episode_returns.is_empty() {
            record.insert("train_return", Scalar(stats::mean(&info.episode_returns)));
        }

        for _ in 0..self.n_train_steps_per_iter {
            match agent.sample(self.train_batch_size)? {
                Some(batch) => recorder.store(agent.train(batch)?),
                None => break,
            }
        }

        Ok(record)
    }

    /// Trains the agent.
    pub fn train<E, A, D>(
        &mut self,
        agent: &mut A,
        env: &mut E,
        recorder: &mut dyn AggregateRecorder,
        evaluator: &mut D,
    ) -> Result<()>
    where
        E: Env,
        A: Agent<E>,
        D: Evaluator<E>,
    {
        let mut env_steps = 0;
        let mut max_eval_return = f32::MIN;
        agent.set_train(true);

        for iter in 1..=self.n_iter {
            let mut record = self.train_iter(agent, env, recorder, &mut env_steps)?;

            // Evaluation
            if Self::is_due(self.eval_interval, iter) {
                info!("Starts evaluation at iteration {}", iter);
                agent.set_train(false);
                let eval_record = evaluator.evaluate(agent);
                agent.set_train(true);
                let eval_return = eval_record?.get_scalar("eval_return")?;
                record.insert("eval_return", Scalar(eval_return));

                // Save the best model up to the current iteration
                if eval_return > max_eval_return {
                    max_eval_return = eval_return;
                    if let Some(model_dir) = &self.model_dir {
                        Self::save_model::<E, A>(agent, &Path::new(model_dir).join("best"));
                    }
                }
            }

            // Save the current model
            if Self::is_due(self.save_interval, iter) {
                if let Some(model_dir) = &self.model_dir {
                    Self::save_model::<E, A>(agent, &Path::new(model_dir).join(iter.to_string()));
                }
            }

            recorder.store(record);

            if Self::is_due(self.flush_interval, iter) {
                recorder.flush(iter as _);
            }
        }

        Ok(())
    }
}
