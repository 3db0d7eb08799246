use super::{SacActorConfig, Temperature};
use crate::{
    mlp::{Mlp, MlpConfig},
    opt::Optimizer,
    q_network::QNetwork,
    util::{normal_logp, obs_to_tensor, tensor_to_continuous_act, vars_with_prefix},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};
use critique_core::{
    error::CritiqueError, Act, ActionSpace, Obs, Persistent, Policy, SacPolicy,
};
use log::{info, trace};
use std::path::Path;

/// Tanh-squashed Gaussian actor of SAC.
///
/// The network outputs the mean and the log standard deviation of a diagonal
/// Gaussian. Samples are squashed with `tanh` and scaled to the bounds of the
/// action space; the log-probability accounts for both transformations.
/// In evaluation mode the action is the squashed mean.
pub struct SacActor {
    device: Device,
    varmap: VarMap,
    pi: Mlp,
    opt: Optimizer,
    temperature: Temperature,
    scale: Tensor,
    center: Tensor,
    min_log_std: f64,
    max_log_std: f64,
    epsilon: f64,
    train: bool,
}

impl SacActor {
    /// Constructs [`SacActor`].
    ///
    /// Fails unless the action space is continuous.
    pub fn build(config: SacActorConfig) -> Result<Self> {
        let (low, high) = match &config.action_space {
            ActionSpace::Continuous { low, high } => (low, high),
            ActionSpace::Discrete(_) => {
                return Err(CritiqueError::InvalidConfig(
                    "SAC actor requires a continuous action space".into(),
                )
                .into())
            }
        };
        let device: Device = config.device.try_into()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let act_dim = low.len();

        let pi = Mlp::build(
            vb.pp("policy"),
            &MlpConfig::new(config.obs_dim, config.units.clone(), 2 * act_dim, false),
        )?;
        let opt = config
            .opt_config
            .build(vars_with_prefix(&varmap, "policy")?)?;
        let temperature = Temperature::build(vb, &varmap, "temperature", &config.temperature)?;

        let scale = low
            .iter()
            .zip(high.iter())
            .map(|(l, h)| (h - l) / 2.0)
            .collect::<Vec<_>>();
        let center = low
            .iter()
            .zip(high.iter())
            .map(|(l, h)| (h + l) / 2.0)
            .collect::<Vec<_>>();

        Ok(Self {
            scale: Tensor::from_vec(scale, (act_dim,), &device)?,
            center: Tensor::from_vec(center, (act_dim,), &device)?,
            device,
            varmap,
            pi,
            opt,
            temperature,
            min_log_std: config.min_log_std,
            max_log_std: config.max_log_std,
            epsilon: config.epsilon,
            train: true,
        })
    }

    /// Current temperature.
    pub fn temperature(&self) -> &Temperature {
        &self.temperature
    }

    fn mean_log_std(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let out = self.pi.forward(obs)?;
        let chunks = out.chunk(2, D::Minus1)?;
        let log_std = chunks[1].clamp(self.min_log_std, self.max_log_std)?;
        Ok((chunks[0].clone(), log_std))
    }

    fn squash(&self, u: &Tensor) -> Result<Tensor> {
        Ok(u
            .tanh()?
            .broadcast_mul(&self.scale)?
            .broadcast_add(&self.center)?)
    }

    /// Reparameterized actions of shape `(batch_size, act_dim)` and their
    /// log-probabilities of shape `(batch_size,)`.
    pub fn action_logp(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let (mean, log_std) = self.mean_log_std(obs)?;
        let z = mean.randn_like(0.0, 1.0)?;
        let u = ((log_std.exp()? * &z)? + &mean)?;
        let t = u.tanh()?;
        let act = t
            .broadcast_mul(&self.scale)?
            .broadcast_add(&self.center)?;

        let log_det = ((1.0 - t.powf(2.0)?)? + self.epsilon)?
            .log()?
            .sum(D::Minus1)?
            .broadcast_add(&self.scale.log()?.sum_all()?)?;
        let logp = ((normal_logp(&z)? - log_std.sum(D::Minus1)?)? - log_det)?;

        Ok((act, logp))
    }
}

impl Policy for SacActor {
    fn sample_action(&mut self, obs: &Obs) -> Result<Act> {
        let obs = obs_to_tensor(std::slice::from_ref(obs), &self.device)?;
        let act = if self.train {
            self.action_logp(&obs)?.0
        } else {
            self.squash(&self.mean_log_std(&obs)?.0)?
        };
        tensor_to_continuous_act(&act)?.pop().ok_or_else(|| {
            CritiqueError::ShapeMismatch {
                what: "sampled actions".into(),
                expected: 1,
                actual: 0,
            }
            .into()
        })
    }

    fn set_train(&mut self, train: bool) {
        self.train = train;
    }
}

impl SacPolicy for SacActor {
    type Critic = QNetwork;

    fn sample_with_log_prob(&mut self, obs: &[Obs]) -> Result<(Vec<Act>, Vec<f32>)> {
        let (act, logp) = self.action_logp(&obs_to_tensor(obs, &self.device)?)?;
        Ok((tensor_to_continuous_act(&act)?, logp.to_vec1()?))
    }

    fn alpha(&self) -> Result<f32> {
        self.temperature.value()
    }

    fn update(&mut self, obs: &[Obs], critics: &[QNetwork]) -> Result<(f32, f32)> {
        trace!("SacActor::update() on {} samples", obs.len());
        let obs = obs_to_tensor(obs, &self.device)?;
        let (act, logp) = self.action_logp(&obs)?;

        let q = critics
            .iter()
            .map(|critic| critic.forward_continuous(&obs, &act))
            .collect::<Result<Vec<_>>>()?;
        let q_min = Tensor::stack(&q, 0)?.min(0)?;
        let alpha = self.temperature.alpha()?;
        let actor_loss = (logp.broadcast_mul(&alpha)? - q_min)?.mean_all()?;
        self.opt.backward_step(&actor_loss)?;

        let alpha_loss = self.temperature.update(&logp)?;
        Ok((actor_loss.to_scalar::<f32>()?, alpha_loss))
    }
}

impl Persistent for SacActor {
    /// Saves the actor together with its temperature.
    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save SAC actor to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Load SAC actor from {:?}", path);
        Ok(())
    }
}
