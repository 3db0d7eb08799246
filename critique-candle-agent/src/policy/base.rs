use super::MlpPolicyConfig;
use crate::{
    mlp::{Mlp, MlpConfig},
    opt::Optimizer,
    util::{
        continuous_act_to_tensor, discrete_act_to_tensor, normal_logp, obs_to_tensor,
        vars_with_prefix,
    },
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{
    init::Init,
    ops::{log_softmax, softmax},
    VarBuilder, VarMap,
};
use critique_core::{
    error::CritiqueError,
    record::{Record, RecordValue},
    stats,
    target::argmax,
    Act, ActionSpace, AwacPolicy, Obs, Persistent, PgPolicy, Policy,
};
use itertools::izip;
use log::{info, trace};
use rand::{distributions::WeightedIndex, prelude::Distribution, rngs::StdRng, SeedableRng};
use std::path::Path;

/// Value baseline with its optimizer.
struct Baseline {
    net: Mlp,
    opt: Optimizer,
}

/// Stochastic policy of an MLP.
///
/// Over a discrete action space the network outputs logits of a categorical
/// distribution. Over a continuous one it outputs the mean of a diagonal Gaussian
/// whose log standard deviation is a learned, state-independent parameter.
///
/// In training mode actions are sampled; in evaluation mode the most probable
/// action is taken, clipped to the action space.
pub struct MlpPolicy {
    device: Device,
    varmap: VarMap,
    action_space: ActionSpace,
    pi: Mlp,
    log_std: Option<Tensor>,
    opt: Optimizer,
    baseline: Option<Baseline>,
    rng: StdRng,
    train: bool,
}

impl MlpPolicy {
    /// Constructs [`MlpPolicy`].
    pub fn build(config: MlpPolicyConfig) -> Result<Self> {
        let device: Device = config.device.try_into()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let out_dim = config.action_space.dim();

        let pi = Mlp::build(
            vb.pp("policy"),
            &MlpConfig::new(config.obs_dim, config.units.clone(), out_dim, false),
        )?;
        let log_std = match config.action_space {
            ActionSpace::Discrete(_) => None,
            ActionSpace::Continuous { .. } => {
                Some(vb.pp("policy").get_with_hints(out_dim, "log_std", Init::Const(0.0))?)
            }
        };
        let opt = config
            .opt_config
            .build(vars_with_prefix(&varmap, "policy")?)?;

        let baseline = match config.nn_baseline {
            false => None,
            true => {
                let net = Mlp::build(
                    vb.pp("baseline"),
                    &MlpConfig::new(config.obs_dim, config.units.clone(), 1, false),
                )?;
                let opt = config
                    .baseline_opt_config
                    .build(vars_with_prefix(&varmap, "baseline")?)?;
                Some(Baseline { net, opt })
            }
        };

        Ok(Self {
            device,
            varmap,
            action_space: config.action_space,
            pi,
            log_std,
            opt,
            baseline,
            rng: StdRng::seed_from_u64(config.seed),
            train: true,
        })
    }

    /// Log-probabilities of the actions, of shape `(batch_size,)`.
    pub fn log_prob(&self, obs: &[Obs], act: &[Act]) -> Result<Tensor> {
        let out = self.pi.forward(&obs_to_tensor(obs, &self.device)?)?;

        match &self.log_std {
            None => {
                let logp = log_softmax(&out, D::Minus1)?;
                let ixs = discrete_act_to_tensor(act, &self.device)?.unsqueeze(1)?;
                Ok(logp.gather(&ixs, 1)?.squeeze(1)?)
            }
            Some(log_std) => {
                let a = continuous_act_to_tensor(act, &self.device)?;
                let z = a.broadcast_sub(&out)?.broadcast_div(&log_std.exp()?)?;
                Ok(normal_logp(&z)?.broadcast_sub(&log_std.sum_all()?)?)
            }
        }
    }

    fn probs(&self, obs: &[Obs]) -> Result<Vec<Vec<f32>>> {
        let logits = self.pi.forward(&obs_to_tensor(obs, &self.device)?)?;
        Ok(softmax(&logits, D::Minus1)?.to_vec2()?)
    }

    fn sample_batch(&mut self, obs: &[Obs]) -> Result<Vec<Act>> {
        match &self.action_space {
            ActionSpace::Discrete(_) => {
                let probs = self.probs(obs)?;
                if self.train {
                    probs
                        .iter()
                        .map(|p| -> Result<Act> {
                            Ok(Act::Discrete(WeightedIndex::new(p)?.sample(&mut self.rng)))
                        })
                        .collect()
                } else {
                    Ok(argmax(&probs).into_iter().map(Act::Discrete).collect())
                }
            }
            ActionSpace::Continuous { low, high } => {
                let mean = self.pi.forward(&obs_to_tensor(obs, &self.device)?)?;
                let a = match (&self.log_std, self.train) {
                    (Some(log_std), true) => {
                        let z = mean.randn_like(0.0, 1.0)?;
                        (z.broadcast_mul(&log_std.exp()?)? + &mean)?
                    }
                    _ => mean,
                };
                Ok(a.to_vec2::<f32>()?
                    .into_iter()
                    .map(|row| {
                        Act::Continuous(
                            izip!(row, low, high)
                                .map(|(v, l, h)| v.clamp(*l, *h))
                                .collect(),
                        )
                    })
                    .collect())
            }
        }
    }

    fn update_baseline(&mut self, obs: &[Obs], q_values: &[f32]) -> Result<Option<f32>> {
        let obs = obs_to_tensor(obs, &self.device)?;
        match &mut self.baseline {
            None => Ok(None),
            Some(baseline) => {
                let target = stats::standardize(q_values);
                let target = Tensor::from_vec(target, (q_values.len(),), &self.device)?;
                let pred = baseline.net.forward(&obs)?.squeeze(1)?;
                let loss = candle_nn::loss::mse(&pred, &target)?;
                baseline.opt.backward_step(&loss)?;
                Ok(Some(loss.to_scalar::<f32>()?))
            }
        }
    }
}

impl Policy for MlpPolicy {
    fn sample_action(&mut self, obs: &Obs) -> Result<Act> {
        self.sample_batch(std::slice::from_ref(obs))?
            .pop()
            .ok_or_else(|| {
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

impl PgPolicy for MlpPolicy {
    fn update(
        &mut self,
        obs: &[Obs],
        act: &[Act],
        advantages: &[f32],
        q_values: &[f32],
    ) -> Result<Record> {
        trace!("MlpPolicy::update() on {} samples", obs.len());
        let adv = Tensor::from_slice(advantages, (advantages.len(),), &self.device)?;
        let logp = self.log_prob(obs, act)?;
        let loss = (logp * adv)?.mean_all()?.neg()?;
        self.opt.backward_step(&loss)?;

        let mut record = Record::from_scalar("actor_loss", loss.to_scalar::<f32>()?);
        if let Some(baseline_loss) = self.update_baseline(obs, q_values)? {
            record.insert("baseline_loss", RecordValue::Scalar(baseline_loss));
        }
        Ok(record)
    }

    fn baseline(&self, obs: &[Obs]) -> Result<Option<Vec<f32>>> {
        match &self.baseline {
            None => Ok(None),
            Some(baseline) => {
                let pred = baseline
                    .net
                    .forward(&obs_to_tensor(obs, &self.device)?)?
                    .squeeze(1)?;
                Ok(Some(pred.to_vec1()?))
            }
        }
    }
}

impl AwacPolicy for MlpPolicy {
    fn action_probs(&self, obs: &[Obs]) -> Result<Vec<Vec<f32>>> {
        match self.action_space {
            ActionSpace::Discrete(_) => self.probs(obs),
            ActionSpace::Continuous { .. } => Err(CritiqueError::NotImplemented(
                "action probabilities of a Gaussian policy".into(),
            )
            .into()),
        }
    }

    fn sample_actions(&mut self, obs: &[Obs]) -> Result<Vec<Act>> {
        self.sample_batch(obs)
    }

    fn update(&mut self, obs: &[Obs], act: &[Act], weights: &[f32]) -> Result<f32> {
        let weights = Tensor::from_slice(weights, (weights.len(),), &self.device)?;
        let logp = self.log_prob(obs, act)?;
        let loss = (logp * weights)?.mean_all()?.neg()?;
        self.opt.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }
}

impl Persistent for MlpPolicy {
    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save policy to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Load policy from {:?}", path);
        Ok(())
    }
}
