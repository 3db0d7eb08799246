use super::RndConfig;
use crate::{
    mlp::{Mlp, MlpConfig},
    opt::Optimizer,
    util::{obs_to_tensor, vars_with_prefix},
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::{VarBuilder, VarMap};
use critique_core::{NoveltyModel, Obs, Persistent};
use log::info;
use std::path::Path;

/// Novelty bonus by random network distillation.
///
/// A predictor is trained to match the features of a fixed, randomly initialized
/// target network. The bonus of an observation is the L2 norm of the prediction
/// error, which stays large for observations rarely seen in training.
pub struct RndModel {
    device: Device,
    varmap: VarMap,
    target: Mlp,
    predictor: Mlp,
    opt: Optimizer,
}

impl RndModel {
    /// Constructs [`RndModel`].
    pub fn build(config: RndConfig) -> Result<Self> {
        let device: Device = config.device.try_into()?;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let mlp_config =
            MlpConfig::new(config.obs_dim, config.units.clone(), config.out_dim, false);
        let target = Mlp::build(vb.pp("target"), &mlp_config)?;
        let predictor = Mlp::build(vb.pp("predictor"), &mlp_config)?;
        let opt = config
            .opt_config
            .build(vars_with_prefix(&varmap, "predictor")?)?;

        Ok(Self {
            device,
            varmap,
            target,
            predictor,
            opt,
        })
    }

    fn error(&self, obs: &[Obs]) -> Result<Tensor> {
        let obs = obs_to_tensor(obs, &self.device)?;
        let f = self.target.forward(&obs)?.detach();
        let f_hat = self.predictor.forward(&obs)?;
        Ok((f - f_hat)?.sqr()?.sum(D::Minus1)?.sqrt()?)
    }
}

impl NoveltyModel for RndModel {
    fn bonus(&self, obs: &[Obs]) -> Result<Vec<f32>> {
        Ok(self.error(obs)?.to_vec1()?)
    }

    fn update(&mut self, obs: &[Obs]) -> Result<f32> {
        let loss = self.error(obs)?.mean_all()?;
        self.opt.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }
}

impl Persistent for RndModel {
    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save RND model to {:?}", path);
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        info!("Load RND model from {:?}", path);
        Ok(())
    }
}
