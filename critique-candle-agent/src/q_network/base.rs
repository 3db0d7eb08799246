use super::QNetworkConfig;
use crate::{
    mlp::{Mlp, MlpConfig},
    opt::Optimizer,
    util::{
        continuous_act_to_tensor, copy_vars, discrete_act_to_tensor, obs_to_tensor, track,
        vec_to_tensor, CriticLoss,
    },
};
use anyhow::Result;
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use critique_core::{
    error::{check_len, CritiqueError},
    target::SyncMode,
    Act, ActionSpace, ActionValueFunction, Obs, Persistent,
};
use log::{info, trace};
use std::path::Path;

fn build_net(varmap: &VarMap, config: &QNetworkConfig, device: &Device) -> Result<Mlp> {
    let vb = VarBuilder::from_varmap(varmap, DType::F32, device);
    let (in_dim, out_dim) = match &config.action_space {
        ActionSpace::Discrete(n) => (config.obs_dim, *n),
        ActionSpace::Continuous { low, .. } => (config.obs_dim + low.len(), 1),
    };
    Mlp::build(
        vb.pp("q"),
        &MlpConfig::new(in_dim, config.units.clone(), out_dim, false),
    )
}

/// Action-value function of an MLP with a target copy.
///
/// The live and target networks live in separate var maps with identical
/// variable names. Only the live network has an optimizer.
pub struct QNetwork {
    device: Device,
    action_space: ActionSpace,
    varmap: VarMap,
    varmap_tgt: VarMap,
    net: Mlp,
    net_tgt: Mlp,
    opt: Optimizer,
    critic_loss: CriticLoss,
}

impl QNetwork {
    /// Constructs [`QNetwork`]. The target starts as a copy of the live network.
    pub fn build(config: QNetworkConfig) -> Result<Self> {
        let device: Device = config.device.try_into()?;
        let varmap = VarMap::new();
        let varmap_tgt = VarMap::new();
        let net = build_net(&varmap, &config, &device)?;
        let net_tgt = build_net(&varmap_tgt, &config, &device)?;
        copy_vars(&varmap_tgt, &varmap)?;
        let opt = config.opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            action_space: config.action_space,
            varmap,
            varmap_tgt,
            net,
            net_tgt,
            opt,
            critic_loss: config.critic_loss,
        })
    }

    /// `Q(s, a)` of the live network over a continuous action space, of shape
    /// `(batch_size,)`.
    ///
    /// Gradients flow back to `act`, which the SAC actor relies on.
    pub fn forward_continuous(&self, obs: &Tensor, act: &Tensor) -> Result<Tensor> {
        let xs = Tensor::cat(&[obs, act], 1)?;
        Ok(self.net.forward(&xs)?.squeeze(1)?)
    }

    fn forward(&self, net: &Mlp, obs: &[Obs], act: &[Act]) -> Result<Tensor> {
        check_len("actions", obs.len(), act.len())?;
        let obs = obs_to_tensor(obs, &self.device)?;
        match self.action_space {
            ActionSpace::Discrete(_) => {
                let ixs = discrete_act_to_tensor(act, &self.device)?.unsqueeze(1)?;
                Ok(net.forward(&obs)?.gather(&ixs, 1)?.squeeze(1)?)
            }
            ActionSpace::Continuous { .. } => {
                let act = continuous_act_to_tensor(act, &self.device)?;
                let xs = Tensor::cat(&[&obs, &act], 1)?;
                Ok(net.forward(&xs)?.squeeze(1)?)
            }
        }
    }
}

impl ActionValueFunction for QNetwork {
    fn q_values(&self, obs: &[Obs], act: &[Act]) -> Result<Vec<f32>> {
        Ok(self.forward(&self.net, obs, act)?.to_vec1()?)
    }

    fn target_q_values(&self, obs: &[Obs], act: &[Act]) -> Result<Vec<f32>> {
        Ok(self.forward(&self.net_tgt, obs, act)?.to_vec1()?)
    }

    fn all_q_values(&self, obs: &[Obs], target: bool) -> Result<Vec<Vec<f32>>> {
        if !self.action_space.is_discrete() {
            return Err(CritiqueError::NotImplemented(
                "action values over a continuous action space".into(),
            )
            .into());
        }
        let net = if target { &self.net_tgt } else { &self.net };
        Ok(net.forward(&obs_to_tensor(obs, &self.device)?)?.to_vec2()?)
    }

    fn fit(&mut self, obs: &[Obs], act: &[Act], target: &[f32]) -> Result<f32> {
        check_len("regression targets", obs.len(), target.len())?;
        let pred = self.forward(&self.net, obs, act)?;
        let target = vec_to_tensor(target, &self.device)?;
        let loss = self.critic_loss.loss(&pred, &target)?;
        self.opt.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    fn sync_target(&mut self, mode: &SyncMode) -> Result<()> {
        trace!("QNetwork::sync_target({:?})", mode);
        match mode {
            SyncMode::Hard => copy_vars(&self.varmap_tgt, &self.varmap),
            SyncMode::Soft { tau } => track(&self.varmap_tgt, &self.varmap, *tau),
        }
    }
}

impl Persistent for QNetwork {
    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save Q-network to {:?}", path);
        Ok(())
    }

    /// Loads the live network and copies it into the target.
    fn load(&mut self, path: &Path) -> Result<()> {
        self.varmap.load(path)?;
        copy_vars(&self.varmap_tgt, &self.varmap)?;
        info!("Load Q-network from {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::opt::OptimizerConfig;
    use tempdir::TempDir;

    fn discrete() -> Result<QNetwork> {
        QNetwork::build(
            QNetworkConfig::default()
                .obs_dim(2)
                .action_space(ActionSpace::Discrete(3))
                .units(vec![16])
                .opt_config(OptimizerConfig::Adam { lr: 1e-2 }),
        )
    }

    fn obs() -> Vec<Obs> {
        vec![vec![0.0, 1.0], vec![1.0, 0.0]]
    }

    #[test]
    fn test_discrete_q_values_match_rows() -> Result<()> {
        let qnet = discrete()?;
        let all = qnet.all_q_values(&obs(), false)?;
        let q = qnet.q_values(&obs(), &[Act::Discrete(2), Act::Discrete(0)])?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].len(), 3);
        assert!((q[0] - all[0][2]).abs() < 1e-6);
        assert!((q[1] - all[1][0]).abs() < 1e-6);

        // The target starts as a copy
        assert_eq!(all, qnet.all_q_values(&obs(), true)?);
        Ok(())
    }

    #[test]
    fn test_fit_and_sync() -> Result<()> {
        let mut qnet = discrete()?;
        let act = [Act::Discrete(1), Act::Discrete(1)];
        let target = [1.0, -1.0];
        let loss0 = qnet.fit(&obs(), &act, &target)?;
        let mut loss = loss0;
        for _ in 0..50 {
            loss = qnet.fit(&obs(), &act, &target)?;
        }
        assert!(loss < loss0);

        // The target network does not follow the gradient steps
        let q = qnet.q_values(&obs(), &act)?;
        let q_tgt = qnet.target_q_values(&obs(), &act)?;
        assert_ne!(q, q_tgt);

        qnet.sync_target(&SyncMode::Soft { tau: 0.5 })?;
        let q_half = qnet.target_q_values(&obs(), &act)?;
        assert_ne!(q_half, q_tgt);

        qnet.sync_target(&SyncMode::Hard)?;
        assert_eq!(q, qnet.target_q_values(&obs(), &act)?);
        Ok(())
    }

    #[test]
    fn test_continuous_head() -> Result<()> {
        let qnet = QNetwork::build(
            QNetworkConfig::default()
                .obs_dim(2)
                .action_space(ActionSpace::continuous(1, -1.0, 1.0))
                .units(vec![8]),
        )?;
        let act = [Act::Continuous(vec![0.5]), Act::Continuous(vec![-0.5])];
        assert_eq!(qnet.q_values(&obs(), &act)?.len(), 2);
        assert!(qnet.all_q_values(&obs(), false).is_err());
        assert!(qnet.q_values(&obs(), &act[..1]).is_err());
        Ok(())
    }

    #[test]
    fn test_load_copies_target() -> Result<()> {
        let mut qnet = discrete()?;
        let act = [Act::Discrete(0), Act::Discrete(0)];
        for _ in 0..10 {
            qnet.fit(&obs(), &act, &[2.0, 2.0])?;
        }
        let dir = TempDir::new("q_network")?;
        let path = dir.path().join("q.safetensors");
        qnet.save(&path)?;

        let mut qnet_ = discrete()?;
        qnet_.load(&path)?;
        assert_eq!(qnet.q_values(&obs(), &act)?, qnet_.q_values(&obs(), &act)?);
        assert_eq!(
            qnet_.q_values(&obs(), &act)?,
            qnet_.target_q_values(&obs(), &act)?
        );
        Ok(())
    }
}
