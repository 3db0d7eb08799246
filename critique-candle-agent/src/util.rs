//! Utilities.
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor, Var, D};
use candle_nn::VarMap;
use critique_core::{error::check_len, Act, Obs};
use log::trace;
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, convert::TryFrom, sync::MutexGuard};

/// Critic loss type.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Default)]
pub enum CriticLoss {
    /// Mean squared error.
    #[default]
    Mse,

    /// Smooth L1 loss.
    SmoothL1,
}

impl CriticLoss {
    /// Loss between predictions and targets.
    pub fn loss(&self, pred: &Tensor, target: &Tensor) -> Result<Tensor> {
        Ok(match self {
            Self::Mse => candle_nn::loss::mse(pred, target)?,
            Self::SmoothL1 => smooth_l1_loss(pred, target)?,
        })
    }
}

fn lock(varmap: &VarMap) -> Result<MutexGuard<'_, HashMap<String, Var>>> {
    varmap
        .data()
        .lock()
        .map_err(|_| anyhow!("variables are locked by a panicked thread"))
}

/// Apply soft update on variables.
///
/// Variables are identified by their names.
///
/// dest = tau * src + (1.0 - tau) * dest
pub fn track(dest: &VarMap, src: &VarMap, tau: f64) -> Result<()> {
    trace!("track() with tau = {}", tau);
    let dest = lock(dest)?;
    let src = lock(src)?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| anyhow!("variable {} is missing in the source", k))?;
        let t_dest = ((tau * v_src.as_tensor())? + ((1.0 - tau) * v_dest.as_tensor())?)?;
        v_dest.set(&t_dest)?;
    }

    Ok(())
}

/// Copies the values of variables with the same names.
pub fn copy_vars(dest: &VarMap, src: &VarMap) -> Result<()> {
    let dest = lock(dest)?;
    let src = lock(src)?;

    for (k, v_dest) in dest.iter() {
        let v_src = src
            .get(k)
            .ok_or_else(|| anyhow!("variable {} is missing in the source", k))?;
        v_dest.set(v_src.as_tensor())?;
    }

    Ok(())
}

/// Variables whose names start with `prefix`, sorted by name.
pub fn vars_with_prefix(varmap: &VarMap, prefix: &str) -> Result<Vec<Var>> {
    let data = lock(varmap)?;
    let mut vars = data
        .iter()
        .filter(|(k, _)| k.starts_with(prefix))
        .collect::<Vec<_>>();
    vars.sort_by(|a, b| a.0.cmp(b.0));
    Ok(vars.into_iter().map(|(_, v)| v.clone()).collect())
}

/// See <https://pytorch.org/docs/stable/generated/torch.nn.SmoothL1Loss.html>.
pub fn smooth_l1_loss(x: &Tensor, y: &Tensor) -> Result<Tensor, candle_core::Error> {
    let device = x.device();
    let d = (x - y)?.abs()?;
    let m1 = d.lt(1.0)?.to_dtype(DType::F32)?.to_device(device)?;
    let m2 = Tensor::try_from(1f32)?
        .to_device(device)?
        .broadcast_sub(&m1)?;
    (((0.5 * m1)? * d.powf(2.0))? + m2 * (d - 0.5))?.mean_all()
}

/// Log density of the standard normal distribution, summed over the last axis.
pub fn normal_logp(z: &Tensor) -> Result<Tensor> {
    let tmp: Tensor = ((-0.5 * (2.0 * std::f32::consts::PI).ln() as f64) - (0.5 * z.powf(2.0)?)?)?;
    Ok(tmp.sum(D::Minus1)?)
}

/// Stacks observations into a tensor of shape `(batch_size, obs_dim)`.
pub fn obs_to_tensor(obs: &[Obs], device: &Device) -> Result<Tensor> {
    let dim = obs.first().map_or(0, |o| o.len());
    let mut data = Vec::with_capacity(obs.len() * dim);
    for o in obs {
        check_len("observation", dim, o.len())?;
        data.extend_from_slice(o);
    }
    Ok(Tensor::from_vec(data, (obs.len(), dim), device)?)
}

/// Indices of discrete actions as a `u32` tensor of shape `(batch_size,)`.
pub fn discrete_act_to_tensor(act: &[Act], device: &Device) -> Result<Tensor> {
    let ixs = act
        .iter()
        .map(|a| a.discrete().map(|i| i as u32))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Tensor::from_vec(ixs, (act.len(),), device)?)
}

/// Continuous actions as a tensor of shape `(batch_size, act_dim)`.
pub fn continuous_act_to_tensor(act: &[Act], device: &Device) -> Result<Tensor> {
    let rows = act
        .iter()
        .map(|a| a.continuous().map(|v| v.to_vec()))
        .collect::<Result<Vec<_>, _>>()?;
    obs_to_tensor(&rows, device)
}

/// A vector as a tensor of shape `(len,)`.
pub fn vec_to_tensor(v: &[f32], device: &Device) -> Result<Tensor> {
    Ok(Tensor::from_slice(v, (v.len(),), device)?)
}

/// Rows of a tensor of shape `(batch_size, dim)` as continuous actions.
pub fn tensor_to_continuous_act(t: &Tensor) -> Result<Vec<Act>> {
    Ok(t.to_vec2::<f32>()?
        .into_iter()
        .map(Act::Continuous)
        .collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_nn::Init;

    fn varmap(name: &str, values: &[f32]) -> Result<VarMap> {
        let vm = VarMap::new();
        let init = Init::Randn {
            mean: 0.0,
            stdev: 1.0,
        };
        vm.get((values.len(),), name, init, DType::F32, &Device::Cpu)?;
        let t = Tensor::from_slice(values, (values.len(),), &Device::Cpu)?;
        lock(&vm)?
            .get(name)
            .ok_or_else(|| anyhow!("no {}", name))?
            .set(&t)?;
        Ok(vm)
    }

    fn values(vm: &VarMap, name: &str) -> Result<Vec<f32>> {
        Ok(lock(vm)?
            .get(name)
            .ok_or_else(|| anyhow!("no {}", name))?
            .as_tensor()
            .to_vec1()?)
    }

    #[test]
    fn test_track() -> Result<()> {
        let vm_src = varmap("var1", &[1.0, 2.0, 3.0])?;
        let vm_dest = varmap("var1", &[4.0, 5.0, 6.0])?;
        track(&vm_dest, &vm_src, 0.5)?;
        assert_eq!(values(&vm_dest, "var1")?, vec![2.5, 3.5, 4.5]);
        assert_eq!(values(&vm_src, "var1")?, vec![1.0, 2.0, 3.0]);

        copy_vars(&vm_dest, &vm_src)?;
        assert_eq!(values(&vm_dest, "var1")?, vec![1.0, 2.0, 3.0]);

        // The copy does not share storage with the source
        lock(&vm_src)?
            .get("var1")
            .ok_or_else(|| anyhow!("no var1"))?
            .set(&Tensor::zeros((3,), DType::F32, &Device::Cpu)?)?;
        assert_eq!(values(&vm_dest, "var1")?, vec![1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_track_missing_variable() -> Result<()> {
        let vm_src = varmap("var1", &[1.0])?;
        let vm_dest = varmap("var2", &[1.0])?;
        assert!(track(&vm_dest, &vm_src, 0.5).is_err());
        Ok(())
    }

    #[test]
    fn test_smooth_l1_loss() -> Result<()> {
        let x = Tensor::new(&[0.0f32, 0.0], &Device::Cpu)?;
        let y = Tensor::new(&[0.5f32, 3.0], &Device::Cpu)?;
        // (0.5 * 0.25 + 2.5) / 2
        let loss = smooth_l1_loss(&x, &y)?.to_scalar::<f32>()?;
        assert!((loss - 1.3125).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_obs_to_tensor_checks_dims() -> Result<()> {
        let t = obs_to_tensor(&[vec![1.0, 2.0], vec![3.0, 4.0]], &Device::Cpu)?;
        assert_eq!(t.dims(), [2, 2]);
        assert!(obs_to_tensor(&[vec![1.0, 2.0], vec![3.0]], &Device::Cpu).is_err());
        Ok(())
    }
}
