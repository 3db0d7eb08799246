//! Temperature of SAC.
use crate::{
    opt::{Optimizer, OptimizerConfig},
    util::vars_with_prefix,
};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{init::Init, VarBuilder, VarMap};
use serde::{Deserialize, Serialize};

/// Mode of the temperature of SAC.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum TemperatureMode {
    /// Use a constant as alpha.
    Fixed(f64),

    /// Automatic tuning toward a target entropy.
    Auto {
        /// Initial value of alpha.
        init: f64,
        /// Target entropy, typically `-act_dim`.
        target_entropy: f64,
        /// Learning rate of `log_alpha`.
        lr: f64,
    },
}

impl Default for TemperatureMode {
    fn default() -> Self {
        Self::Auto {
            init: 1.0,
            target_entropy: -1.0,
            lr: 3e-4,
        }
    }
}

/// The temperature of SAC, stored as `log_alpha` in the var map of the actor.
pub struct Temperature {
    log_alpha: Tensor,
    target_entropy: Option<f64>,
    opt: Option<Optimizer>,
}

impl Temperature {
    /// Creates `log_alpha` under the prefix of `vb`.
    ///
    /// `varmap` must be the var map behind `vb`; its variables under `prefix` are
    /// handed to the optimizer in auto mode.
    pub fn build(
        vb: VarBuilder,
        varmap: &VarMap,
        prefix: &str,
        mode: &TemperatureMode,
    ) -> Result<Self> {
        let vb = vb.pp(prefix);
        match mode {
            TemperatureMode::Fixed(alpha) => {
                let log_alpha = vb.get_with_hints(1, "log_alpha", Init::Const(alpha.ln()))?;
                Ok(Self {
                    log_alpha,
                    target_entropy: None,
                    opt: None,
                })
            }
            TemperatureMode::Auto {
                init,
                target_entropy,
                lr,
            } => {
                let log_alpha = vb.get_with_hints(1, "log_alpha", Init::Const(init.ln()))?;
                let opt = OptimizerConfig::Adam { lr: *lr }
                    .build(vars_with_prefix(varmap, prefix)?)?;
                Ok(Self {
                    log_alpha,
                    target_entropy: Some(*target_entropy),
                    opt: Some(opt),
                })
            }
        }
    }

    /// Alpha as a detached tensor of shape `(1,)`.
    pub fn alpha(&self) -> Result<Tensor> {
        Ok(self.log_alpha.detach().exp()?)
    }

    /// Alpha as a scalar.
    pub fn value(&self) -> Result<f32> {
        Ok(self.alpha()?.squeeze(0)?.to_scalar::<f32>()?)
    }

    /// Moves `log_alpha` toward the target entropy given log-probabilities of
    /// sampled actions and returns the loss. A fixed temperature returns 0.
    pub fn update(&mut self, logp: &Tensor) -> Result<f32> {
        match (&mut self.opt, self.target_entropy) {
            (Some(opt), Some(target_entropy)) => {
                let loss = self
                    .log_alpha
                    .broadcast_mul(&(logp + target_entropy)?.detach())?
                    .mean_all()?
                    .neg()?;
                opt.backward_step(&loss)?;
                Ok(loss.to_scalar::<f32>()?)
            }
            _ => Ok(0.0),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device};

    fn build(mode: &TemperatureMode) -> Result<(VarMap, Temperature)> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let temperature = Temperature::build(vb, &varmap, "temperature", mode)?;
        Ok((varmap, temperature))
    }

    #[test]
    fn test_fixed_temperature() -> Result<()> {
        let (_varmap, mut temperature) = build(&TemperatureMode::Fixed(0.2))?;
        assert!((temperature.value()? - 0.2).abs() < 1e-6);
        let logp = Tensor::new(&[-3.0f32, -4.0], &Device::Cpu)?;
        assert_eq!(temperature.update(&logp)?, 0.0);
        assert!((temperature.value()? - 0.2).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn test_auto_temperature_follows_entropy() -> Result<()> {
        let mode = TemperatureMode::Auto {
            init: 1.0,
            target_entropy: -1.0,
            lr: 0.1,
        };

        // Entropy above the target lowers alpha
        let (_varmap, mut temperature) = build(&mode)?;
        let logp = Tensor::new(&[-3.0f32, -3.0], &Device::Cpu)?;
        temperature.update(&logp)?;
        assert!(temperature.value()? < 1.0);

        // Entropy below the target raises alpha
        let (_varmap, mut temperature) = build(&mode)?;
        let logp = Tensor::new(&[3.0f32, 3.0], &Device::Cpu)?;
        temperature.update(&logp)?;
        assert!(temperature.value()? > 1.0);
        Ok(())
    }
}
