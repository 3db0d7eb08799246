//! Optimizers.
use anyhow::Result;
use candle_core::{Tensor, Var};
use candle_nn::{AdamW, Optimizer as _, ParamsAdamW};
use candle_optimisers::adam::{Adam, ParamsAdam};
use serde::{Deserialize, Serialize};

/// Optimizer of a network.
///
/// Moment decays and epsilon are left at the defaults of the underlying
/// optimizers; only the step size and weight decay are configurable.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OptimizerConfig {
    /// Adam without weight decay.
    Adam {
        /// Learning rate.
        lr: f64,
    },

    /// Adam with decoupled weight decay.
    AdamW {
        /// Learning rate.
        lr: f64,
        /// Weight decay, `ParamsAdamW::default().weight_decay` when omitted.
        #[serde(default)]
        weight_decay: Option<f64>,
    },
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self::Adam { lr: 3e-4 }
    }
}

impl OptimizerConfig {
    /// Step size.
    pub fn lr(&self) -> f64 {
        match self {
            Self::Adam { lr } | Self::AdamW { lr, .. } => *lr,
        }
    }

    /// Builds an optimizer over `vars`.
    pub fn build(&self, vars: Vec<Var>) -> Result<Optimizer> {
        match self {
            Self::Adam { lr } => {
                let params = ParamsAdam {
                    lr: *lr,
                    ..ParamsAdam::default()
                };
                Ok(Optimizer::Adam(Adam::new(vars, params)?))
            }
            Self::AdamW { lr, weight_decay } => {
                let defaults = ParamsAdamW::default();
                let params = ParamsAdamW {
                    lr: *lr,
                    weight_decay: weight_decay.unwrap_or(defaults.weight_decay),
                    ..defaults
                };
                Ok(Optimizer::AdamW(AdamW::new(vars, params)?))
            }
        }
    }
}

/// A built optimizer.
pub enum Optimizer {
    /// See [`OptimizerConfig::Adam`].
    Adam(Adam),

    /// See [`OptimizerConfig::AdamW`].
    AdamW(AdamW),
}

impl Optimizer {
    /// Back-propagates `loss` and steps the variables of this optimizer.
    ///
    /// Gradients reaching variables outside the optimizer are discarded.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::Adam(opt) => opt.backward_step(loss)?,
            Self::AdamW(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use candle_core::{DType, Device};

    #[test]
    fn test_step_moves_only_own_vars() -> Result<()> {
        let x = Var::ones(1, DType::F32, &Device::Cpu)?;
        let y = Var::ones(1, DType::F32, &Device::Cpu)?;
        let config = OptimizerConfig::AdamW {
            lr: 0.1,
            weight_decay: None,
        };
        assert_eq!(config.lr(), 0.1);
        let mut opt = config.build(vec![x.clone()])?;

        let loss = (x.as_tensor() * y.as_tensor())?.sum_all()?;
        opt.backward_step(&loss)?;
        assert!(x.as_tensor().to_vec1::<f32>()?[0] < 1.0);
        assert_eq!(y.as_tensor().to_vec1::<f32>()?[0], 1.0);
        Ok(())
    }
}
