use super::MlpConfig;
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Returns the linear layers of [`MlpConfig`].
fn create_linear_layers(vb: VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let dims = std::iter::once(config.in_dim)
        .chain(config.units.iter().copied())
        .chain(std::iter::once(config.out_dim))
        .collect::<Vec<_>>();

    dims.windows(2)
        .enumerate()
        .map(|(i, w)| Ok(linear(w[0], w[1], vb.pp(format!("ln{}", i)))?))
        .collect()
}

/// Multilayer perceptron with ReLU activation function.
pub struct Mlp {
    layers: Vec<Linear>,
    activation_out: bool,
}

impl Mlp {
    /// Builds the layers with variables from `vb`.
    pub fn build(vb: VarBuilder, config: &MlpConfig) -> Result<Self> {
        Ok(Self {
            layers: create_linear_layers(vb, config)?,
            activation_out: config.activation_out,
        })
    }

    /// Applies the network to a batch of shape `(batch_size, in_dim)`.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        let n_layers = self.layers.len();
        let mut xs = xs.clone();

        for (i, layer) in self.layers.iter().enumerate() {
            xs = layer.forward(&xs)?;
            if i + 1 < n_layers || self.activation_out {
                xs = xs.relu()?;
            }
        }

        Ok(xs)
    }
}
