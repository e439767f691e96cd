use super::{create_linear_layers, feature_dim, mlp_forward, MlpConfig};
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Multilayer perceptron with a single output.
///
/// The critic of the agent is an [`Mlp`] with one `tanh` output.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
    head: Linear,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let xs = xs.to_device(&self.device)?;
        let xs = mlp_forward(&xs, &self.layers, &self.config.activation)?;
        self.config.activation_out.forward(&self.head.forward(&xs)?)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let vb = vb.pp("mlp");
        let layers = create_linear_layers(&vb, config.in_dim, &config.units)?;
        let head = linear(
            feature_dim(config.in_dim, &config.units),
            config.out_dim,
            vb.pp("head"),
        )?;

        Ok(Self {
            config,
            device,
            layers,
            head,
        })
    }
}
