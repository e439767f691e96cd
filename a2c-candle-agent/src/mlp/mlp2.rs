use super::{create_linear_layers, feature_dim, mlp_forward, Mlp2Config};
use crate::{model::SubModel1, Activation};
use anyhow::Result;
use candle_core::{Device, Module, Tensor};
use candle_nn::{linear, Linear, VarBuilder};

/// Multilayer perceptron with a mean head and an optional sigma head.
///
/// The mean goes through `tanh`, so it lies in `(-1, 1)`. The sigma, if the
/// head exists, goes through a sigmoid and lies in `(0, 1)`.
pub struct Mlp2 {
    config: Mlp2Config,
    device: Device,
    layers: Vec<Linear>,
    mean: Linear,
    sigma: Option<Linear>,
}

impl SubModel1 for Mlp2 {
    type Config = Mlp2Config;
    type Input = Tensor;
    type Output = (Tensor, Option<Tensor>);

    fn forward(&self, xs: &Self::Input) -> Result<Self::Output> {
        let xs = xs.to_device(&self.device)?;
        let xs = mlp_forward(&xs, &self.layers, &self.config.activation)?;
        let mean = Activation::Tanh.forward(&self.mean.forward(&xs)?)?;
        let sigma = match &self.sigma {
            Some(head) => Some(Activation::Sigmoid.forward(&head.forward(&xs)?)?),
            None => None,
        };
        Ok((mean, sigma))
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let vb = vb.pp("mlp");
        let layers = create_linear_layers(&vb, config.in_dim, &config.units)?;
        let in_dim = feature_dim(config.in_dim, &config.units);
        let mean = linear(in_dim, config.out_dim, vb.pp("mean"))?;
        let sigma = match config.sigma_head {
            true => Some(linear(in_dim, config.out_dim, vb.pp("sigma"))?),
            false => None,
        };

        Ok(Self {
            config,
            device,
            layers,
            mean,
            sigma,
        })
    }
}
