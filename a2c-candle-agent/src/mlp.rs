//! Multilayer perceptron.
mod base;
mod config;
mod mlp2;
use crate::Activation;
use anyhow::Result;
pub use base::Mlp;
use candle_core::Tensor;
use candle_nn::{linear, Linear, Module, VarBuilder};
pub use config::{Mlp2Config, MlpConfig};
pub use mlp2::Mlp2;

/// Creates linear layers `in_dim -> units[0] -> ... -> units[n-1]`.
fn create_linear_layers(vb: &VarBuilder, in_dim: usize, units: &[usize]) -> Result<Vec<Linear>> {
    let mut dims = vec![in_dim];
    dims.extend_from_slice(units);

    dims.windows(2)
        .enumerate()
        .map(|(i, d)| -> Result<Linear> { Ok(linear(d[0], d[1], vb.pp(format!("ln{}", i)))?) })
        .collect()
}

/// Applies `layers`, each followed by `act`.
fn mlp_forward(xs: &Tensor, layers: &[Linear], act: &Activation) -> Result<Tensor> {
    let mut xs = xs.clone();
    for layer in layers.iter() {
        xs = act.forward(&layer.forward(&xs)?)?;
    }
    Ok(xs)
}

/// Width of the features after the hidden layers.
fn feature_dim(in_dim: usize, units: &[usize]) -> usize {
    *units.last().unwrap_or(&in_dim)
}
