use crate::Activation;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation: Activation,
    pub(super) activation_out: Activation,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `units` - Widths of the hidden layers. If empty, the network is a
    ///   single linear layer.
    /// * `activation` - Activation function applied after each hidden layer.
    /// * `activation_out` - Activation function applied to the output.
    pub fn new(
        in_dim: usize,
        units: Vec<usize>,
        out_dim: usize,
        activation: Activation,
        activation_out: Activation,
    ) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation,
            activation_out,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp2`](super::Mlp2).
pub struct Mlp2Config {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) out_dim: usize,
    pub(super) activation: Activation,
    pub(super) sigma_head: bool,
}

impl Mlp2Config {
    /// Creates configuration of [`Mlp2`](super::Mlp2).
    ///
    /// If `sigma_head` is `false`, only the mean head is built.
    pub fn new(
        in_dim: usize,
        units: Vec<usize>,
        out_dim: usize,
        activation: Activation,
        sigma_head: bool,
    ) -> Self {
        Self {
            in_dim,
            units,
            out_dim,
            activation,
            sigma_head,
        }
    }
}
