//! Gaussian advantage actor-critic agent implemented with
//! [candle](https://crates.io/crates/candle-core).
//!
//! The agent [`a2c::A2c`] owns two [`approximator::Approximator`]s, an actor
//! producing the parameters of a Gaussian policy and a critic estimating the
//! state value. It implements [`a2c_core::Agent`] and can be driven by
//! [`a2c_core::Trainer`].
pub mod a2c;
pub mod approximator;
pub mod mlp;
pub mod model;
pub mod opt;
use anyhow::Result;
use candle_core::Tensor;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl Device {
    /// Creates the corresponding [`candle_core::Device`].
    ///
    /// Fails if the CUDA device is not available.
    pub fn to_candle(self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::new_cuda(n)?),
        }
    }
}

/// Activation function.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
pub enum Activation {
    /// Identity.
    None,

    /// Rectified linear unit.
    ReLU,

    /// Hyperbolic tangent.
    Tanh,

    /// Logistic sigmoid.
    Sigmoid,
}

impl Activation {
    /// Applies the activation function.
    pub fn forward(&self, xs: &Tensor) -> Result<Tensor> {
        Ok(match self {
            Self::None => xs.clone(),
            Self::ReLU => xs.relu()?,
            Self::Tanh => xs.tanh()?,
            Self::Sigmoid => candle_nn::ops::sigmoid(xs)?,
        })
    }
}
