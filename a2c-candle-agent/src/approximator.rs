//! Trainable function approximator.
use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
};
use a2c_core::error::A2cError;
use anyhow::{anyhow, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{loss::mse, VarBuilder, VarMap};
use log::{info, trace};
use rand::Rng;

/// A neural network together with its variables and optimizer.
///
/// The variables live in a [`VarMap`] owned by the approximator, which lets
/// it re-initialize them, step them with its optimizer and release them with
/// [`Approximator::dispose`].
pub struct Approximator<M: SubModel1> {
    name: String,
    device: Device,
    varmap: VarMap,
    model: Option<M>,
    opt: Option<Optimizer>,
}

impl<M> Approximator<M>
where
    M: SubModel1<Input = Tensor>,
{
    /// Builds the network and its optimizer.
    ///
    /// `name` prefixes the variable names.
    pub fn build(
        name: &str,
        config: M::Config,
        opt_config: &OptimizerConfig,
        device: Device,
    ) -> Result<Self> {
        let varmap = VarMap::new();
        let model = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device).set_prefix(name);
            M::build(vb, config)?
        };
        let opt = opt_config.build(varmap.all_vars())?;
        info!("Built {} with {} variables", name, varmap.all_vars().len());

        Ok(Self {
            name: name.to_string(),
            device,
            varmap,
            model: Some(model),
            opt: Some(opt),
        })
    }

    /// Returns the network, or an error after [`Approximator::dispose`].
    pub fn model(&self) -> Result<&M> {
        self.model.as_ref().ok_or_else(|| A2cError::Disposed.into())
    }

    fn opt_mut(&mut self) -> Result<&mut Optimizer> {
        self.opt.as_mut().ok_or_else(|| A2cError::Disposed.into())
    }

    /// Forward pass.
    pub fn predict(&self, xs: &Tensor) -> Result<M::Output> {
        self.model()?.forward(xs)
    }

    /// Takes one optimizer step on the loss returned by `loss_fn`.
    ///
    /// `loss_fn` receives the network and must return a scalar tensor.
    /// Returns the value of the loss before the step.
    pub fn minimize<F>(&mut self, loss_fn: F) -> Result<f32>
    where
        F: FnOnce(&M) -> Result<Tensor>,
    {
        let loss = loss_fn(self.model()?)?;
        self.opt_mut()?.backward_step(&loss)?;
        Ok(loss.to_scalar::<f32>()?)
    }

    /// Current learning rate of the optimizer.
    pub fn learning_rate(&self) -> Result<f64> {
        match &self.opt {
            Some(opt) => Ok(opt.learning_rate()),
            None => Err(A2cError::Disposed.into()),
        }
    }

    /// Sets the learning rate used by later updates.
    pub fn set_learning_rate(&mut self, lr: f64) -> Result<()> {
        self.opt_mut()?.set_learning_rate(lr);
        Ok(())
    }

    /// Initializes weights uniformly in `[lo, up]` and biases with zeros.
    ///
    /// Variables are visited in the order of their names, so the result only
    /// depends on the state of `rng`.
    pub fn init_uniform<R: Rng + ?Sized>(&mut self, rng: &mut R, lo: f32, up: f32) -> Result<()> {
        let data = self
            .varmap
            .data()
            .lock()
            .map_err(|e| anyhow!("Failed to lock variables: {}", e))?;
        let mut names = data.keys().cloned().collect::<Vec<_>>();
        names.sort();

        for name in names.iter() {
            let var = &data[name];
            let shape = var.shape().clone();
            let t = match name.ends_with("bias") {
                true => Tensor::zeros(shape, DType::F32, &self.device)?,
                false => {
                    let values = (0..shape.elem_count())
                        .map(|_| rng.gen_range(lo..=up))
                        .collect::<Vec<f32>>();
                    Tensor::from_vec(values, shape, &self.device)?
                }
            };
            var.set(&t)?;
            trace!("Initialized {}", name);
        }

        Ok(())
    }

    /// Releases the network, its variables and the optimizer state.
    ///
    /// Calling it again does nothing.
    pub fn dispose(&mut self) -> Result<()> {
        if self.model.is_none() {
            return Ok(());
        }
        self.opt = None;
        self.model = None;
        self.varmap
            .data()
            .lock()
            .map_err(|e| anyhow!("Failed to lock variables: {}", e))?
            .clear();
        info!("Disposed {}", self.name);
        Ok(())
    }

    /// Returns `true` after [`Approximator::dispose`].
    pub fn is_disposed(&self) -> bool {
        self.model.is_none()
    }

    /// The number of scalar parameters.
    pub fn num_params(&self) -> usize {
        self.varmap.all_vars().iter().map(|v| v.elem_count()).sum()
    }
}

impl<M> Approximator<M>
where
    M: SubModel1<Input = Tensor, Output = Tensor>,
{
    /// Regresses the output on `ys` with mean squared error.
    ///
    /// Takes one full-batch optimizer step per epoch and returns the loss of
    /// each epoch.
    pub fn fit(&mut self, xs: &Tensor, ys: &Tensor, epochs: usize) -> Result<Vec<f32>> {
        (0..epochs)
            .map(|_| self.minimize(|model| Ok(mse(&model.forward(xs)?, ys)?)))
            .collect()
    }
}
