//! Interface of neural networks used by the agent.
use anyhow::Result;
use candle_nn::VarBuilder;

/// Neural network model not owning its [`VarMap`] internally.
///
/// The variables are created through the given [`VarBuilder`], so the owner
/// of the [`VarMap`] (an [`Approximator`](crate::approximator::Approximator))
/// can initialize, optimize and release them.
///
/// [`VarMap`]: candle_nn::VarMap
pub trait SubModel1 {
    /// Configuration from which [`SubModel1`] is constructed.
    type Config;

    /// Input of the [`SubModel1`].
    type Input;

    /// Output of the [`SubModel1`].
    type Output;

    /// Builds [`SubModel1`] with [`VarBuilder`] and [`SubModel1::Config`].
    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// A generalized forward function.
    fn forward(&self, input: &Self::Input) -> Result<Self::Output>;
}
