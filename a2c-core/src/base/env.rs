//! Environment.
use super::Step;
use anyhow::Result;

/// Represents an environment with a continuous action space.
///
/// Observations and actions cross this boundary as plain `f32` vectors;
/// agents convert them into whatever tensor type their backend uses.
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Builds an environment with a given random seed.
    fn build(config: &Self::Config, seed: i64) -> Result<Self>
    where
        Self: Sized;

    /// Dimension of the observation vector.
    ///
    /// Agents read it once, when their networks are constructed.
    fn state_dim(&self) -> usize;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Vec<f32>>;

    /// Performes an environment step.
    fn step(&mut self, act: &[f32]) -> Result<Step>;
}
